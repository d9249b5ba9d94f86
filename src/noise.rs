use nalgebra::{DMatrix, DVector};
use num::complex::Complex64;

use crate::error::{BeamError, Result};

// Spatial noise/interference statistics seen by the array. Hermitian positive semi-definiteness
// is assumed, not verified.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum NoiseModel {
    // Spatially white noise, R = I.
    #[default]
    Identity,
    // Uncorrelated noise with a per-sensor power.
    Diagonal(Vec<f64>),
    // An arbitrary M×M covariance matrix.
    Covariance(DMatrix<Complex64>),
}

impl NoiseModel {
    // The covariance matrix R for an array of `sensors` elements.
    pub fn covariance(&self, sensors: usize) -> Result<DMatrix<Complex64>> {
        match self {
            NoiseModel::Identity => Ok(DMatrix::identity(sensors, sensors)),
            NoiseModel::Diagonal(powers) => {
                if powers.len() != sensors {
                    return Err(BeamError::invalid(format!(
                        "diagonal noise model has {} powers for {} sensors",
                        powers.len(),
                        sensors
                    )));
                }
                if powers.iter().any(|p| !p.is_finite()) {
                    return Err(BeamError::invalid("diagonal noise powers must be finite"));
                }
                Ok(DMatrix::from_diagonal(&DVector::from_iterator(
                    sensors,
                    powers.iter().map(|p| Complex64::new(*p, 0.)),
                )))
            }
            NoiseModel::Covariance(r) => {
                if r.shape() != (sensors, sensors) {
                    return Err(BeamError::invalid(format!(
                        "covariance is {}x{}, expected {}x{}",
                        r.nrows(),
                        r.ncols(),
                        sensors,
                        sensors
                    )));
                }
                if r.iter().any(|x| !(x.re.is_finite() && x.im.is_finite())) {
                    return Err(BeamError::invalid("covariance entries must be finite"));
                }
                Ok(r.clone())
            }
        }
    }

    /// `R + loading·I`, the diagonally loaded covariance used for the weight solve.
    pub fn loaded_covariance(&self, sensors: usize, loading: f64) -> Result<DMatrix<Complex64>> {
        if !(loading.is_finite() && loading >= 0.) {
            return Err(BeamError::invalid(format!(
                "diagonal loading must be non-negative, got {}",
                loading
            )));
        }
        let mut r = self.covariance(sensors)?;
        for i in 0..sensors {
            r[(i, i)] += loading;
        }
        Ok(r)
    }
}
