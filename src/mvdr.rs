/*!
Minimum Variance Distortionless Response weights.

The MVDR beamformer minimises output power wᴴRw subject to unit gain towards the look direction,
wᴴa0 = 1. The closed form solution is

```text
w = R⁻¹a0 / (a0ᴴR⁻¹a0)
```

R⁻¹a0 is obtained from an LU solve of the diagonally loaded covariance, never an explicit inverse.
*/
use log::{debug, warn};
use nalgebra::{DVector, Vector3};
use num::complex::Complex64;

use crate::{
    array::SensorArray,
    error::{BeamError, Result, Stage},
    geometry::SPEED_OF_SOUND,
    noise::NoiseModel,
    steering::steering_vector,
};

pub const DEFAULT_DIAG_LOADING: f64 = 1e-3;
// Absolute tolerance on |a0ᴴR⁻¹a0| below which the solve is treated as degenerate.
pub const DEFAULT_DENOMINATOR_TOLERANCE: f64 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MvdrConfig {
    pub speed_of_sound: f64,
    pub diag_loading: f64,
    pub denominator_tolerance: f64,
}

impl Default for MvdrConfig {
    fn default() -> Self {
        MvdrConfig {
            speed_of_sound: SPEED_OF_SOUND,
            diag_loading: DEFAULT_DIAG_LOADING,
            denominator_tolerance: DEFAULT_DENOMINATOR_TOLERANCE,
        }
    }
}

// Outcome of the weight solve. `Degenerate` holds the normalized steering vector a0/‖a0‖, used when
// the MVDR denominator vanishes. Those weights have unit norm, they do not satisfy wᴴa0 = 1.
#[derive(Clone, Debug, PartialEq)]
pub enum WeightSolution {
    Solved(DVector<Complex64>),
    Degenerate(DVector<Complex64>),
}

impl WeightSolution {
    pub fn weights(&self) -> &DVector<Complex64> {
        match self {
            WeightSolution::Solved(w) | WeightSolution::Degenerate(w) => w,
        }
    }

    pub fn into_weights(self) -> DVector<Complex64> {
        match self {
            WeightSolution::Solved(w) | WeightSolution::Degenerate(w) => w,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, WeightSolution::Degenerate(_))
    }
}

pub fn mvdr_weights(
    array: &SensorArray,
    freq_hz: f64,
    look_direction: &Vector3<f64>,
    noise: &NoiseModel,
    config: &MvdrConfig,
) -> Result<WeightSolution> {
    if !(config.denominator_tolerance.is_finite() && config.denominator_tolerance >= 0.) {
        return Err(BeamError::invalid(format!(
            "denominator tolerance must be non-negative, got {}",
            config.denominator_tolerance
        )));
    }
    let M = array.len();
    let a0 = steering_vector(array, freq_hz, look_direction, config.speed_of_sound)?;
    let R_loaded = noise.loaded_covariance(M, config.diag_loading)?;

    let Rinv_a = R_loaded.lu().solve(&a0).ok_or_else(|| {
        BeamError::failed(
            Stage::WeightSolve,
            format!(
                "loaded covariance is singular (M = {}, loading = {})",
                M, config.diag_loading
            ),
        )
    })?;
    if Rinv_a.iter().any(|x| !(x.re.is_finite() && x.im.is_finite())) {
        return Err(BeamError::failed(
            Stage::WeightSolve,
            "linear solve produced non-finite values",
        ));
    }

    let denom = a0.dotc(&Rinv_a);
    debug!(
        "mvdr solve: M = {}, loading = {}, |a0ᴴR⁻¹a0| = {:e}",
        M,
        config.diag_loading,
        denom.norm()
    );

    if denom.norm() <= config.denominator_tolerance {
        warn!(
            "MVDR denominator {:e} is below tolerance {:e}, using normalized steering vector",
            denom.norm(),
            config.denominator_tolerance
        );
        let gain = a0.dotc(&a0).re.sqrt();
        return Ok(WeightSolution::Degenerate(a0.map(|x| x / gain)));
    }

    Ok(WeightSolution::Solved(Rinv_a.map(|x| x / denom)))
}
