use log::debug;
use nalgebra::DVector;
use ndarray::{Array1, Array2, ArrayView1, ShapeError};
use num::complex::Complex64;

use crate::{
    array::SensorArray,
    error::{BeamError, Result, Stage},
    geometry::{unit_vector_from_angles, unit_vectors},
    helper_traits::SphericalFunction,
    steering::{steering_vectors, wavenumber},
};

fn check_weights(array: &SensorArray, weights: &DVector<Complex64>) -> Result<()> {
    if weights.len() != array.len() {
        return Err(BeamError::invalid(format!(
            "weight vector has {} entries for {} sensors",
            weights.len(),
            array.len()
        )));
    }
    Ok(())
}

/// Magnitude of the array response `|wᴴa(θ, φ)|` over an angular grid.
///
/// Returns an array of shape `[el_deg.len(), az_deg.len()]`. The steering vectors for the whole
/// grid are built at once and contracted with `conj(w)` along the sensor axis.
pub fn beampattern_response(
    array: &SensorArray,
    freq_hz: f64,
    weights: &DVector<Complex64>,
    az_deg: ArrayView1<f64>,
    el_deg: ArrayView1<f64>,
    speed_of_sound: f64,
) -> Result<Array2<f64>> {
    check_weights(array, weights)?;
    if az_deg.is_empty() || el_deg.is_empty() {
        return Err(BeamError::invalid(format!(
            "angular grid must be non-empty, got {} azimuths and {} elevations",
            az_deg.len(),
            el_deg.len()
        )));
    }
    debug!(
        "evaluating response on {}x{} grid with {} sensors",
        el_deg.len(),
        az_deg.len(),
        array.len()
    );

    let (n_el, n_az) = (el_deg.len(), az_deg.len());
    let directions = unit_vectors(az_deg, el_deg);
    let A = steering_vectors(array, freq_hz, directions.view(), speed_of_sound)?;
    let w_conj: Array1<Complex64> = weights.iter().map(|w| w.conj()).collect();

    // One (N_el·N_az, M) x (M) product over the whole grid.
    let shape_err = |e: ShapeError| BeamError::failed(Stage::GridResponse, e.to_string());
    let A = A
        .into_shape_with_order((n_el * n_az, array.len()))
        .map_err(shape_err)?;
    A.dot(&w_conj)
        .mapv(|b| b.norm())
        .into_shape_with_order((n_el, n_az))
        .map_err(shape_err)
}

// A fixed set of weights applied to an array at one frequency.
#[derive(Clone, Debug)]
pub struct Beamformer {
    array: SensorArray,
    weights: DVector<Complex64>,
    k: f64,
}

impl Beamformer {
    pub fn new(
        array: SensorArray,
        freq_hz: f64,
        weights: DVector<Complex64>,
        speed_of_sound: f64,
    ) -> Result<Beamformer> {
        check_weights(&array, &weights)?;
        let k = wavenumber(freq_hz, speed_of_sound)?;
        Ok(Beamformer { array, weights, k })
    }

    pub fn weights(&self) -> &DVector<Complex64> {
        &self.weights
    }

    // Complex response wᴴa for a single direction.
    pub fn response(&self, az_deg: f64, el_deg: f64) -> Complex64 {
        let u = unit_vector_from_angles(az_deg, el_deg);
        self.array
            .positions()
            .iter()
            .zip(self.weights.iter())
            .map(|(p, w)| w.conj() * Complex64::from_polar(1., self.k * p.dot(&u)))
            .sum()
    }
}

impl SphericalFunction for Beamformer {
    fn lookup(&self, az_deg: f64, el_deg: f64) -> f64 {
        self.response(az_deg, el_deg).norm()
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::{DVector, Vector3};
    use ndarray::{array, Array1};
    use num::complex::Complex64;

    use crate::{
        array::SensorArray,
        error::BeamError,
        geometry::unit_vector_from_angles,
        helper_traits::{SphericalFunction, SphericalFunctionHelper},
        mvdr::{mvdr_weights, MvdrConfig},
        noise::NoiseModel,
    };

    use super::{beampattern_response, Beamformer};

    fn weights_for(sensors: &SensorArray, freq: f64, az: f64, el: f64) -> DVector<Complex64> {
        mvdr_weights(
            sensors,
            freq,
            &unit_vector_from_angles(az, el),
            &NoiseModel::Identity,
            &MvdrConfig::default(),
        )
        .unwrap()
        .into_weights()
    }

    #[test]
    fn peak_is_at_look_direction() {
        let sensors = SensorArray::uniform_linear(6, 0.04, Vector3::y()).unwrap();
        let w = weights_for(&sensors, 3000., 40., 0.);
        let az: Array1<f64> = (0..72).map(|i| i as f64 * 5.).collect();
        let el = array![-20., 0., 20.];

        let response =
            beampattern_response(&sensors, 3000., &w, az.view(), el.view(), 343.).unwrap();
        assert_eq!(response.shape(), &[3, 72]);

        let max = response.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(response[[1, 8]], max, epsilon = 1e-9);
        // Distortionless, so unit gain at the look direction.
        assert_relative_eq!(response[[1, 8]], 1., epsilon = 1e-9);
    }

    #[test]
    fn batched_matches_pointwise() {
        let sensors = SensorArray::new(vec![
            Vector3::new(0., 0., 0.),
            Vector3::new(0.08, 0.01, 0.),
            Vector3::new(0.02, -0.06, 0.03),
        ])
        .unwrap();
        let w = weights_for(&sensors, 1500., 120., 15.);
        let beamformer = Beamformer::new(sensors.clone(), 1500., w.clone(), 343.).unwrap();
        let az = array![0., 90., 120., 250.];
        let el = array![-60., 15., 80.];

        let response =
            beampattern_response(&sensors, 1500., &w, az.view(), el.view(), 343.).unwrap();
        for (i, e) in el.iter().enumerate() {
            let row = beamformer.lookup_many(az.iter().map(|a| (*a, *e)));
            for (j, value) in row.iter().enumerate() {
                assert_relative_eq!(response[[i, j]], *value, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(
            beamformer.lookup_vec(unit_vector_from_angles(120., 15.) * 3.),
            1.,
            epsilon = 1e-9
        );
    }

    #[test]
    fn degenerate_axes_are_kept() {
        let sensors = SensorArray::uniform_linear(2, 0.1, Vector3::x()).unwrap();
        let w = weights_for(&sensors, 1000., 0., 0.);

        let (az, el) = (array![0., 5., 10.], array![0.]);
        let one_el = beampattern_response(&sensors, 1000., &w, az.view(), el.view(), 343.).unwrap();
        assert_eq!(one_el.shape(), &[1, 3]);

        let (az, el) = (array![0.], array![-10., 0., 10.]);
        let one_az = beampattern_response(&sensors, 1000., &w, az.view(), el.view(), 343.).unwrap();
        assert_eq!(one_az.shape(), &[3, 1]);
    }

    #[test]
    fn mismatched_weights_and_empty_grids_are_rejected() {
        let sensors = SensorArray::uniform_linear(3, 0.1, Vector3::x()).unwrap();
        let w = DVector::from_element(2, Complex64::new(1., 0.));
        assert!(matches!(
            beampattern_response(&sensors, 1000., &w, array![0.].view(), array![0.].view(), 343.),
            Err(BeamError::InvalidInput(_))
        ));
        assert!(Beamformer::new(sensors.clone(), 1000., w, 343.).is_err());

        let w = weights_for(&sensors, 1000., 0., 0.);
        let empty: Array1<f64> = Array1::zeros(0);
        assert!(matches!(
            beampattern_response(&sensors, 1000., &w, empty.view(), array![0.].view(), 343.),
            Err(BeamError::InvalidInput(_))
        ));
    }
}
