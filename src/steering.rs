use std::f64::consts::PI;

use nalgebra::{DVector, Vector3};
use ndarray::{Array3, ArrayView3, Axis, ShapeError};
use num::complex::Complex64;

use crate::{
    array::SensorArray,
    error::{BeamError, Result, Stage},
};

// Wavenumber k = 2πf/c, in radians per meter.
pub fn wavenumber(freq_hz: f64, speed_of_sound: f64) -> Result<f64> {
    if !(freq_hz.is_finite() && freq_hz > 0.) {
        return Err(BeamError::invalid(format!(
            "frequency must be positive, got {}",
            freq_hz
        )));
    }
    if !(speed_of_sound.is_finite() && speed_of_sound > 0.) {
        return Err(BeamError::invalid(format!(
            "speed of sound must be positive, got {}",
            speed_of_sound
        )));
    }
    Ok(2. * PI * freq_hz / speed_of_sound)
}

/*
Narrowband far-field plane wave model. A wave arriving from direction u reaches sensor m with a
relative delay proportional to p_m·u. At a single frequency that delay is a pure phase shift, so the
steering vector is a_m = exp(i k p_m·u).
*/
pub fn steering_vector(
    array: &SensorArray,
    freq_hz: f64,
    direction: &Vector3<f64>,
    speed_of_sound: f64,
) -> Result<DVector<Complex64>> {
    let k = wavenumber(freq_hz, speed_of_sound)?;
    Ok(DVector::from_iterator(
        array.len(),
        array
            .positions()
            .iter()
            .map(|p| Complex64::from_polar(1., k * p.dot(direction))),
    ))
}

/// Steering vectors for a whole grid of directions.
///
/// `directions` has shape `[N_el, N_az, 3]` as produced by [`crate::geometry::unit_vectors`].
/// The result has shape `[N_el, N_az, M]`, with the sensor on the last axis.
pub fn steering_vectors(
    array: &SensorArray,
    freq_hz: f64,
    directions: ArrayView3<f64>,
    speed_of_sound: f64,
) -> Result<Array3<Complex64>> {
    let k = wavenumber(freq_hz, speed_of_sound)?;
    if directions.len_of(Axis(2)) != 3 {
        return Err(BeamError::invalid(format!(
            "direction grid must have 3 components on its last axis, got {}",
            directions.len_of(Axis(2))
        )));
    }

    // (N_el·N_az, 3) x (3, M) contraction for the phases.
    let (n_el, n_az) = (directions.len_of(Axis(0)), directions.len_of(Axis(1)));
    let shape_err = |e: ShapeError| BeamError::failed(Stage::GridResponse, e.to_string());
    let flat = directions.to_shape((n_el * n_az, 3)).map_err(shape_err)?;
    let phases = flat.dot(&array.to_matrix().t());

    phases
        .mapv(|phi| Complex64::from_polar(1., k * phi))
        .into_shape_with_order((n_el, n_az, array.len()))
        .map_err(shape_err)
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Vector3;
    use ndarray::array;

    use crate::{
        array::SensorArray,
        error::BeamError,
        geometry::{unit_vector_from_angles, unit_vectors, SPEED_OF_SOUND},
    };

    use super::{steering_vector, steering_vectors, wavenumber};

    fn pair() -> SensorArray {
        SensorArray::new(vec![Vector3::new(-0.05, 0., 0.), Vector3::new(0.05, 0., 0.)]).unwrap()
    }

    #[test]
    fn wavenumber_for_audio() {
        assert_relative_eq!(
            wavenumber(1000., SPEED_OF_SOUND).unwrap(),
            2. * PI * 1000. / 343.
        );
        assert!(matches!(wavenumber(0., 343.), Err(BeamError::InvalidInput(_))));
        assert!(matches!(wavenumber(1000., -1.), Err(BeamError::InvalidInput(_))));
    }

    #[test]
    fn broadside_has_no_phase() {
        // Array along x, wave from +y
        let a = steering_vector(&pair(), 1000., &unit_vector_from_angles(90., 0.), 343.).unwrap();
        for x in a.iter() {
            assert_abs_diff_eq!(x.re, 1., epsilon = 1e-12);
            assert_abs_diff_eq!(x.im, 0., epsilon = 1e-12);
        }
    }

    #[test]
    fn endfire_phase_matches_path_difference() {
        let a = steering_vector(&pair(), 1000., &unit_vector_from_angles(0., 0.), 343.).unwrap();
        let k = 2. * PI * 1000. / 343.;
        assert_relative_eq!(a[0].arg(), -0.05 * k, epsilon = 1e-12);
        assert_relative_eq!(a[1].arg(), 0.05 * k, epsilon = 1e-12);
        assert!(a.iter().all(|x| (x.norm() - 1.).abs() < 1e-12));
    }

    #[test]
    fn batched_matches_pointwise() {
        let sensors = SensorArray::new(vec![
            Vector3::new(0., 0., 0.),
            Vector3::new(0.1, 0.02, 0.),
            Vector3::new(-0.03, 0.07, 0.05),
        ])
        .unwrap();
        let az = array![0., 30., 200.];
        let el = array![-45., 10.];
        let directions = unit_vectors(az.view(), el.view());
        let grid = steering_vectors(&sensors, 2500., directions.view(), 343.).unwrap();
        assert_eq!(grid.shape(), &[2, 3, 3]);

        for (i, e) in el.iter().enumerate() {
            for (j, a) in az.iter().enumerate() {
                let u = unit_vector_from_angles(*a, *e);
                let single = steering_vector(&sensors, 2500., &u, 343.).unwrap();
                for m in 0..sensors.len() {
                    assert_relative_eq!(grid[[i, j, m]], single[m], epsilon = 1e-12);
                }
            }
        }
    }
}
