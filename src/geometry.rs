use nalgebra::Vector3;
use ndarray::{Array3, ArrayView1};

// Speed of sound in air at roughly 20°C, m/s.
pub const SPEED_OF_SOUND: f64 = 343.0;

// Computes a unit vector given azimuth and elevation in degrees.
// Azimuth is measured from +x towards +y, elevation from the xy-plane towards +z.
pub fn unit_vector_from_angles(az_deg: f64, el_deg: f64) -> Vector3<f64> {
    let az = az_deg.to_radians();
    let el = el_deg.to_radians();
    Vector3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin())
}

// Given a vector, compute the azimuth and elevation in degrees. Same conventions as
// `unit_vector_from_angles`. Azimuth comes back in (-180, 180]. A zero or non-finite vector has
// no direction and maps to (0, 0).
pub fn vector_to_angles(vec: Vector3<f64>) -> (f64, f64) {
    let norm = vec.magnitude();
    if !(norm.is_finite() && norm > 0.) {
        return (0., 0.);
    }
    let az = f64::atan2(vec[1], vec[0]);
    let el = f64::asin((vec[2] / norm).clamp(-1., 1.));
    (az.to_degrees(), el.to_degrees())
}

/// Unit vectors for every (elevation, azimuth) pair of a grid.
///
/// The result has shape `[el.len(), az.len(), 3]`, so that `out[[i, j, ..]]` is the direction
/// for `el[i]` and `az[j]`. Axes of length one are kept.
pub fn unit_vectors(az_deg: ArrayView1<f64>, el_deg: ArrayView1<f64>) -> Array3<f64> {
    let az: Vec<(f64, f64)> = az_deg.iter().map(|a| a.to_radians().sin_cos()).collect();
    let el: Vec<(f64, f64)> = el_deg.iter().map(|e| e.to_radians().sin_cos()).collect();

    Array3::from_shape_fn((el.len(), az.len(), 3), |(i, j, axis)| {
        let (sin_el, cos_el) = el[i];
        let (sin_az, cos_az) = az[j];
        match axis {
            0 => cos_el * cos_az,
            1 => cos_el * sin_az,
            _ => sin_el,
        }
    })
}
