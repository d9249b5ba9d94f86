use nalgebra::Vector3;

use crate::geometry::vector_to_angles;

// A function defined on the surface of a sphere `S`, with directions given in degrees.
pub trait SphericalFunction {
    fn lookup(&self, az_deg: f64, el_deg: f64) -> f64;
    fn lookup_vec(&self, vec: Vector3<f64>) -> f64 {
        let (az, el) = vector_to_angles(vec);
        self.lookup(az, el)
    }
}

pub trait SphericalFunctionHelper {
    fn lookup_many(&self, items: impl Iterator<Item = (f64, f64)>) -> Vec<f64>;
}

impl<T: SphericalFunction> SphericalFunctionHelper for T {
    fn lookup_many(&self, items: impl Iterator<Item = (f64, f64)>) -> Vec<f64> {
        items.map(|(az, el)| self.lookup(az, el)).collect()
    }
}
