use nalgebra::Vector3;
use ndarray::{Array2, ArrayView2};

use crate::error::{BeamError, Result};

// An ordered set of sensor positions in meters. The index of a position is its channel number,
// and is the index used in steering and weight vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorArray {
    positions: Vec<Vector3<f64>>,
}

impl SensorArray {
    pub fn new(positions: Vec<Vector3<f64>>) -> Result<SensorArray> {
        if positions.is_empty() {
            return Err(BeamError::invalid("sensor array must contain at least one position"));
        }
        if let Some(idx) = positions.iter().position(|p| p.iter().any(|x| !x.is_finite())) {
            return Err(BeamError::invalid(format!(
                "sensor {} has a non-finite coordinate",
                idx
            )));
        }
        Ok(SensorArray { positions })
    }

    // Builds an array from an (M, 3) matrix of positions.
    pub fn from_matrix(positions: ArrayView2<f64>) -> Result<SensorArray> {
        if positions.ncols() != 3 {
            return Err(BeamError::invalid(format!(
                "positions must be shape (M, 3), got ({}, {})",
                positions.nrows(),
                positions.ncols()
            )));
        }
        SensorArray::new(
            positions
                .rows()
                .into_iter()
                .map(|row| Vector3::new(row[0], row[1], row[2]))
                .collect(),
        )
    }

    // Builds an array from rows of coordinates, each of which must have exactly three entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<SensorArray> {
        let mut positions = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match row.as_slice() {
                [x, y, z] => positions.push(Vector3::new(*x, *y, *z)),
                _ => {
                    return Err(BeamError::invalid(format!(
                        "sensor {} has {} coordinates, expected 3",
                        idx,
                        row.len()
                    )))
                }
            }
        }
        SensorArray::new(positions)
    }

    /// A uniform linear array of `count` sensors, `spacing` meters apart along `axis`,
    /// centred on the origin.
    pub fn uniform_linear(count: usize, spacing: f64, axis: Vector3<f64>) -> Result<SensorArray> {
        let norm = axis.norm();
        if norm == 0. || !norm.is_finite() {
            return Err(BeamError::invalid("array axis must be a non-zero finite vector"));
        }
        let dir = axis / norm;
        let start = -((count as f64 - 1.) * spacing) / 2.;
        SensorArray::new(
            (0..count)
                .map(|i| dir * (start + i as f64 * spacing))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    // Always false, an array holds at least one sensor.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    // The positions as an (M, 3) matrix.
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), 3), |(m, axis)| self.positions[m][axis])
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use ndarray::array;

    use crate::error::BeamError;

    use super::SensorArray;

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(
            SensorArray::new(vec![]),
            Err(BeamError::InvalidInput(_))
        ));
    }

    #[test]
    fn wrong_dimensionality_is_rejected() {
        let positions = array![[0., 0.], [1., 0.]];
        assert!(matches!(
            SensorArray::from_matrix(positions.view()),
            Err(BeamError::InvalidInput(_))
        ));

        let rows = vec![vec![0., 0., 0.], vec![1., 0.]];
        assert!(matches!(
            SensorArray::from_rows(&rows),
            Err(BeamError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let rows = vec![vec![0., f64::NAN, 0.]];
        assert!(SensorArray::from_rows(&rows).is_err());
    }

    #[test]
    fn matrix_round_trip_keeps_channel_order() {
        let positions = array![[-0.05, 0., 0.], [0.05, 0., 0.], [0., 0.1, 0.2]];
        let sensors = SensorArray::from_matrix(positions.view()).unwrap();
        assert_eq!(sensors.len(), 3);
        assert_eq!(sensors.to_matrix(), positions);
        assert_eq!(sensors.positions()[2], Vector3::new(0., 0.1, 0.2));
    }

    #[test]
    fn uniform_linear_is_centred() {
        let sensors = SensorArray::uniform_linear(4, 0.1, Vector3::new(0., 2., 0.)).unwrap();
        let ys: Vec<f64> = sensors.positions().iter().map(|p| p[1]).collect();
        assert_relative_eq!(ys[0], -0.15, epsilon = 1e-12);
        assert_relative_eq!(ys[3], 0.15, epsilon = 1e-12);
        assert_relative_eq!(ys.iter().sum::<f64>(), 0., epsilon = 1e-12);
        assert!(sensors.positions().iter().all(|p| p[0] == 0. && p[2] == 0.));
    }

    #[test]
    fn uniform_linear_with_zero_count_is_rejected() {
        assert!(SensorArray::uniform_linear(0, 0.1, Vector3::x()).is_err());
    }
}
