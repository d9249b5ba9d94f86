use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{BeamError, Result};

// A span at most this wide is treated as a single point.
pub const SPAN_TOLERANCE: f64 = 1e-12;
// Slack added to span/step so accumulated rounding does not drop the last step.
pub const STEP_SLACK: f64 = 1e-9;
// The last sample is snapped to `end` within this distance, otherwise `end` is appended.
pub const END_TOLERANCE: f64 = 1e-7;
// Most samples one axis may hold. Steps that would exceed it are rejected.
pub const MAX_AXIS_SAMPLES: usize = 1 << 24;

/// Builds an inclusive grid `start, start + step, ..., end`.
///
/// When `end` is not a whole number of steps from `start` it is still appended as the final
/// sample, so both bounds always appear. `start == end` gives the single point `[start]`.
pub fn make_grid(start: f64, end: f64, step: f64) -> Result<Array1<f64>> {
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(BeamError::invalid(format!(
            "grid bounds must be finite, got start = {}, end = {}, step = {}",
            start, end, step
        )));
    }
    if step <= 0. {
        return Err(BeamError::invalid(format!("step must be > 0, got {}", step)));
    }
    if end < start {
        return Err(BeamError::invalid(format!(
            "end must be >= start, got start = {}, end = {}",
            start, end
        )));
    }

    let span = end - start;
    if span <= SPAN_TOLERANCE {
        return Ok(Array1::from_elem(1, start));
    }

    let steps = (span / step + STEP_SLACK).floor();
    if !steps.is_finite() || steps >= MAX_AXIS_SAMPLES as f64 {
        return Err(BeamError::invalid(format!(
            "step {} is too small for span {}, the grid would exceed {} samples",
            step, span, MAX_AXIS_SAMPLES
        )));
    }
    let n = steps as usize + 1;
    let mut samples: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    // n >= 1, so there is always a last sample
    if let Some(last) = samples.last_mut() {
        if *last < end - END_TOLERANCE {
            samples.push(end);
        } else if (*last - end).abs() <= END_TOLERANCE {
            *last = end;
        }
    }

    Ok(Array1::from(samples))
}

// Bounds and step for one axis of an angular grid, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl GridBounds {
    pub fn new(start: f64, end: f64, step: f64) -> GridBounds {
        GridBounds { start, end, step }
    }

    pub fn build(&self) -> Result<Array1<f64>> {
        make_grid(self.start, self.end, self.step)
    }
}

// Azimuth and elevation samples, in degrees, of a beampattern grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AngularGrid {
    pub azimuth: Array1<f64>,
    pub elevation: Array1<f64>,
}

impl AngularGrid {
    pub fn from_bounds(azimuth: GridBounds, elevation: GridBounds) -> Result<AngularGrid> {
        Ok(AngularGrid {
            azimuth: azimuth.build()?,
            elevation: elevation.build()?,
        })
    }

    // Number of (elevation, azimuth) cells.
    pub fn size(&self) -> usize {
        self.azimuth.len() * self.elevation.len()
    }
}
