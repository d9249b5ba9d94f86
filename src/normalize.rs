use ndarray::{Array, ArrayBase, Data, Dimension};

pub const DEFAULT_FLOOR_DB: f64 = -60.0;
// Added to the peak before dividing, so an all-zero field does not divide by zero.
const PEAK_EPSILON: f64 = 1e-12;
// Smallest ratio passed to the logarithm.
const MIN_RATIO: f64 = 1e-12;

// Amplitude to decibels.
pub fn decibels(x: f64) -> f64 {
    20. * x.log10()
}

/// Normalizes a magnitude field to 0 dB at its peak and floors it at `floor_db`.
///
/// Every output value lies in `[floor_db, 0]`. An all-zero input comes back as `floor_db`
/// everywhere (for any `floor_db` above -240 dB). A positive `floor_db` is treated as 0 dB,
/// which keeps the peak at 0 dB.
pub fn normalize_to_db<S, D>(magnitude: &ArrayBase<S, D>, floor_db: f64) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let floor_db = floor_db.min(0.);
    let peak = magnitude.iter().copied().fold(0.0f64, f64::max) + PEAK_EPSILON;
    magnitude.mapv(|x| decibels((x / peak).max(MIN_RATIO)).max(floor_db))
}
