/*!
The request/response boundary of the beampattern computation.

A request carries sensor positions, frequency, look direction and grid bounds. The computation
builds the grid, solves the MVDR weights at the look direction, evaluates the array response on
every grid cell and converts it to decibels. Nothing is returned unless every stage succeeds.
*/
use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    array::SensorArray,
    error::{BeamError, Result},
    geometry::{unit_vector_from_angles, SPEED_OF_SOUND},
    grid::{AngularGrid, GridBounds},
    mvdr::{mvdr_weights, MvdrConfig, DEFAULT_DENOMINATOR_TOLERANCE, DEFAULT_DIAG_LOADING},
    noise::NoiseModel,
    normalize::{normalize_to_db, DEFAULT_FLOOR_DB},
    response::beampattern_response,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Position> for Vector3<f64> {
    fn from(p: Position) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeampatternRequest {
    pub positions: Vec<Position>,
    pub freq_hz: f64,
    pub look_az_deg: f64,
    pub look_el_deg: f64,
    #[serde(default = "default_az_start")]
    pub az_start: f64,
    #[serde(default = "default_az_end")]
    pub az_end: f64,
    #[serde(default = "default_step")]
    pub az_step: f64,
    #[serde(default = "default_el_start")]
    pub el_start: f64,
    #[serde(default = "default_el_end")]
    pub el_end: f64,
    #[serde(default = "default_step")]
    pub el_step: f64,
    #[serde(default = "default_c")]
    pub c: f64,
    #[serde(default = "default_diag_loading")]
    pub diag_loading: f64,
    #[serde(default = "default_floor_db")]
    pub floor_db: f64,
}

fn default_az_start() -> f64 {
    0.
}

fn default_az_end() -> f64 {
    360.
}

fn default_el_start() -> f64 {
    -90.
}

fn default_el_end() -> f64 {
    90.
}

fn default_step() -> f64 {
    2.
}

fn default_c() -> f64 {
    SPEED_OF_SOUND
}

fn default_diag_loading() -> f64 {
    DEFAULT_DIAG_LOADING
}

fn default_floor_db() -> f64 {
    DEFAULT_FLOOR_DB
}

impl BeampatternRequest {
    // A request with the default grid and acoustic parameters.
    pub fn new(positions: Vec<Position>, freq_hz: f64, look_az_deg: f64, look_el_deg: f64) -> Self {
        BeampatternRequest {
            positions,
            freq_hz,
            look_az_deg,
            look_el_deg,
            az_start: default_az_start(),
            az_end: default_az_end(),
            az_step: default_step(),
            el_start: default_el_start(),
            el_end: default_el_end(),
            el_step: default_step(),
            c: default_c(),
            diag_loading: default_diag_loading(),
            floor_db: default_floor_db(),
        }
    }

    pub fn azimuth_bounds(&self) -> GridBounds {
        GridBounds::new(self.az_start, self.az_end, self.az_step)
    }

    pub fn elevation_bounds(&self) -> GridBounds {
        GridBounds::new(self.el_start, self.el_end, self.el_step)
    }

    pub fn mvdr_config(&self) -> MvdrConfig {
        MvdrConfig {
            speed_of_sound: self.c,
            diag_loading: self.diag_loading,
            denominator_tolerance: DEFAULT_DENOMINATOR_TOLERANCE,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.freq_hz.is_finite() && self.freq_hz > 0.) {
            return Err(BeamError::invalid(format!(
                "freq_hz must be > 0, got {}",
                self.freq_hz
            )));
        }
        if !(-360.0..=360.0).contains(&self.look_az_deg) {
            return Err(BeamError::invalid(format!(
                "look_az_deg must be in [-360, 360], got {}",
                self.look_az_deg
            )));
        }
        if !(-90.0..=90.0).contains(&self.look_el_deg) {
            return Err(BeamError::invalid(format!(
                "look_el_deg must be in [-90, 90], got {}",
                self.look_el_deg
            )));
        }
        if !(self.floor_db.is_finite() && self.floor_db <= 0.) {
            return Err(BeamError::invalid(format!(
                "floor_db must be finite and <= 0, got {}",
                self.floor_db
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeampatternResponse {
    pub az_deg: Vec<f64>,
    pub el_deg: Vec<f64>,
    // Indexed [elevation][azimuth]
    pub response_db: Vec<Vec<f64>>,
}

impl BeampatternResponse {
    /// The row whose elevation is nearest to `target_el_deg`, together with that elevation.
    ///
    /// Ties go to the lower elevation index. `None` only for an empty response.
    pub fn azimuth_cut(&self, target_el_deg: f64) -> Option<(f64, &[f64])> {
        let (idx, el) = self
            .el_deg
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, el)| match best {
                Some((_, b)) if (b - target_el_deg).abs() <= (el - target_el_deg).abs() => best,
                _ => Some((i, *el)),
            })?;
        self.response_db.get(idx).map(|row| (el, row.as_slice()))
    }
}

pub fn compute_beampattern(request: &BeampatternRequest) -> Result<BeampatternResponse> {
    compute_beampattern_with(request, &NoiseModel::Identity)
}

pub fn compute_beampattern_with(
    request: &BeampatternRequest,
    noise: &NoiseModel,
) -> Result<BeampatternResponse> {
    request.validate()?;
    let array = SensorArray::new(request.positions.iter().map(|p| Vector3::from(*p)).collect())?;
    let grid = AngularGrid::from_bounds(request.azimuth_bounds(), request.elevation_bounds())?;
    let config = request.mvdr_config();

    let look = unit_vector_from_angles(request.look_az_deg, request.look_el_deg);
    let solution = mvdr_weights(&array, request.freq_hz, &look, noise, &config)?;

    let magnitude = beampattern_response(
        &array,
        request.freq_hz,
        solution.weights(),
        grid.azimuth.view(),
        grid.elevation.view(),
        config.speed_of_sound,
    )?;
    let db = normalize_to_db(&magnitude, request.floor_db);

    info!(
        "beampattern computed: {} sensors, {}x{} grid{}",
        array.len(),
        grid.elevation.len(),
        grid.azimuth.len(),
        if solution.is_degenerate() {
            ", degenerate weights"
        } else {
            ""
        }
    );

    Ok(BeampatternResponse {
        az_deg: grid.azimuth.to_vec(),
        el_deg: grid.elevation.to_vec(),
        response_db: db.outer_iter().map(|row| row.to_vec()).collect(),
    })
}
