use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BeamError>;

// The numeric stage a computation failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    WeightSolve,
    GridResponse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::WeightSolve => write!(f, "weight solve"),
            Stage::GridResponse => write!(f, "grid response"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BeamError {
    /// Malformed geometry, grid bounds or parameters. Raised before any numeric work.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A numeric step failed, e.g. the loaded covariance is singular.
    #[error("computation failed during {stage}: {reason}")]
    ComputationFailure { stage: Stage, reason: String },

    #[error("render error: {0}")]
    Render(String),
}

impl BeamError {
    pub(crate) fn invalid(msg: impl Into<String>) -> BeamError {
        BeamError::InvalidInput(msg.into())
    }

    pub(crate) fn failed(stage: Stage, reason: impl Into<String>) -> BeamError {
        BeamError::ComputationFailure {
            stage,
            reason: reason.into(),
        }
    }
}
