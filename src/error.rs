//! Error types

use thiserror::Error;

/// Errors raised while building simulation data
#[derive(Debug, Error)]
pub enum SimError {
    #[error("degenerate box: half extents ({half_width}, {half_height}) must be positive")]
    DegenerateBox { half_width: f32, half_height: f32 },

    #[error("no layout defined for level {0}")]
    UnknownLevel(u8),

    #[error("level {level} is invalid: {reason}")]
    InvalidLevel { level: u8, reason: String },

    #[error("question {id} is invalid: {reason}")]
    InvalidQuestion { id: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
