use thiserror::Error;

/// Errors from shape or configuration problems. Numeric anomalies such as a
/// zero standard deviation are not errors; they show up as `inf`/`nan` in the
/// results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PdfError {
    #[error("slice length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{len} samples do not divide into lane groups of {lane_width}")]
    PartialLaneGroup { len: usize, lane_width: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
