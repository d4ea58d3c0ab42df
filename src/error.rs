use std::fmt;

use thiserror::Error;

/// Which half of a frame failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    Time,
    Frequency,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Time => f.write_str("time-domain"),
            Domain::Frequency => f.write_str("frequency-domain"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Aggregation requested over zero samples
    #[error("cannot aggregate an empty series")]
    EmptySeries,

    /// A frame's length differs from the length established for the session
    #[error("frame {frame}: {domain} length {actual} does not match session length {expected}")]
    DimensionMismatch {
        frame: usize,
        domain: Domain,
        expected: usize,
        actual: usize,
    },

    /// Frame delivered after finalization began
    #[error("session is closed to new frames")]
    SessionClosed,

    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
