//! Error types shared across the crate
//!
//! Only the two session-start outcomes cross into the presentation layer.
//! Everything else is either recovered locally or rejected at construction.

use thiserror::Error;

/// Bounce sequence rejected when building a timeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("bounce event {index} at {time}s is not after previous event at {previous}s")]
    OutOfOrder { index: usize, previous: f64, time: f64 },

    #[error("bounce event {index} has a non-finite time")]
    NonFinite { index: usize },
}

/// Outcome of a failed path generation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation cancelled by user")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

/// Why a session could not be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    /// User aborted loading; return to the menu silently
    #[error("session start cancelled")]
    Cancelled,

    /// Map could not be built; show the message to the user
    #[error("session start failed: {0}")]
    Failed(String),
}

impl StartError {
    /// Message to surface to the player, if any
    pub fn user_message(&self) -> Option<&str> {
        match self {
            StartError::Cancelled => None,
            StartError::Failed(reason) => Some(reason),
        }
    }
}

impl From<GenerationError> for StartError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Cancelled => StartError::Cancelled,
            GenerationError::Failed(reason) => StartError::Failed(reason),
        }
    }
}

impl From<TimelineError> for StartError {
    fn from(err: TimelineError) -> Self {
        StartError::Failed(err.to_string())
    }
}

/// Accuracy ratio with an empty denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("accuracy undefined: no bounces to divide by")]
    DivisionUndefined,
}

/// Configuration load/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_error_from_generation() {
        assert_eq!(StartError::from(GenerationError::Cancelled), StartError::Cancelled);
        let failed = StartError::from(GenerationError::Failed("map too large".into()));
        assert_eq!(failed.user_message(), Some("map too large"));
        assert_eq!(StartError::Cancelled.user_message(), None);
    }

    #[test]
    fn test_timeline_error_becomes_failure() {
        let err = StartError::from(TimelineError::NonFinite { index: 3 });
        assert!(matches!(err, StartError::Failed(msg) if msg.contains("event 3")));
    }
}
