//! Error types for transition scheduling.

use serde::{Deserialize, Serialize};

use crate::ids::TransitionableId;
use crate::state::StateShape;

/// Errors surfaced by [`Scheduler`](crate::Scheduler) operations.
///
/// Every error is local to the call that produced it; the instance is left untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransitionError {
    /// No instance with this id is owned by the scheduler.
    #[error("Transitionable not found: {id:?}")]
    UnknownTransitionable { id: TransitionableId },

    /// Target shape does not match the current state shape.
    #[error("Invalid state shape: expected {expected}, got {actual}")]
    InvalidStateShape {
        expected: StateShape,
        actual: StateShape,
    },

    /// A target contained NaN or an infinity.
    #[error("Non-finite value in component {index}")]
    NonFiniteValue { index: usize },

    /// Durations must be finite and non-negative.
    #[error("Invalid duration: {duration}")]
    InvalidDuration { duration: f64 },

    /// Spring period must be positive, damping ratio non-negative; both finite.
    #[error("Invalid spring parameter {name}: {value}")]
    InvalidSpringParameter { name: String, value: f64 },

    /// Per-step transition list does not line up with the value list.
    #[error("Transition count mismatch: {values} values, {transitions} transitions")]
    TransitionCountMismatch { values: usize, transitions: usize },

    /// Configuration could not be parsed.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl TransitionError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownTransitionable { .. } => "lookup",
            Self::InvalidStateShape { .. }
            | Self::NonFiniteValue { .. }
            | Self::InvalidDuration { .. }
            | Self::InvalidSpringParameter { .. }
            | Self::TransitionCountMismatch { .. } => "validation",
            Self::InvalidConfig { .. } => "config",
        }
    }
}

impl From<serde_json::Error> for TransitionError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
