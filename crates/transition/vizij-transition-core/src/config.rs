//! Core configuration for vizij-transition-core.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// Scheduler-wide defaults.
/// Keep this minimal in v1; expand as needed without breaking API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry name of the engine used when a spec names no registered curve.
    pub default_engine: String,
    /// Easing used by tweens when a spec has no curve or an unknown one.
    pub default_curve: String,

    /// Deferred tasks run per flush before the rest is left for the next flush.
    pub max_flush_tasks: usize,

    /// Initial capacity hint for instance slots and ticker registrations.
    pub initial_capacity: usize,

    pub spring: SpringDefaults,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringDefaults {
    pub period_ms: f64,
    pub damping_ratio: f64,
    /// Position/velocity magnitude under which a spring counts as settled.
    pub settle_epsilon: f64,
}

impl Default for SpringDefaults {
    fn default() -> Self {
        Self {
            period_ms: 300.0,
            damping_ratio: 0.5,
            settle_epsilon: 1e-3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_engine: "tween".to_string(),
            default_curve: "linear".to_string(),
            max_flush_tasks: 10_000,
            initial_capacity: 64,
            spring: SpringDefaults::default(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, TransitionError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{"default_curve": "easeInOut", "spring": {"period_ms": 500}}"#)
            .unwrap();
        assert_eq!(cfg.default_curve, "easeInOut");
        assert_eq!(cfg.default_engine, "tween");
        assert_eq!(cfg.spring.period_ms, 500.0);
        assert_eq!(cfg.spring.damping_ratio, 0.5);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Config::from_json("{").unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
