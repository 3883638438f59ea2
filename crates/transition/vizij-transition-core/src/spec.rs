//! Transition specs: how to move from the current value to a target.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::error::TransitionError;
use crate::state::{State, StateShape};

/// Duration, curve and optional engine parameters for one transition.
///
/// Times are milliseconds in the scheduler clock.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSpec {
    #[serde(default)]
    pub duration: f64,
    /// Easing curve or registered engine name. `None` selects the default engine and curve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
    /// Initial velocity (units per ms), same shape as the state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<State>,
    /// Spring oscillation period in ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,
    /// Spring damping ratio; 1.0 is critically damped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping_ratio: Option<f64>,
}

impl TransitionSpec {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_curve(mut self, curve: impl Into<Curve>) -> Self {
        self.curve = Some(curve.into());
        self
    }

    pub fn with_velocity(mut self, velocity: impl Into<State>) -> Self {
        self.velocity = Some(velocity.into());
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_damping_ratio(mut self, damping_ratio: f64) -> Self {
        self.damping_ratio = Some(damping_ratio);
        self
    }

    /// The no-movement spec behind delays.
    pub fn hold(duration: f64) -> Self {
        Self::new(duration).with_curve("constant")
    }

    pub fn from_json(raw: &str) -> Result<Self, TransitionError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub(crate) fn validate(&self) -> Result<(), TransitionError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TransitionError::InvalidDuration {
                duration: self.duration,
            });
        }
        if let Some(period) = self.period.filter(|p| !p.is_finite() || *p <= 0.0) {
            return Err(TransitionError::InvalidSpringParameter {
                name: "period".to_string(),
                value: period,
            });
        }
        if let Some(zeta) = self.damping_ratio.filter(|z| !z.is_finite() || *z < 0.0) {
            return Err(TransitionError::InvalidSpringParameter {
                name: "dampingRatio".to_string(),
                value: zeta,
            });
        }
        Ok(())
    }

    /// Validate and reorder the initial velocity to match `shape`.
    pub(crate) fn align_velocity(&mut self, shape: &StateShape) -> Result<(), TransitionError> {
        if let Some(velocity) = &self.velocity {
            velocity.check_finite()?;
            let aligned = velocity.aligned_components(shape)?;
            self.velocity = Some(State::from_components(shape, &aligned));
        }
        Ok(())
    }
}

/// Transitions for a multi-step sequence: one spec shared by every step, or one per step
/// consumed in lockstep with the values.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionSteps {
    Shared(TransitionSpec),
    PerStep(Vec<TransitionSpec>),
}

impl TransitionSteps {
    /// Spec for step `index`; per-step lists must already match the value count.
    pub(crate) fn at(&self, index: usize) -> &TransitionSpec {
        match self {
            TransitionSteps::Shared(spec) => spec,
            TransitionSteps::PerStep(specs) => &specs[index],
        }
    }

    pub(crate) fn check_len(&self, values: usize) -> Result<(), TransitionError> {
        match self {
            TransitionSteps::PerStep(specs) if specs.len() != values => {
                Err(TransitionError::TransitionCountMismatch {
                    values,
                    transitions: specs.len(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl From<TransitionSpec> for TransitionSteps {
    fn from(spec: TransitionSpec) -> Self {
        TransitionSteps::Shared(spec)
    }
}

impl From<Vec<TransitionSpec>> for TransitionSteps {
    fn from(specs: Vec<TransitionSpec>) -> Self {
        TransitionSteps::PerStep(specs)
    }
}
