//! Activity state of a transitionable.

use serde::{Deserialize, Serialize};

/// Where an instance is in its start → update → end cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    /// Freshly created; never set.
    #[default]
    None,
    /// Registered with the ticker, not yet sampled.
    Start,
    /// Sampled every tick.
    Update,
    /// Drained; may re-enter `Start` on the next set.
    End,
}

impl ActivityState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Start => "start",
            Self::Update => "update",
            Self::End => "end",
        }
    }

    /// True only while being sampled.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Update)
    }

    /// States a new set may start from without interrupting anything.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::None | Self::End)
    }
}
