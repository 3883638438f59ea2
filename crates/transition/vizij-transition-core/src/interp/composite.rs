//! Fan-out wrapper: one single-component engine per channel.

use crate::config::Config;
use crate::spec::TransitionSpec;
use crate::state::State;

use super::{EngineKind, Interpolator};

pub struct CompositeEngine {
    channels: Vec<Box<dyn Interpolator>>,
}

impl CompositeEngine {
    pub fn new(kind: &EngineKind, cfg: &Config, components: usize) -> Self {
        Self {
            channels: (0..components).map(|_| kind.build(cfg)).collect(),
        }
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl std::fmt::Debug for CompositeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeEngine")
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl Interpolator for CompositeEngine {
    fn reset(&mut self, value: &[f64], velocity: Option<&[f64]>) {
        for (i, channel) in self.channels.iter_mut().enumerate() {
            let x = value.get(i).copied().unwrap_or(0.0);
            let v = velocity.and_then(|v| v.get(i)).map(std::slice::from_ref);
            channel.reset(&[x], v);
        }
    }

    fn set(&mut self, target: &[f64], spec: &TransitionSpec, now: f64) {
        let velocity = spec.velocity.as_ref().map(State::components);
        for (i, channel) in self.channels.iter_mut().enumerate() {
            let mut channel_spec = spec.clone();
            channel_spec.velocity = velocity
                .as_ref()
                .and_then(|v| v.get(i))
                .map(|v| State::Scalar(*v));
            channel.set(&[target.get(i).copied().unwrap_or(0.0)], &channel_spec, now);
        }
    }

    fn get(&mut self, now: f64) -> Vec<f64> {
        self.channels
            .iter_mut()
            .flat_map(|channel| channel.get(now))
            .collect()
    }

    fn velocity(&self) -> Vec<f64> {
        self.channels
            .iter()
            .flat_map(|channel| channel.velocity())
            .collect()
    }

    fn is_active(&self) -> bool {
        self.channels.iter().any(|channel| channel.is_active())
    }
}
