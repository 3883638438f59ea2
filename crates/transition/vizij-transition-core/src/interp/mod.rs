//! Interpolation engines.
//!
//! Engines operate on flat component slices; the owning transitionable maps its
//! [`State`](crate::State) to and from components once per loaded transition.
//!
//! v1 ships a tween engine (default), a damped spring, and a composite wrapper that
//! drives one single-component engine per channel.

pub mod composite;
pub mod spring;
pub mod tween;

use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::spec::TransitionSpec;

pub use composite::CompositeEngine;
pub use spring::SpringEngine;
pub use tween::TweenEngine;

/// Stateful interpolation strategy advanced by sampling at scheduler time `now` (ms).
pub trait Interpolator {
    /// Jump to `value` (and `velocity`, zero when absent) and go idle.
    fn reset(&mut self, value: &[f64], velocity: Option<&[f64]>);

    /// Start moving from the current value toward `target`.
    fn set(&mut self, target: &[f64], spec: &TransitionSpec, now: f64);

    /// Sample the value at `now`. Reaching the target makes the engine inactive.
    fn get(&mut self, now: f64) -> Vec<f64>;

    /// Velocity at the last sample or reset, units per ms.
    fn velocity(&self) -> Vec<f64>;

    fn is_active(&self) -> bool;
}

/// Constructor for a boxed engine.
pub type EngineCtor = Rc<dyn Fn(&Config) -> Box<dyn Interpolator>>;

/// A registrable engine type.
#[derive(Clone)]
pub struct EngineKind {
    /// Components one instance interpolates natively; larger states get a composite.
    pub max_components: usize,
    ctor: EngineCtor,
}

impl EngineKind {
    pub fn new<F>(max_components: usize, ctor: F) -> Self
    where
        F: Fn(&Config) -> Box<dyn Interpolator> + 'static,
    {
        Self {
            max_components,
            ctor: Rc::new(ctor),
        }
    }

    /// Tween engine; handles any number of components.
    pub fn tween() -> Self {
        Self::new(usize::MAX, |cfg| Box::new(TweenEngine::new(cfg)))
    }

    /// Damped spring; up to three components natively.
    pub fn spring() -> Self {
        Self::new(SpringEngine::MAX_COMPONENTS, |cfg| Box::new(SpringEngine::new(cfg)))
    }

    #[inline]
    pub fn supports(&self, components: usize) -> bool {
        components <= self.max_components
    }

    pub fn build(&self, cfg: &Config) -> Box<dyn Interpolator> {
        (self.ctor)(cfg)
    }

    /// Build a single engine when the kind supports `components` natively, otherwise a
    /// composite of one engine per component.
    pub fn instantiate(&self, cfg: &Config, components: usize) -> Box<dyn Interpolator> {
        if self.supports(components) {
            self.build(cfg)
        } else {
            Box::new(CompositeEngine::new(self, cfg, components))
        }
    }
}

impl fmt::Debug for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineKind")
            .field("max_components", &self.max_components)
            .finish_non_exhaustive()
    }
}
