//! Vizij Transition Core (engine-agnostic)
//!
//! Values that move toward targets over time. A [`Scheduler`] owns every
//! [`Transitionable`], the [`EngineRegistry`] that turns curve names into interpolation
//! engines, the [`Ticker`] that decides who is sampled each frame, and the deferred
//! [`PhaseQueue`] that sequences end-of-transition work.
//!
//! ```
//! use vizij_transition_core::{Scheduler, TransitionSpec};
//!
//! let mut scheduler = Scheduler::default();
//! let id = scheduler.create(None).unwrap();
//! scheduler
//!     .set(id, 5.0, Some(TransitionSpec::new(100.0)), None)
//!     .unwrap();
//! for _ in 0..10 {
//!     scheduler.tick(10.0);
//! }
//! assert_eq!(scheduler.get(id).unwrap().as_scalar(), Some(5.0));
//! ```

pub mod activity;
pub mod config;
pub mod curve;
pub mod error;
pub mod events;
pub mod ids;
pub mod interp;
pub mod phase;
pub mod registry;
pub mod scheduler;
pub mod spec;
pub mod state;
pub mod ticker;
pub mod transitionable;

// Re-exports for consumers
pub use activity::ActivityState;
pub use config::{Config, SpringDefaults};
pub use curve::{Curve, Easing};
pub use error::TransitionError;
pub use events::{EventKind, Outputs, TransitionEvent};
pub use ids::TransitionableId;
pub use interp::{EngineKind, Interpolator};
pub use phase::PhaseQueue;
pub use registry::EngineRegistry;
pub use scheduler::Scheduler;
pub use spec::{TransitionSpec, TransitionSteps};
pub use state::{State, StateShape};
pub use ticker::{Ticker, TickerSignal};
pub use transitionable::{callback, Callback, Transitionable};

pub type Result<T> = core::result::Result<T, TransitionError>;
