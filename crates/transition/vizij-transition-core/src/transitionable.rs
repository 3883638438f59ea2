//! Per-instance transition state: value, queue, loaded engine and activity.
//!
//! A [`Transitionable`] never runs on its own. The [`Scheduler`] owns it, hands it a
//! [`Ctx`] with the shared collaborators (registry, ticker, phase queue, outputs, clock)
//! and invokes callbacks once the instance borrow has ended.

use std::collections::VecDeque;
use std::fmt;

use crate::activity::ActivityState;
use crate::config::Config;
use crate::error::TransitionError;
use crate::events::{EventBus, EventKind, Outputs, TransitionEvent};
use crate::ids::TransitionableId;
use crate::interp::Interpolator;
use crate::phase::PhaseQueue;
use crate::registry::EngineRegistry;
use crate::scheduler::Scheduler;
use crate::spec::{TransitionSpec, TransitionSteps};
use crate::state::{State, StateShape};
use crate::ticker::Ticker;

/// Completion callback; receives the scheduler so it can chain further work.
pub type Callback = Box<dyn FnOnce(&mut Scheduler)>;

/// Wrap a closure as a completion callback.
pub fn callback<F>(f: F) -> Option<Callback>
where
    F: FnOnce(&mut Scheduler) + 'static,
{
    Some(Box::new(f))
}

/// Shared collaborators lent to an instance for one operation.
pub(crate) struct Ctx<'a> {
    pub cfg: &'a Config,
    pub registry: &'a EngineRegistry,
    pub ticker: &'a mut Ticker,
    pub phase: &'a mut PhaseQueue,
    pub outputs: &'a mut Outputs,
    pub now: f64,
}

/// A queued target, already aligned to the state's component order.
struct Pending {
    target: Vec<f64>,
    spec: TransitionSpec,
    callback: Option<Callback>,
}

/// Re-seed plan for looping sequences.
#[derive(Clone)]
struct LoopPlan {
    steps: Vec<(Vec<f64>, TransitionSpec)>,
}

struct LoadedEngine {
    kind: String,
    shape: StateShape,
    engine: Box<dyn Interpolator>,
}

pub struct Transitionable {
    id: TransitionableId,
    state: State,
    velocity: Option<State>,
    activity: ActivityState,
    queue: VecDeque<Pending>,
    engine: Option<LoadedEngine>,
    callback: Option<Callback>,
    looping: Option<LoopPlan>,
    registered: bool,
    dirty: bool,
    /// Terminal sequence queued; further samples are ignored until it runs.
    finishing: bool,
    /// Bumped by every set/reset so stale terminal tasks can tell they were superseded.
    epoch: u64,
    events: EventBus,
}

impl Transitionable {
    pub(crate) fn new(id: TransitionableId) -> Self {
        Self {
            id,
            state: State::default(),
            velocity: None,
            activity: ActivityState::None,
            queue: VecDeque::new(),
            engine: None,
            callback: None,
            looping: None,
            registered: false,
            dirty: false,
            finishing: false,
            epoch: 0,
            events: EventBus::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> TransitionableId {
        self.id
    }

    /// Last stable or sampled value; never triggers sampling.
    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[inline]
    pub fn velocity(&self) -> Option<&State> {
        self.velocity.as_ref()
    }

    #[inline]
    pub fn activity(&self) -> ActivityState {
        self.activity
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Entries waiting behind the loaded one.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping.is_some()
    }

    /// Registry name of the loaded engine.
    pub fn engine_kind(&self) -> Option<&str> {
        self.engine.as_ref().map(|l| l.kind.as_str())
    }

    pub(crate) fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    fn emit(&mut self, ctx: &mut Ctx<'_>, kind: EventKind) {
        self.events.emit(kind, &self.state);
        ctx.outputs.push_event(TransitionEvent {
            id: self.id,
            kind,
            value: self.state.clone(),
        });
    }

    /// Enter START: register for ticks and announce.
    fn begin(&mut self, ctx: &mut Ctx<'_>) {
        self.activity = ActivityState::Start;
        self.registered = true;
        ctx.ticker.register(self.id);
        log::debug!("transitionable {:?} started", self.id);
        self.emit(ctx, EventKind::Start);
    }

    /// Enter END: unregister and announce the final state.
    fn finish(&mut self, ctx: &mut Ctx<'_>) {
        self.activity = ActivityState::End;
        self.registered = false;
        ctx.ticker.unregister(self.id);
        log::debug!("transitionable {:?} ended at {:?}", self.id, self.state);
        self.emit(ctx, EventKind::End);
    }

    /// Hard reset: drop engine, queue, loop plan and pending callback. No events.
    pub(crate) fn reset(&mut self, start: State, velocity: Option<State>) {
        self.engine = None;
        self.queue.clear();
        self.callback = None;
        self.looping = None;
        self.finishing = false;
        self.epoch += 1;
        self.state = start;
        self.velocity = velocity;
    }

    /// Freeze at the interpolated value for `now` and drop everything in flight.
    /// Activity is left as is and no `end` is emitted.
    pub(crate) fn halt(&mut self, now: f64) {
        if let Some(mut loaded) = self.engine.take() {
            let sample = loaded.engine.get(now);
            self.state = State::from_components(&loaded.shape, &sample);
        }
        self.velocity = None;
        self.queue.clear();
        self.callback = None;
        self.looping = None;
        self.finishing = false;
        self.epoch += 1;
    }

    /// Jump straight to `target`. Returns whether a cleanup task must be scheduled.
    pub(crate) fn set_instant(&mut self, ctx: &mut Ctx<'_>, target: State) -> bool {
        self.activity = match self.activity {
            ActivityState::None | ActivityState::End => ActivityState::Start,
            ActivityState::Update => ActivityState::End,
            ActivityState::Start => ActivityState::Start,
        };
        self.reset(target, None);
        if self.dirty {
            return false;
        }
        self.dirty = true;
        self.begin(ctx);
        true
    }

    /// Deferred half of an instantaneous set. A transition queued since then keeps the
    /// instance registered and will end on its own.
    pub(crate) fn clean_instant(&mut self, ctx: &mut Ctx<'_>) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if self.engine.is_some() {
            return;
        }
        self.finish(ctx);
    }

    /// Shape-check `target` against the current state.
    pub(crate) fn align(&self, target: &State) -> Result<Vec<f64>, TransitionError> {
        target.check_finite()?;
        target.aligned_components(&self.state.shape())
    }

    /// Queue a transition toward `target` and load it.
    pub(crate) fn set_transition(
        &mut self,
        ctx: &mut Ctx<'_>,
        target: Vec<f64>,
        spec: TransitionSpec,
        callback: Option<Callback>,
    ) {
        match self.activity {
            ActivityState::Update => self.halt(ctx.now),
            // Loaded but never sampled: the new entry supersedes it.
            ActivityState::Start if self.engine.is_some() => self.halt(ctx.now),
            activity if activity.is_idle() => self.begin(ctx),
            _ => {}
        }
        self.looping = None;
        self.epoch += 1;
        self.queue.push_back(Pending {
            target,
            spec,
            callback,
        });
        self.load_next(ctx);
    }

    /// Append steps behind the loaded entry without touching it.
    pub(crate) fn enqueue(
        &mut self,
        steps: impl IntoIterator<Item = (Vec<f64>, TransitionSpec)>,
        mut callback: Option<Callback>,
    ) {
        let steps: Vec<_> = steps.into_iter().collect();
        let last = steps.len().saturating_sub(1);
        for (i, (target, spec)) in steps.into_iter().enumerate() {
            self.queue.push_back(Pending {
                target,
                spec,
                callback: if i == last { callback.take() } else { None },
            });
        }
    }

    pub(crate) fn start_loop(&mut self, steps: Vec<(Vec<f64>, TransitionSpec)>) {
        self.looping = Some(LoopPlan { steps });
    }

    /// Pop the next entry into the engine. Returns false when the queue is empty.
    fn load_next(&mut self, ctx: &mut Ctx<'_>) -> bool {
        let Some(Pending {
            target,
            mut spec,
            callback,
        }) = self.queue.pop_front()
        else {
            return false;
        };
        self.callback = callback;

        let shape = self.state.shape();
        let (name, kind) = ctx.registry.resolve(spec.curve.as_ref());
        let reuse = matches!(&self.engine, Some(l) if l.kind == name && l.shape == shape);
        if !reuse {
            log::debug!(
                "transitionable {:?}: loading '{name}' engine for {shape}",
                self.id
            );
            self.engine = Some(LoadedEngine {
                kind: name.to_string(),
                shape: shape.clone(),
                engine: kind.instantiate(ctx.cfg, shape.component_count()),
            });
        }
        let Some(loaded) = self.engine.as_mut() else {
            return false;
        };

        let start = self.state.components();
        let velocity = self.velocity.as_ref().map(State::components);
        loaded.engine.reset(&start, velocity.as_deref());
        if self.velocity.is_some() {
            spec.velocity = Some(State::from_components(&shape, &loaded.engine.velocity()));
        }
        loaded.engine.set(&target, &spec, ctx.now);
        true
    }

    /// Sample the engine for this tick. On completion the queue advances (re-seeding a
    /// loop when drained); when nothing is left the terminal sequence is deferred.
    pub(crate) fn update(&mut self, ctx: &mut Ctx<'_>) {
        if self.finishing {
            return;
        }
        let Some(loaded) = self.engine.as_mut() else {
            return;
        };
        self.activity = ActivityState::Update;
        let sample = loaded.engine.get(ctx.now);
        let still_active = loaded.engine.is_active();
        let velocity = self
            .velocity
            .is_some()
            .then(|| State::from_components(&loaded.shape, &loaded.engine.velocity()));
        self.state = State::from_components(&loaded.shape, &sample);
        if velocity.is_some() {
            self.velocity = velocity;
        }
        log::trace!("transitionable {:?} sampled {:?}", self.id, self.state);
        self.emit(ctx, EventKind::Update);
        if still_active {
            return;
        }

        let reseed = match &self.looping {
            Some(plan) if self.queue.is_empty() => Some(plan.steps.clone()),
            _ => None,
        };
        if let Some(steps) = reseed {
            self.enqueue(steps, None);
        }
        if !self.queue.is_empty() {
            if let Some(done) = self.callback.take() {
                ctx.phase.push(done);
            }
            self.load_next(ctx);
            return;
        }

        self.finishing = true;
        let id = self.id;
        let epoch = self.epoch;
        let done = self.callback.take();
        ctx.phase
            .push(move |scheduler: &mut Scheduler| scheduler.complete(id, epoch, done));
    }

    /// Terminal sequence, unless a newer set superseded the finished transition.
    pub(crate) fn complete(&mut self, ctx: &mut Ctx<'_>, epoch: u64) {
        if !self.finishing || self.epoch != epoch {
            return;
        }
        self.finishing = false;
        self.engine = None;
        self.finish(ctx);
    }
}

impl fmt::Debug for Transitionable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transitionable")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("velocity", &self.velocity)
            .field("activity", &self.activity)
            .field("queued", &self.queue.len())
            .field("engine", &self.engine_kind())
            .field("registered", &self.registered)
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Align every value of a sequence against `shape` and pair it with its step spec.
pub(crate) fn plan_steps(
    current: &State,
    values: &[State],
    transitions: &TransitionSteps,
) -> Result<Vec<(Vec<f64>, TransitionSpec)>, TransitionError> {
    transitions.check_len(values.len())?;
    let shape = current.shape();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            value.check_finite()?;
            let mut spec = transitions.at(i).clone();
            spec.validate()?;
            spec.align_velocity(&shape)?;
            Ok((value.aligned_components(&shape)?, spec))
        })
        .collect()
}
