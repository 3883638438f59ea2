//! Scheduler: owns transitionables and the collaborators they share.
//!
//! Methods:
//! - create/remove, get/velocity/activity/is_active
//! - set, reset, halt, delay, iterate, loop_values
//! - update (one instance), flush (deferred phase), tick (advance clock → flush → update
//!   registered → flush)
//!
//! Everything runs on the caller's thread. Work that must wait for the current phase to
//! unwind (instantaneous-set cleanup, end-of-transition sequencing) goes through the
//! [`PhaseQueue`] and runs on the next [`Scheduler::flush`], which every tick performs
//! before and after sampling.

use hashbrown::HashMap;

use crate::activity::ActivityState;
use crate::config::Config;
use crate::error::TransitionError;
use crate::events::{EventKind, Outputs};
use crate::ids::{IdAllocator, TransitionableId};
use crate::phase::PhaseQueue;
use crate::registry::EngineRegistry;
use crate::spec::{TransitionSpec, TransitionSteps};
use crate::state::State;
use crate::ticker::Ticker;
use crate::transitionable::{plan_steps, Callback, Ctx, Transitionable};
use crate::Result;

#[derive(Debug)]
pub struct Scheduler {
    cfg: Config,
    ids: IdAllocator,
    slots: HashMap<TransitionableId, Transitionable>,
    registry: EngineRegistry,
    ticker: Ticker,
    phase: PhaseQueue,
    outputs: Outputs,
    /// Scheduler clock in ms.
    now: f64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Scheduler {
    pub fn new(cfg: Config) -> Self {
        Self {
            ids: IdAllocator::new(),
            slots: HashMap::with_capacity(cfg.initial_capacity),
            registry: EngineRegistry::new(&cfg.default_engine),
            ticker: Ticker::with_capacity(cfg.initial_capacity),
            phase: PhaseQueue::new(),
            outputs: Outputs::default(),
            now: 0.0,
            cfg,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// Engine registrations; configure before instances start transitioning.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut EngineRegistry {
        &mut self.registry
    }

    #[inline]
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock without sampling anything.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
    }

    /// Events emitted since the last tick returned.
    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Deferred tasks waiting for the next flush.
    #[inline]
    pub fn pending_tasks(&self) -> usize {
        self.phase.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// New instance at scalar zero. An initial value is applied as an instantaneous set on
    /// the next flush rather than synchronously.
    pub fn create(&mut self, initial: Option<State>) -> Result<TransitionableId> {
        if let Some(value) = &initial {
            value.check_finite()?;
        }
        let id = self.ids.alloc();
        self.slots.insert(id, Transitionable::new(id));
        if let Some(value) = initial {
            self.phase.push(move |scheduler: &mut Scheduler| {
                if let Err(err) = scheduler.set(id, value, None, None) {
                    log::warn!("initial value for {id:?} dropped: {err}");
                }
            });
        }
        Ok(id)
    }

    /// Discard an instance. Pending callbacks are dropped and it leaves the ticker.
    pub fn remove(&mut self, id: TransitionableId) -> bool {
        match self.slots.remove(&id) {
            Some(_) => {
                self.ticker.unregister(id);
                true
            }
            None => false,
        }
    }

    pub fn instance(&self, id: TransitionableId) -> Result<&Transitionable> {
        self.slots
            .get(&id)
            .ok_or(TransitionError::UnknownTransitionable { id })
    }

    /// Current value; does not sample.
    pub fn get(&self, id: TransitionableId) -> Result<&State> {
        Ok(self.instance(id)?.state())
    }

    pub fn velocity(&self, id: TransitionableId) -> Result<Option<&State>> {
        Ok(self.instance(id)?.velocity())
    }

    pub fn activity(&self, id: TransitionableId) -> Result<ActivityState> {
        Ok(self.instance(id)?.activity())
    }

    /// True exactly while the instance is being sampled (UPDATE).
    pub fn is_active(&self, id: TransitionableId) -> Result<bool> {
        Ok(self.instance(id)?.is_active())
    }

    /// Whether the ticker currently samples this instance.
    pub fn is_registered(&self, id: TransitionableId) -> Result<bool> {
        Ok(self.instance(id)?.is_registered())
    }

    /// Subscribe to an instance's lifecycle events.
    pub fn on<F>(&mut self, id: TransitionableId, kind: EventKind, handler: F) -> Result<()>
    where
        F: FnMut(&State) + 'static,
    {
        self.slots
            .get_mut(&id)
            .ok_or(TransitionError::UnknownTransitionable { id })?
            .events_mut()
            .on(kind, Box::new(handler));
        Ok(())
    }

    /// Run `f` against one instance with the shared collaborators lent out.
    fn with_instance<R>(
        &mut self,
        id: TransitionableId,
        f: impl FnOnce(&mut Transitionable, &mut Ctx<'_>) -> R,
    ) -> Result<R> {
        let Scheduler {
            cfg,
            slots,
            registry,
            ticker,
            phase,
            outputs,
            now,
            ..
        } = self;
        let slot = slots
            .get_mut(&id)
            .ok_or(TransitionError::UnknownTransitionable { id })?;
        let mut ctx = Ctx {
            cfg,
            registry,
            ticker,
            phase,
            outputs,
            now: *now,
        };
        Ok(f(slot, &mut ctx))
    }

    /// Move toward `target`.
    ///
    /// Without a transition the value jumps immediately, any in-flight transition is
    /// abandoned (its callback is dropped), and `callback` runs before this returns. One
    /// `end` follows on the next flush no matter how many instantaneous sets preceded it.
    ///
    /// With a transition the target must match the current shape. An active transition is
    /// halted first; otherwise the instance starts and registers for ticks.
    pub fn set(
        &mut self,
        id: TransitionableId,
        target: impl Into<State>,
        transition: Option<TransitionSpec>,
        callback: Option<Callback>,
    ) -> Result<()> {
        let target = target.into();
        match transition {
            None => {
                target.check_finite()?;
                let needs_cleanup = self.with_instance(id, |t, ctx| t.set_instant(ctx, target))?;
                if needs_cleanup {
                    self.phase
                        .push(move |scheduler: &mut Scheduler| scheduler.clean_instant(id));
                }
                if let Some(done) = callback {
                    done(self);
                }
                Ok(())
            }
            Some(mut spec) => {
                spec.validate()?;
                self.with_instance(id, |t, ctx| {
                    let aligned = t.align(&target)?;
                    spec.align_velocity(&t.state().shape())?;
                    t.set_transition(ctx, aligned, spec, callback);
                    Ok(())
                })?
            }
        }
    }

    /// Hard reset to `start` (and `velocity`); no events, nothing pending survives.
    pub fn reset(
        &mut self,
        id: TransitionableId,
        start: impl Into<State>,
        velocity: Option<State>,
    ) -> Result<()> {
        let start = start.into();
        start.check_finite()?;
        let velocity = match velocity {
            Some(v) => {
                v.check_finite()?;
                let shape = start.shape();
                Some(State::from_components(&shape, &v.aligned_components(&shape)?))
            }
            None => None,
        };
        self.with_instance(id, |t, _| t.reset(start, velocity))
    }

    /// Freeze at the current interpolated value and drop queued work.
    pub fn halt(&mut self, id: TransitionableId) -> Result<()> {
        let now = self.now;
        self.with_instance(id, |t, _| t.halt(now))
    }

    /// Hold the current value for `duration` ms, then run `callback`.
    pub fn delay(
        &mut self,
        id: TransitionableId,
        duration: f64,
        callback: Option<Callback>,
    ) -> Result<()> {
        let spec = TransitionSpec::hold(duration);
        spec.validate()?;
        let now = self.now;
        let current = self.with_instance(id, |t, _| {
            if t.is_active() {
                t.halt(now);
            }
            t.state().clone()
        })?;
        self.set(id, current, Some(spec), callback)
    }

    /// Transition through `values` in order, then run `callback` once.
    ///
    /// An empty sequence runs `callback` immediately.
    pub fn iterate(
        &mut self,
        id: TransitionableId,
        values: Vec<State>,
        transitions: impl Into<TransitionSteps>,
        callback: Option<Callback>,
    ) -> Result<()> {
        let transitions = transitions.into();
        let steps = plan_steps(self.get(id)?, &values, &transitions)?;
        self.run_steps(id, steps, callback)
    }

    /// Transition through `values` forever. An empty sequence does nothing.
    pub fn loop_values(
        &mut self,
        id: TransitionableId,
        values: Vec<State>,
        transitions: impl Into<TransitionSteps>,
    ) -> Result<()> {
        let transitions = transitions.into();
        let steps = plan_steps(self.get(id)?, &values, &transitions)?;
        if steps.is_empty() {
            return Ok(());
        }
        let plan = steps.clone();
        self.run_steps(id, steps, None)?;
        self.with_instance(id, |t, _| t.start_loop(plan))
    }

    fn run_steps(
        &mut self,
        id: TransitionableId,
        steps: Vec<(Vec<f64>, TransitionSpec)>,
        callback: Option<Callback>,
    ) -> Result<()> {
        let mut steps = steps.into_iter();
        let Some((first, first_spec)) = steps.next() else {
            if let Some(done) = callback {
                done(self);
            }
            return Ok(());
        };
        let rest: Vec<_> = steps.collect();
        self.with_instance(id, |t, ctx| {
            if rest.is_empty() {
                t.set_transition(ctx, first, first_spec, callback);
            } else {
                t.set_transition(ctx, first, first_spec, None);
                t.enqueue(rest, callback);
            }
        })
    }

    /// Sample one instance at the current clock.
    pub fn update(&mut self, id: TransitionableId) -> Result<()> {
        self.with_instance(id, |t, ctx| t.update(ctx))
    }

    /// Run deferred tasks, including ones queued while flushing. Returns how many ran.
    pub fn flush(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.phase.pop() {
            task(self);
            ran += 1;
            if ran >= self.cfg.max_flush_tasks && !self.phase.is_empty() {
                log::warn!(
                    "flush budget of {} tasks spent; {} left for the next flush",
                    self.cfg.max_flush_tasks,
                    self.phase.len()
                );
                break;
            }
        }
        ran
    }

    /// One frame: advance the clock by `dt` ms, flush, sample every registered instance in
    /// registration order, flush again. Returns the events emitted since the last tick.
    pub fn tick(&mut self, dt: f64) -> Outputs {
        self.advance(dt);
        self.flush();
        for id in self.ticker.registered() {
            if let Err(err) = self.update(id) {
                log::warn!("skipping tick for {id:?}: {err}");
            }
        }
        self.flush();
        std::mem::take(&mut self.outputs)
    }

    fn clean_instant(&mut self, id: TransitionableId) {
        // Removed instances have nothing to clean.
        let _ = self.with_instance(id, |t, ctx| t.clean_instant(ctx));
    }

    /// Terminal sequence of a drained transition, then its callback.
    pub(crate) fn complete(&mut self, id: TransitionableId, epoch: u64, callback: Option<Callback>) {
        if self.with_instance(id, |t, ctx| t.complete(ctx, epoch)).is_err() {
            return;
        }
        if let Some(done) = callback {
            done(self);
        }
    }
}
