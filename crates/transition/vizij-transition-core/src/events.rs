//! Lifecycle events.
//!
//! Instances publish `start`, `update` and `end` with their current state. Subscribers
//! registered through [`Scheduler::on`](crate::Scheduler::on) are called synchronously;
//! every event is also recorded in the scheduler's [`Outputs`] for the current frame.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::TransitionableId;
use crate::state::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Update,
    End,
}

impl EventKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Update => "update",
            Self::End => "end",
        }
    }
}

/// One emitted lifecycle event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub id: TransitionableId,
    pub kind: EventKind,
    pub value: State,
}

/// Events emitted since the last frame began.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<TransitionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: TransitionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of `kind` for `id`, in emission order.
    pub fn of(&self, id: TransitionableId, kind: EventKind) -> impl Iterator<Item = &TransitionEvent> {
        self.events
            .iter()
            .filter(move |e| e.id == id && e.kind == kind)
    }
}

pub type Handler = Box<dyn FnMut(&State)>;

/// Per-instance subscriber lists.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl EventBus {
    pub fn on(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    pub fn emit(&mut self, kind: EventKind, value: &State) {
        if let Some(handlers) = self.handlers.get_mut(&kind) {
            for handler in handlers.iter_mut() {
                handler(value);
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(k, v)| (k.name(), v.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_receive_only_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        let sink = seen.clone();
        bus.on(
            EventKind::End,
            Box::new(move |v| sink.borrow_mut().push(v.clone())),
        );
        bus.emit(EventKind::Start, &State::Scalar(1.0));
        bus.emit(EventKind::End, &State::Scalar(2.0));
        assert_eq!(*seen.borrow(), vec![State::Scalar(2.0)]);
    }

    #[test]
    fn outputs_filter_by_instance_and_kind() {
        let mut out = Outputs::default();
        let a = TransitionableId(0);
        let b = TransitionableId(1);
        for (id, kind) in [(a, EventKind::Start), (b, EventKind::Start), (a, EventKind::End)] {
            out.push_event(TransitionEvent {
                id,
                kind,
                value: State::Scalar(0.0),
            });
        }
        assert_eq!(out.of(a, EventKind::Start).count(), 1);
        assert_eq!(out.of(a, EventKind::End).count(), 1);
        assert_eq!(out.of(b, EventKind::End).count(), 0);
        out.clear();
        assert!(out.is_empty());
    }
}
