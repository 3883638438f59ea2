//! Per-frame registration of instances that need `update()` calls.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::ids::TransitionableId;

/// Scheduling hint: whether any work is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerSignal {
    Dirty,
    Clean,
}

/// Ordered set of registered instances plus a dirty/clean balance.
#[derive(Debug, Default)]
pub struct Ticker {
    registered: IndexSet<TransitionableId>,
    dirty: usize,
}

impl Ticker {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registered: IndexSet::with_capacity(capacity),
            dirty: 0,
        }
    }

    /// Subscribe `id` to per-frame updates; returns whether it was newly registered.
    pub fn register(&mut self, id: TransitionableId) -> bool {
        let inserted = self.registered.insert(id);
        if inserted {
            self.trigger(TickerSignal::Dirty);
        }
        inserted
    }

    /// Unsubscribe `id`; returns whether it was registered.
    pub fn unregister(&mut self, id: TransitionableId) -> bool {
        let removed = self.registered.shift_remove(&id);
        if removed {
            self.trigger(TickerSignal::Clean);
        }
        removed
    }

    pub fn trigger(&mut self, signal: TickerSignal) {
        match signal {
            TickerSignal::Dirty => self.dirty += 1,
            TickerSignal::Clean => self.dirty = self.dirty.saturating_sub(1),
        }
    }

    #[inline]
    pub fn is_registered(&self, id: TransitionableId) -> bool {
        self.registered.contains(&id)
    }

    /// Snapshot of registered ids in registration order.
    pub fn registered(&self) -> Vec<TransitionableId> {
        self.registered.iter().copied().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Dirty signals not yet balanced by clean ones.
    #[inline]
    pub fn pending_work(&self) -> usize {
        self.dirty
    }
}
