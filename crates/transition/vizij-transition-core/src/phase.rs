//! Deferred "after the current phase" work.
//!
//! Tasks run once, FIFO, when the owning scheduler flushes: explicitly through
//! [`Scheduler::flush`](crate::Scheduler::flush) and around every tick. Tasks pushed while
//! a flush is running are drained by that same flush.

use std::collections::VecDeque;
use std::fmt;

use crate::scheduler::Scheduler;

/// One deferred unit of work.
pub type Task = Box<dyn FnOnce(&mut Scheduler)>;

#[derive(Default)]
pub struct PhaseQueue {
    tasks: VecDeque<Task>,
}

impl PhaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, task: F)
    where
        F: FnOnce(&mut Scheduler) + 'static,
    {
        self.tasks.push_back(Box::new(task));
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for PhaseQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseQueue")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
