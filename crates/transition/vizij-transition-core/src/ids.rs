//! Identifiers and a simple allocator for transitionable instances.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionableId(pub u32);

/// Monotonic allocator for TransitionableId.
/// Ids are never reused within one scheduler, so stale deferred tasks cannot hit a new instance.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> TransitionableId {
        let id = TransitionableId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc(), TransitionableId(0));
        assert_eq!(alloc.alloc(), TransitionableId(1));
        alloc.reset();
        assert_eq!(alloc.alloc(), TransitionableId(0));
    }
}
