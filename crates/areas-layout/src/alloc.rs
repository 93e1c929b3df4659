//! Monotonic id and revision allocation.
//!
//! Each category has its own counter that only moves forward. A retired
//! leaf id is never issued again, so host caches keyed by leaf id cannot be
//! confused by a later split.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::node::{ContainerId, LeafId, Revision};

/// Deterministic allocator for leaf ids, container ids and revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_leaf: LeafId,
    next_container: ContainerId,
    next_revision: Revision,
}

impl IdAllocator {
    /// Start allocating from known values.
    #[must_use]
    pub const fn with_next(
        next_leaf: LeafId,
        next_container: ContainerId,
        next_revision: Revision,
    ) -> Self {
        Self {
            next_leaf,
            next_container,
            next_revision,
        }
    }

    /// Peek at the next leaf id without consuming.
    #[must_use]
    pub const fn peek_leaf(&self) -> LeafId {
        self.next_leaf
    }

    /// Peek at the next container id without consuming.
    #[must_use]
    pub const fn peek_container(&self) -> ContainerId {
        self.next_container
    }

    /// Peek at the next revision without consuming.
    #[must_use]
    pub const fn peek_revision(&self) -> Revision {
        self.next_revision
    }

    pub fn next_leaf_id(&mut self) -> Result<LeafId, LayoutError> {
        let current = self.next_leaf;
        self.next_leaf = current
            .checked_next()
            .ok_or(LayoutError::IdOverflow { kind: "leaf" })?;
        Ok(current)
    }

    pub fn next_container_id(&mut self) -> Result<ContainerId, LayoutError> {
        let current = self.next_container;
        self.next_container = current
            .checked_next()
            .ok_or(LayoutError::IdOverflow { kind: "container" })?;
        Ok(current)
    }

    pub fn next_revision(&mut self) -> Result<Revision, LayoutError> {
        let current = self.next_revision;
        self.next_revision = current
            .checked_next()
            .ok_or(LayoutError::IdOverflow { kind: "revision" })?;
        Ok(current)
    }

    /// Advance the leaf counter past `id` if needed. Never moves backwards.
    pub(crate) fn observe_leaf(&mut self, id: LeafId) -> Result<(), LayoutError> {
        if id >= self.next_leaf {
            self.next_leaf = id
                .checked_next()
                .ok_or(LayoutError::IdOverflow { kind: "leaf" })?;
        }
        Ok(())
    }

    /// Advance the container counter past `id` if needed. Never moves backwards.
    pub(crate) fn observe_container(&mut self, id: ContainerId) -> Result<(), LayoutError> {
        if id >= self.next_container {
            self.next_container = id
                .checked_next()
                .ok_or(LayoutError::IdOverflow { kind: "container" })?;
        }
        Ok(())
    }

    /// Raise the counters to persisted values, keeping whichever is larger.
    pub(crate) fn raise_to(&mut self, next_leaf: Option<LeafId>, next_container: Option<ContainerId>) {
        if let Some(next_leaf) = next_leaf {
            self.next_leaf = self.next_leaf.max(next_leaf);
        }
        if let Some(next_container) = next_container {
            self.next_container = self.next_container.max(next_container);
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_leaf: LeafId::MIN,
            next_container: ContainerId::MIN,
            next_revision: Revision::MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(raw: u64) -> LeafId {
        LeafId::new(raw).expect("test ID must be non-zero")
    }

    #[test]
    fn allocator_is_deterministic() {
        let mut allocator = IdAllocator::default();
        assert_eq!(allocator.next_leaf_id().expect("leaf 1"), leaf(1));
        assert_eq!(allocator.next_leaf_id().expect("leaf 2"), leaf(2));
        assert_eq!(allocator.peek_leaf(), leaf(3));
        assert_eq!(
            allocator.next_container_id().expect("container 1"),
            ContainerId::MIN
        );
        assert_eq!(allocator.next_revision().expect("revision 1"), Revision::MIN);
    }

    #[test]
    fn observe_never_moves_backwards() {
        let mut allocator = IdAllocator::default();
        allocator.observe_leaf(leaf(9)).expect("observe 9");
        assert_eq!(allocator.peek_leaf(), leaf(10));
        allocator.observe_leaf(leaf(4)).expect("observe 4");
        assert_eq!(allocator.peek_leaf(), leaf(10));
        allocator.raise_to(Some(leaf(6)), None);
        assert_eq!(allocator.peek_leaf(), leaf(10));
        allocator.raise_to(Some(leaf(20)), None);
        assert_eq!(allocator.peek_leaf(), leaf(20));
    }

    #[test]
    fn exhausted_counter_reports_overflow() {
        let mut allocator = IdAllocator::with_next(
            leaf(u64::MAX),
            ContainerId::MIN,
            Revision::MIN,
        );
        assert_eq!(
            allocator.next_leaf_id(),
            Err(LayoutError::IdOverflow { kind: "leaf" })
        );
        assert_eq!(allocator.peek_leaf(), leaf(u64::MAX));
    }

    proptest! {
        #[test]
        fn allocator_produces_monotonic_ids(
            start in 1u64..1_000_000,
            count in 1usize..64,
        ) {
            let mut allocator = IdAllocator::with_next(
                LeafId::new(start).expect("start must be valid"),
                ContainerId::MIN,
                Revision::MIN,
            );
            let mut prev = 0u64;
            for _ in 0..count {
                let current = allocator.next_leaf_id().expect("allocation must succeed").get();
                prop_assert!(current > prev);
                prev = current;
            }
        }
    }
}
