//! Content-move subscriptions.
//!
//! Hosts that cache rendered content per leaf register a callback against a
//! content selector. When a swap relocates that content, the callback learns
//! the leaf now showing it and the leaf that showed it before. Selectors are
//! keyed by the catalog entry they resolve to, so a subscription made by name
//! also hears about moves of the same entry spelled by index.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::catalog::ContentKey;
use crate::node::LeafId;
use crate::tree::ContentMove;

/// Handle returned by [`crate::Layout::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Callback invoked with `(current_leaf, previous_leaf)`.
pub type ContentCallback = Box<dyn FnMut(LeafId, LeafId)>;

#[derive(Default)]
pub(crate) struct Subscriptions {
    by_content: FxHashMap<ContentKey, Vec<(SubscriptionId, ContentCallback)>>,
    owners: FxHashMap<SubscriptionId, ContentKey>,
    next_id: u64,
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("subscriptions_count", &self.owners.len())
            .field("contents_count", &self.by_content.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Subscriptions {
    pub(crate) fn subscribe(
        &mut self,
        content: ContentKey,
        callback: ContentCallback,
    ) -> SubscriptionId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = SubscriptionId(self.next_id);
        let _ = self.owners.insert(id, content);
        self.by_content
            .entry(content)
            .or_default()
            .push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(content) = self.owners.remove(&id) else {
            return false;
        };
        if let Some(callbacks) = self.by_content.get_mut(&content) {
            callbacks.retain(|(candidate, _)| *candidate != id);
            if callbacks.is_empty() {
                let _ = self.by_content.remove(&content);
            }
        }
        true
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.owners.len()
    }

    /// Run every callback registered for `content`, in registration order.
    /// Returns how many callbacks ran.
    pub(crate) fn notify(&mut self, content: ContentKey, moved: &ContentMove) -> usize {
        let Some(callbacks) = self.by_content.get_mut(&content) else {
            return 0;
        };
        for (_, callback) in callbacks.iter_mut() {
            callback(moved.current, moved.previous);
        }
        callbacks.len()
    }
}
