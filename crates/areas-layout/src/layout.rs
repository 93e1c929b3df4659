//! Transactional layout facade.
//!
//! [`Layout`] owns the tree, the host's content catalog and the content-move
//! subscriptions. Every mutation runs on a clone of the tree, the clone is
//! validated, and only then does it replace the live tree. A failed call
//! leaves the tree and its id counters exactly as they were.

use tracing::{debug, info, warn};

use crate::catalog::ContentCatalog;
use crate::error::LayoutError;
use crate::node::{ContainerId, ContentRef, Direction, LeafId};
use crate::operation::{LayoutOperation, LayoutOperationKind, OperationOutcome};
use crate::snapshot::LayoutSnapshot;
use crate::subscription::{ContentCallback, SubscriptionId, Subscriptions};
use crate::tree::{ContentMove, LayoutTree, RevisionManifest, SplitOutcome};

/// Result of [`Layout::swap_content`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Content items that changed leaf. Empty when nothing moved.
    pub moves: Vec<ContentMove>,
    /// Number of subscription callbacks invoked.
    pub notified: usize,
}

/// A layout tree plus the host state needed to mutate it.
///
/// Subscription callbacks run while the layout is mutably borrowed, so they
/// cannot call back into it. Hosts that need follow-up changes should queue
/// [`LayoutOperation`]s from the callback and [`apply`](Self::apply) them
/// after the swap returns.
#[derive(Debug)]
pub struct Layout {
    tree: LayoutTree,
    catalog: ContentCatalog,
    subscriptions: Subscriptions,
}

impl Layout {
    /// A layout holding a single empty leaf.
    #[must_use]
    pub fn new(catalog: ContentCatalog) -> Self {
        Self::from_tree(LayoutTree::singleton(ContentRef::Empty), catalog)
    }

    /// A layout holding a single leaf showing `content`.
    pub fn singleton(catalog: ContentCatalog, content: ContentRef) -> Result<Self, LayoutError> {
        catalog.check(&content)?;
        Ok(Self::from_tree(LayoutTree::singleton(content), catalog))
    }

    pub(crate) fn from_tree(tree: LayoutTree, catalog: ContentCatalog) -> Self {
        info!(
            target: "areas.layout",
            leaves = tree.leaf_count(),
            containers = tree.container_count(),
            catalog = catalog.len(),
            "layout constructed"
        );
        Self {
            tree,
            catalog,
            subscriptions: Subscriptions::default(),
        }
    }

    #[must_use]
    pub const fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    #[must_use]
    pub const fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Split `leaf` in two along `direction`.
    ///
    /// The existing leaf keeps `percentage` of its share; the new, empty leaf
    /// is placed after it when `insert_after` is true, before it otherwise.
    pub fn split_leaf(
        &mut self,
        leaf: LeafId,
        direction: Direction,
        percentage: f64,
        insert_after: bool,
    ) -> Result<SplitOutcome, LayoutError> {
        let outcome = self.commit(LayoutOperationKind::SplitLeaf, |tree| {
            tree.split_leaf(leaf, direction, percentage, insert_after)
        })?;
        debug!(
            target: "areas.layout",
            leaf = leaf.get(),
            new_leaf = outcome.leaf.get(),
            direction = direction.as_str(),
            percentage,
            insert_after,
            changed = outcome.manifest.changed.len(),
            "leaf split"
        );
        Ok(outcome)
    }

    /// Remove a non-root leaf, folding its share into a sibling.
    pub fn delete_leaf(&mut self, leaf: LeafId) -> Result<RevisionManifest, LayoutError> {
        let manifest = self.commit(LayoutOperationKind::DeleteLeaf, |tree| tree.delete_leaf(leaf))?;
        debug!(
            target: "areas.layout",
            leaf = leaf.get(),
            removed = manifest.removed.len(),
            root_changed = manifest.root_changed,
            changed = manifest.changed.len(),
            "leaf deleted"
        );
        Ok(manifest)
    }

    /// Exchange the content of two leaves and notify subscribers of each
    /// content item that moved.
    pub fn swap_content(&mut self, first: LeafId, second: LeafId) -> Result<SwapOutcome, LayoutError> {
        let mut next = self.tree.clone();
        let result = next.swap_content(first, second, &self.catalog);
        let moves = self.finish(LayoutOperationKind::SwapContent, next, result)?;
        let notified: usize = moves
            .iter()
            .filter_map(|moved| {
                let key = self.catalog.key(&moved.content).ok()?;
                Some(self.subscriptions.notify(key, moved))
            })
            .sum();
        debug!(
            target: "areas.layout",
            first = first.get(),
            second = second.get(),
            moved = moves.len(),
            notified,
            "content swapped"
        );
        Ok(SwapOutcome { moves, notified })
    }

    /// Replace a container's ratios. Revisions are not bumped.
    pub fn update_ratios(&mut self, container: ContainerId, ratios: Vec<f64>) -> Result<(), LayoutError> {
        self.commit(LayoutOperationKind::UpdateRatios, |tree| {
            tree.set_ratios(container, ratios)
        })?;
        debug!(target: "areas.layout", container = container.get(), "ratios updated");
        Ok(())
    }

    /// Move the divider after child `index` by `delta` percentage points,
    /// clamped so neither neighbor goes below 0. Returns the applied delta.
    pub fn resize_divider(
        &mut self,
        container: ContainerId,
        index: usize,
        delta: f64,
    ) -> Result<f64, LayoutError> {
        let applied = self.commit(LayoutOperationKind::ResizeDivider, |tree| {
            tree.resize_divider(container, index, delta)
        })?;
        debug!(
            target: "areas.layout",
            container = container.get(),
            index,
            delta,
            applied,
            "divider resized"
        );
        Ok(applied)
    }

    /// Point a leaf at different catalog content. Returns the previous content.
    pub fn change_leaf_content(
        &mut self,
        leaf: LeafId,
        content: ContentRef,
    ) -> Result<ContentRef, LayoutError> {
        let mut next = self.tree.clone();
        let result = self
            .catalog
            .check(&content)
            .map_err(LayoutError::from)
            .and_then(|()| next.set_content(leaf, content));
        let previous = self.finish(LayoutOperationKind::ChangeLeafContent, next, result)?;
        debug!(
            target: "areas.layout",
            leaf = leaf.get(),
            previous = %previous,
            "leaf content changed"
        );
        Ok(previous)
    }

    /// Export the current tree.
    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        self.tree.to_snapshot()
    }

    /// Replace the tree with a validated snapshot.
    ///
    /// Ids in the snapshot are kept; id counters never move backwards, so ids
    /// retired before the restore are still not reissued. Subscriptions are
    /// kept.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) -> Result<RevisionManifest, LayoutError> {
        match LayoutTree::from_snapshot(snapshot, &self.catalog, self.tree.allocator()) {
            Ok((tree, manifest)) => {
                self.tree = tree;
                info!(
                    target: "areas.layout",
                    leaves = self.tree.leaf_count(),
                    containers = self.tree.container_count(),
                    "layout restored"
                );
                Ok(manifest)
            }
            Err(err) => {
                warn!(target: "areas.layout", error = %err, "layout restore rejected");
                Err(err)
            }
        }
    }

    /// Register `callback` to run whenever a swap moves `content`.
    ///
    /// `content` must resolve against the catalog; any spelling of an entry
    /// (index or name) hears about moves of that entry.
    pub fn subscribe<F>(
        &mut self,
        content: ContentRef,
        callback: F,
    ) -> Result<SubscriptionId, LayoutError>
    where
        F: FnMut(LeafId, LeafId) + 'static,
    {
        let key = match self.catalog.key(&content) {
            Ok(key) => key,
            Err(err) => {
                warn!(
                    target: "areas.layout",
                    content = %content,
                    error = %err,
                    "subscription rejected"
                );
                return Err(err.into());
            }
        };
        let callback: ContentCallback = Box::new(callback);
        Ok(self.subscriptions.subscribe(key, callback))
    }

    /// Remove a subscription. Returns false when `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Execute a serialized operation.
    pub fn apply(&mut self, operation: LayoutOperation) -> Result<OperationOutcome, LayoutError> {
        match operation {
            LayoutOperation::SplitLeaf {
                leaf,
                direction,
                percentage,
                insert_after,
            } => self
                .split_leaf(leaf, direction, percentage, insert_after)
                .map(OperationOutcome::Split),
            LayoutOperation::DeleteLeaf { leaf } => {
                self.delete_leaf(leaf).map(OperationOutcome::Deleted)
            }
            LayoutOperation::SwapContent { first, second } => self
                .swap_content(first, second)
                .map(OperationOutcome::Swapped),
            LayoutOperation::UpdateRatios { container, ratios } => self
                .update_ratios(container, ratios)
                .map(|()| OperationOutcome::RatiosUpdated),
            LayoutOperation::ResizeDivider {
                container,
                index,
                delta,
            } => self
                .resize_divider(container, index, delta)
                .map(|applied| OperationOutcome::Resized { applied }),
            LayoutOperation::ChangeLeafContent { leaf, content } => self
                .change_leaf_content(leaf, content)
                .map(|previous| OperationOutcome::ContentChanged { previous }),
        }
    }

    fn commit<T>(
        &mut self,
        kind: LayoutOperationKind,
        mutate: impl FnOnce(&mut LayoutTree) -> Result<T, LayoutError>,
    ) -> Result<T, LayoutError> {
        let mut next = self.tree.clone();
        let result = mutate(&mut next);
        self.finish(kind, next, result)
    }

    fn finish<T>(
        &mut self,
        kind: LayoutOperationKind,
        next: LayoutTree,
        result: Result<T, LayoutError>,
    ) -> Result<T, LayoutError> {
        let validated = result.and_then(|value| {
            next.validate()?;
            Ok(value)
        });
        match validated {
            Ok(value) => {
                self.tree = next;
                Ok(value)
            }
            Err(err) => {
                warn!(
                    target: "areas.layout",
                    operation = kind.as_str(),
                    error_kind = ?err.kind(),
                    error = %err,
                    "layout operation rejected"
                );
                Err(err)
            }
        }
    }
}
