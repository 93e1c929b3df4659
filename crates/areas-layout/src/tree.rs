//! Layout tree storage, navigation, and structural mutation.
//!
//! Records live in two arenas keyed by id. Every non-root record carries a
//! back-reference to its container, so parent and ancestor lookups walk up
//! the tree instead of scanning it. Mutators here work in place and are only
//! reachable through [`crate::Layout`], which runs them on a clone and commits
//! after [`LayoutTree::validate`] passes.

use std::collections::{BTreeMap, BTreeSet};

use crate::alloc::IdAllocator;
use crate::catalog::ContentCatalog;
use crate::error::{LayoutError, ValidationError};
use crate::node::{
    Container, ContainerId, ContentRef, Direction, Leaf, LeafId, Node, NodeId, Revision,
};
use crate::ratio::{apply_resize, merge_ratio, split_ratio, validate_ratios};

/// Containers whose revision changed during one operation.
///
/// Hosts re-render exactly the listed containers; everything else keeps its
/// previous revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionManifest {
    /// Containers that received a new revision, in stamping order.
    pub changed: Vec<(ContainerId, Revision)>,
    /// Containers created by the operation.
    pub created: Vec<ContainerId>,
    /// Containers removed by the operation.
    pub removed: Vec<ContainerId>,
    /// Whether the root node was replaced.
    pub root_changed: bool,
}

impl RevisionManifest {
    #[must_use]
    pub fn revision_of(&self, container: ContainerId) -> Option<Revision> {
        self.changed
            .iter()
            .find(|(id, _)| *id == container)
            .map(|(_, revision)| *revision)
    }

    #[must_use]
    pub fn contains(&self, container: ContainerId) -> bool {
        self.revision_of(container).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty() && !self.root_changed
    }
}

/// Result of a successful split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// The leaf created by the split.
    pub leaf: LeafId,
    pub manifest: RevisionManifest,
}

/// One content item relocated by a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMove {
    pub content: ContentRef,
    /// Leaf now showing the content.
    pub current: LeafId,
    /// Leaf that showed it before the swap.
    pub previous: LeafId,
}

/// Validated layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    root: NodeId,
    leaves: BTreeMap<LeafId, Leaf>,
    containers: BTreeMap<ContainerId, Container>,
    allocator: IdAllocator,
}

impl LayoutTree {
    /// Build a tree holding one root leaf.
    #[must_use]
    pub fn singleton(content: ContentRef) -> Self {
        let root = LeafId::MIN;
        let mut leaves = BTreeMap::new();
        let _ = leaves.insert(root, Leaf::new(root, None, content));
        let mut allocator = IdAllocator::default();
        allocator.raise_to(root.checked_next(), None);
        Self {
            root: NodeId::Leaf(root),
            leaves,
            containers: BTreeMap::new(),
            allocator,
        }
    }

    pub(crate) fn from_parts(
        root: NodeId,
        leaves: BTreeMap<LeafId, Leaf>,
        containers: BTreeMap<ContainerId, Container>,
        allocator: IdAllocator,
    ) -> Self {
        Self {
            root,
            leaves,
            containers,
            allocator,
        }
    }

    // ----------------------------------------------------------------------
    // Navigation
    // ----------------------------------------------------------------------

    /// Root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Id/revision counters.
    #[must_use]
    pub const fn allocator(&self) -> &IdAllocator {
        &self.allocator
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn leaf(&self, id: LeafId) -> Result<&Leaf, LayoutError> {
        self.leaves
            .get(&id)
            .ok_or(LayoutError::LeafNotFound { leaf: id })
    }

    pub fn container(&self, id: ContainerId) -> Result<&Container, LayoutError> {
        self.containers
            .get(&id)
            .ok_or(LayoutError::ContainerNotFound { container: id })
    }

    pub fn node(&self, id: NodeId) -> Result<Node<'_>, LayoutError> {
        match id {
            NodeId::Leaf(leaf) => self.leaf(leaf).map(Node::Leaf),
            NodeId::Container(container) => self.container(container).map(Node::Container),
        }
    }

    /// Iterate leaves in id order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.values()
    }

    /// Iterate containers in id order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    /// Container holding `node`, or `None` for the root.
    pub fn parent_of(&self, node: NodeId) -> Result<Option<ContainerId>, LayoutError> {
        self.node(node).map(|node| node.parent())
    }

    /// Containers above `node`, nearest first, ending at the root container.
    pub fn ancestors_of(&self, node: NodeId) -> Result<Vec<ContainerId>, LayoutError> {
        let mut ancestors = Vec::new();
        let mut cursor = self.parent_of(node)?;
        while let Some(container) = cursor {
            ancestors.push(container);
            cursor = self.container(container)?.parent;
        }
        Ok(ancestors)
    }

    /// Position of `node` among its siblings, or `None` for the root.
    pub fn index_in_parent(&self, node: NodeId) -> Result<Option<usize>, LayoutError> {
        let Some(parent) = self.parent_of(node)? else {
            return Ok(None);
        };
        let index = self.container(parent)?.child_index(node).ok_or(
            ValidationError::ParentMismatch {
                node,
                expected: None,
                actual: Some(parent),
            },
        )?;
        Ok(Some(index))
    }

    /// All nodes in depth-first pre-order.
    #[must_use]
    pub fn nodes_in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.leaves.len() + self.containers.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            out.push(node);
            if let NodeId::Container(id) = node
                && let Some(container) = self.containers.get(&id)
            {
                stack.extend(container.children.iter().rev().copied());
            }
        }
        out
    }

    /// Leaves in depth-first pre-order (the host's rendering order).
    #[must_use]
    pub fn leaves_in_order(&self) -> Vec<LeafId> {
        self.nodes_in_order()
            .into_iter()
            .filter_map(NodeId::as_leaf)
            .collect()
    }

    /// Containers in depth-first pre-order.
    #[must_use]
    pub fn containers_in_order(&self) -> Vec<ContainerId> {
        self.nodes_in_order()
            .into_iter()
            .filter_map(NodeId::as_container)
            .collect()
    }

    /// First leaf in rendering order carrying `name`.
    #[must_use]
    pub fn find_leaf_by_name(&self, name: &str) -> Option<&Leaf> {
        self.leaves_in_order()
            .into_iter()
            .filter_map(|id| self.leaves.get(&id))
            .find(|leaf| leaf.name.as_deref() == Some(name))
    }

    /// First leaf in rendering order showing `content`.
    #[must_use]
    pub fn leaf_by_content(&self, content: &ContentRef) -> Option<&Leaf> {
        self.leaves_in_order()
            .into_iter()
            .filter_map(|id| self.leaves.get(&id))
            .find(|leaf| leaf.content == *content)
    }

    // ----------------------------------------------------------------------
    // Validation
    // ----------------------------------------------------------------------

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let root_parent = match self.root {
            NodeId::Leaf(id) => self.leaves.get(&id).map(|leaf| leaf.parent),
            NodeId::Container(id) => self.containers.get(&id).map(|container| container.parent),
        };
        match root_parent {
            None => return Err(ValidationError::MissingNode { node: self.root }),
            Some(Some(parent)) => {
                return Err(ValidationError::ParentMismatch {
                    node: self.root,
                    expected: None,
                    actual: Some(parent),
                });
            }
            Some(None) => {}
        }

        for container in self.containers.values() {
            validate_ratios(container.id, &container.ratios, container.children.len())?;
            for child in &container.children {
                let actual = match *child {
                    NodeId::Leaf(id) => self.leaves.get(&id).map(|leaf| leaf.parent),
                    NodeId::Container(id) => self.containers.get(&id).map(|c| c.parent),
                };
                let Some(actual) = actual else {
                    return Err(ValidationError::MissingNode { node: *child });
                };
                if actual != Some(container.id) {
                    return Err(ValidationError::ParentMismatch {
                        node: *child,
                        expected: Some(container.id),
                        actual,
                    });
                }
            }
        }

        let mut seen = BTreeSet::new();
        for node in self.nodes_in_order() {
            if !seen.insert(node) {
                return Err(match node {
                    NodeId::Leaf(leaf) => ValidationError::DuplicateLeafId { leaf },
                    NodeId::Container(container) => {
                        ValidationError::DuplicateContainerId { container }
                    }
                });
            }
        }
        let all_nodes = self
            .leaves
            .keys()
            .copied()
            .map(NodeId::Leaf)
            .chain(self.containers.keys().copied().map(NodeId::Container));
        for node in all_nodes {
            if !seen.contains(&node) {
                return Err(ValidationError::UnreachableNode { node });
            }
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Mutation
    // ----------------------------------------------------------------------

    pub(crate) fn split_leaf(
        &mut self,
        target: LeafId,
        direction: Direction,
        percentage: f64,
        insert_after: bool,
    ) -> Result<SplitOutcome, LayoutError> {
        if !(percentage > 0.0 && percentage < 100.0) {
            return Err(LayoutError::InvalidPercentage { percentage });
        }
        let parent = self.leaf(target)?.parent;
        let existing = NodeId::Leaf(target);
        let new_leaf = self.allocator.next_leaf_id()?;
        let incoming = NodeId::Leaf(new_leaf);
        let mut manifest = RevisionManifest::default();

        let Some(parent_id) = parent else {
            let wrapper = self.wrap_pair(
                existing,
                incoming,
                None,
                direction,
                percentage,
                insert_after,
                &mut manifest,
            )?;
            self.root = NodeId::Container(wrapper);
            manifest.root_changed = true;
            return Ok(SplitOutcome {
                leaf: new_leaf,
                manifest,
            });
        };

        let index = self
            .index_in_parent(existing)?
            .ok_or(LayoutError::ContainerNotFound {
                container: parent_id,
            })?;
        let parent_direction = self.container(parent_id)?.direction;

        if parent_direction == direction {
            let container = self
                .containers
                .get_mut(&parent_id)
                .ok_or(LayoutError::ContainerNotFound {
                    container: parent_id,
                })?;
            let (first, second) = split_ratio(container.ratios[index], percentage, insert_after);
            let _ = container.ratios.splice(index..=index, [first, second]);
            let at = if insert_after { index + 1 } else { index };
            container.children.insert(at, incoming);
            let _ = self.leaves.insert(
                new_leaf,
                Leaf::new(new_leaf, Some(parent_id), ContentRef::Empty),
            );
        } else {
            let wrapper = self.wrap_pair(
                existing,
                incoming,
                Some(parent_id),
                direction,
                percentage,
                insert_after,
                &mut manifest,
            )?;
            self.replace_child(parent_id, existing, NodeId::Container(wrapper))?;
        }

        self.bump_revisions(parent_id, &mut manifest)?;
        Ok(SplitOutcome {
            leaf: new_leaf,
            manifest,
        })
    }

    /// Create a container around `existing` and the new leaf `incoming`.
    ///
    /// The caller is responsible for hooking the container into `parent`.
    #[allow(clippy::too_many_arguments)]
    fn wrap_pair(
        &mut self,
        existing: NodeId,
        incoming: NodeId,
        parent: Option<ContainerId>,
        direction: Direction,
        percentage: f64,
        insert_after: bool,
        manifest: &mut RevisionManifest,
    ) -> Result<ContainerId, LayoutError> {
        let id = self.allocator.next_container_id()?;
        let revision = self.allocator.next_revision()?;
        let (first, second) = split_ratio(100.0, percentage, insert_after);
        let children = if insert_after {
            vec![existing, incoming]
        } else {
            vec![incoming, existing]
        };

        self.set_parent(existing, Some(id))?;
        if let NodeId::Leaf(leaf) = incoming {
            let _ = self
                .leaves
                .insert(leaf, Leaf::new(leaf, Some(id), ContentRef::Empty));
        }
        let _ = self.containers.insert(
            id,
            Container {
                id,
                parent,
                revision,
                direction,
                ratios: vec![first, second],
                children,
            },
        );
        manifest.created.push(id);
        manifest.changed.push((id, revision));
        Ok(id)
    }

    pub(crate) fn delete_leaf(&mut self, target: LeafId) -> Result<RevisionManifest, LayoutError> {
        let node = NodeId::Leaf(target);
        let parent_id = self
            .leaf(target)?
            .parent
            .ok_or(LayoutError::RootDeletion { leaf: target })?;
        let mut manifest = RevisionManifest::default();

        let parent = self
            .containers
            .get_mut(&parent_id)
            .ok_or(LayoutError::ContainerNotFound {
                container: parent_id,
            })?;
        let index = parent
            .child_index(node)
            .ok_or(ValidationError::ParentMismatch {
                node,
                expected: None,
                actual: Some(parent_id),
            })?;

        if parent.children.len() > 2 {
            let _ = merge_ratio(&mut parent.ratios, &mut parent.children, index).ok_or(
                ValidationError::DegenerateContainer {
                    container: parent_id,
                    children: parent.children.len(),
                },
            )?;
            let _ = self.leaves.remove(&target);
            self.bump_revisions(parent_id, &mut manifest)?;
            return Ok(manifest);
        }

        let survivor = parent
            .children
            .iter()
            .copied()
            .find(|child| *child != node)
            .ok_or(ValidationError::DegenerateContainer {
                container: parent_id,
                children: parent.children.len(),
            })?;
        let grandparent = parent.parent;

        let _ = self.containers.remove(&parent_id);
        let _ = self.leaves.remove(&target);
        self.set_parent(survivor, grandparent)?;
        manifest.removed.push(parent_id);

        match grandparent {
            Some(grandparent) => {
                self.replace_child(grandparent, NodeId::Container(parent_id), survivor)?;
                self.bump_revisions(grandparent, &mut manifest)?;
            }
            None => {
                self.root = survivor;
                manifest.root_changed = true;
            }
        }
        Ok(manifest)
    }

    pub(crate) fn swap_content(
        &mut self,
        first: LeafId,
        second: LeafId,
        catalog: &ContentCatalog,
    ) -> Result<Vec<ContentMove>, LayoutError> {
        let first_content = self.leaf(first)?.content.clone();
        let second_content = self.leaf(second)?.content.clone();
        if first == second || catalog.same_entry(&first_content, &second_content) {
            return Ok(Vec::new());
        }

        if let Some(leaf) = self.leaves.get_mut(&first) {
            leaf.content = second_content.clone();
        }
        if let Some(leaf) = self.leaves.get_mut(&second) {
            leaf.content = first_content.clone();
        }

        Ok(vec![
            ContentMove {
                content: first_content,
                current: second,
                previous: first,
            },
            ContentMove {
                content: second_content,
                current: first,
                previous: second,
            },
        ])
    }

    pub(crate) fn set_ratios(
        &mut self,
        id: ContainerId,
        ratios: Vec<f64>,
    ) -> Result<(), LayoutError> {
        let container = self
            .containers
            .get_mut(&id)
            .ok_or(LayoutError::ContainerNotFound { container: id })?;
        validate_ratios(id, &ratios, container.children.len())?;
        container.ratios = ratios;
        Ok(())
    }

    pub(crate) fn resize_divider(
        &mut self,
        id: ContainerId,
        index: usize,
        delta: f64,
    ) -> Result<f64, LayoutError> {
        let container = self
            .containers
            .get_mut(&id)
            .ok_or(LayoutError::ContainerNotFound { container: id })?;
        let mut ratios = container.ratios.clone();
        let applied = apply_resize(&mut ratios, index, delta)?;
        validate_ratios(id, &ratios, container.children.len())?;
        container.ratios = ratios;
        Ok(applied)
    }

    /// Replace a leaf's content, returning what it showed before.
    pub(crate) fn set_content(
        &mut self,
        id: LeafId,
        content: ContentRef,
    ) -> Result<ContentRef, LayoutError> {
        let leaf = self
            .leaves
            .get_mut(&id)
            .ok_or(LayoutError::LeafNotFound { leaf: id })?;
        Ok(std::mem::replace(&mut leaf.content, content))
    }

    /// Stamp fresh revisions on `from` and every ancestor up to the root.
    fn bump_revisions(
        &mut self,
        from: ContainerId,
        manifest: &mut RevisionManifest,
    ) -> Result<(), LayoutError> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let revision = self.allocator.next_revision()?;
            let container = self
                .containers
                .get_mut(&id)
                .ok_or(LayoutError::ContainerNotFound { container: id })?;
            container.revision = revision;
            manifest.changed.push((id, revision));
            cursor = container.parent;
        }
        Ok(())
    }

    fn set_parent(&mut self, node: NodeId, parent: Option<ContainerId>) -> Result<(), LayoutError> {
        match node {
            NodeId::Leaf(id) => {
                self.leaves
                    .get_mut(&id)
                    .ok_or(LayoutError::LeafNotFound { leaf: id })?
                    .parent = parent;
            }
            NodeId::Container(id) => {
                self.containers
                    .get_mut(&id)
                    .ok_or(LayoutError::ContainerNotFound { container: id })?
                    .parent = parent;
            }
        }
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent_id: ContainerId,
        old_child: NodeId,
        new_child: NodeId,
    ) -> Result<(), LayoutError> {
        let parent = self
            .containers
            .get_mut(&parent_id)
            .ok_or(LayoutError::ContainerNotFound {
                container: parent_id,
            })?;
        let slot = parent
            .children
            .iter_mut()
            .find(|child| **child == old_child)
            .ok_or(ValidationError::ParentMismatch {
                node: old_child,
                expected: None,
                actual: Some(parent_id),
            })?;
        *slot = new_child;
        Ok(())
    }
}
