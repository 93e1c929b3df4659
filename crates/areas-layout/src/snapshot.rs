//! Nested snapshot export and validated restore.
//!
//! A snapshot is a plain, alias-free copy of the tree shape: ids, directions,
//! ratios, content and names. Revisions are runtime cache stamps and are not
//! persisted; a restored tree stamps every container with a fresh revision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::alloc::IdAllocator;
use crate::catalog::ContentCatalog;
use crate::error::{LayoutError, ValidationError};
use crate::node::{Container, ContainerId, ContentRef, Direction, Leaf, LeafId, NodeId};
use crate::ratio::validate_ratios;
use crate::tree::{LayoutTree, RevisionManifest};

/// Current snapshot schema version.
pub const LAYOUT_SNAPSHOT_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    LAYOUT_SNAPSHOT_SCHEMA_VERSION
}

/// Serialized layout tree.
///
/// The extension map is reserved for forward-compatible fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub root: SnapshotNode,
    /// Leaf counter at export time. Restores never issue ids below it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_leaf_id: Option<LeafId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_container_id: Option<ContainerId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl LayoutSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One node of a [`LayoutSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotNode {
    Leaf {
        id: LeafId,
        #[serde(default)]
        content: ContentRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Container {
        id: ContainerId,
        #[serde(default)]
        direction: Direction,
        ratios: Vec<f64>,
        children: Vec<SnapshotNode>,
    },
}

impl LayoutTree {
    /// Export the tree to its nested snapshot form.
    #[must_use]
    pub fn to_snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            schema_version: LAYOUT_SNAPSHOT_SCHEMA_VERSION,
            root: self.export_node(self.root()),
            next_leaf_id: Some(self.allocator().peek_leaf()),
            next_container_id: Some(self.allocator().peek_container()),
            extensions: BTreeMap::new(),
        }
    }

    fn export_node(&self, node: NodeId) -> SnapshotNode {
        match node {
            NodeId::Leaf(id) => {
                let leaf = self.leaf(id).ok();
                SnapshotNode::Leaf {
                    id,
                    content: leaf.map(|leaf| leaf.content.clone()).unwrap_or_default(),
                    name: leaf.and_then(|leaf| leaf.name.clone()),
                }
            }
            // A dangling container reference exports as an empty container,
            // which restore rejects.
            NodeId::Container(id) => match self.container(id) {
                Ok(container) => SnapshotNode::Container {
                    id,
                    direction: container.direction,
                    ratios: container.ratios.clone(),
                    children: container
                        .children
                        .iter()
                        .map(|child| self.export_node(*child))
                        .collect(),
                },
                Err(_) => SnapshotNode::Container {
                    id,
                    direction: Direction::default(),
                    ratios: Vec::new(),
                    children: Vec::new(),
                },
            },
        }
    }

    /// Rebuild a tree from a snapshot.
    ///
    /// Id counters start from `floor`, then rise past the snapshot's counters
    /// and every id it contains. Revisions continue from `floor`, one per
    /// container in depth-first pre-order; the manifest lists all of them.
    pub fn from_snapshot(
        snapshot: &LayoutSnapshot,
        catalog: &ContentCatalog,
        floor: &IdAllocator,
    ) -> Result<(Self, RevisionManifest), LayoutError> {
        if snapshot.schema_version != LAYOUT_SNAPSHOT_SCHEMA_VERSION {
            return Err(ValidationError::UnsupportedSchemaVersion {
                version: snapshot.schema_version,
            }
            .into());
        }

        let mut allocator = floor.clone();
        allocator.raise_to(snapshot.next_leaf_id, snapshot.next_container_id);
        let mut ingest = Ingest {
            catalog,
            allocator,
            leaves: BTreeMap::new(),
            containers: BTreeMap::new(),
            manifest: RevisionManifest {
                root_changed: true,
                ..RevisionManifest::default()
            },
        };
        let root = ingest.node(&snapshot.root, None)?;

        let tree = Self::from_parts(root, ingest.leaves, ingest.containers, ingest.allocator);
        tree.validate()?;
        Ok((tree, ingest.manifest))
    }
}

struct Ingest<'a> {
    catalog: &'a ContentCatalog,
    allocator: IdAllocator,
    leaves: BTreeMap<LeafId, Leaf>,
    containers: BTreeMap<ContainerId, Container>,
    manifest: RevisionManifest,
}

impl Ingest<'_> {
    fn node(
        &mut self,
        node: &SnapshotNode,
        parent: Option<ContainerId>,
    ) -> Result<NodeId, LayoutError> {
        match node {
            SnapshotNode::Leaf { id, content, name } => {
                if id.is_zero() {
                    return Err(ValidationError::ZeroId { kind: "leaf" }.into());
                }
                if self.leaves.contains_key(id) {
                    return Err(ValidationError::DuplicateLeafId { leaf: *id }.into());
                }
                self.catalog.check(content)?;
                self.allocator.observe_leaf(*id)?;
                let mut leaf = Leaf::new(*id, parent, content.clone());
                leaf.name.clone_from(name);
                let _ = self.leaves.insert(*id, leaf);
                Ok(NodeId::Leaf(*id))
            }
            SnapshotNode::Container {
                id,
                direction,
                ratios,
                children,
            } => {
                if id.is_zero() {
                    return Err(ValidationError::ZeroId { kind: "container" }.into());
                }
                if self.containers.contains_key(id) {
                    return Err(ValidationError::DuplicateContainerId { container: *id }.into());
                }
                validate_ratios(*id, ratios, children.len())?;
                self.allocator.observe_container(*id)?;
                let revision = self.allocator.next_revision()?;
                self.manifest.changed.push((*id, revision));
                // Reserve the id before descending so a nested duplicate is caught.
                let _ = self.containers.insert(
                    *id,
                    Container {
                        id: *id,
                        parent,
                        revision,
                        direction: *direction,
                        ratios: ratios.clone(),
                        children: Vec::new(),
                    },
                );
                let mut child_ids = Vec::with_capacity(children.len());
                for child in children {
                    child_ids.push(self.node(child, Some(*id))?);
                }
                if let Some(container) = self.containers.get_mut(id) {
                    container.children = child_ids;
                }
                Ok(NodeId::Container(*id))
            }
        }
    }
}
