//! Host construction input for a [`Layout`].
//!
//! A [`LayoutConfig`] names the host's content catalog and describes the
//! initial tree as nested nodes. It can be loaded from TOML or JSON:
//!
//! ```toml
//! catalog = ["editor", "terminal"]
//!
//! [layout]
//! direction = "row"
//! ratios = [30, 70]
//!
//! [[layout.children]]
//! content = "editor"
//! name = "main"
//!
//! [[layout.children]]
//! content = 1
//! ```
//!
//! ```rust,ignore
//! let layout = LayoutConfig::from_toml_file("layout.toml")?.build()?;
//! ```
//!
//! Ids are assigned in depth-first pre-order, leaves and containers each
//! counting from 1, and the whole description is validated before a tree is
//! built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alloc::IdAllocator;
use crate::catalog::ContentCatalog;
use crate::error::{LayoutError, ValidationError};
use crate::layout::Layout;
use crate::node::{ContainerId, ContentRef, Direction, LeafId};
use crate::ratio::RATIO_TOTAL;
use crate::snapshot::{LAYOUT_SNAPSHOT_SCHEMA_VERSION, LayoutSnapshot, SnapshotNode};
use crate::tree::LayoutTree;

/// Top-level construction input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Host content entries, addressed by position or name.
    pub catalog: Vec<String>,
    /// Initial tree. Defaults to a single empty leaf.
    pub layout: NodeConfig,
}

/// One node of the initial tree.
///
/// A node with `children` is a container; anything else is a leaf.
/// `direction` is ignored on leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Child shares. Omitted ratios split the container evenly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratios: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeConfig>>,
    #[serde(
        default,
        alias = "componentIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<ContentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NodeConfig {
    /// Leaf showing `content`.
    #[must_use]
    pub fn leaf(content: impl Into<ContentRef>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Container with explicit ratios.
    #[must_use]
    pub fn container(direction: Direction, ratios: Vec<f64>, children: Vec<NodeConfig>) -> Self {
        Self {
            direction: Some(direction),
            ratios: Some(ratios),
            children: Some(children),
            ..Self::default()
        }
    }

    /// Label the node. Only leaves may carry names.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn to_snapshot_node(&self, ids: &mut PreorderIds) -> Result<SnapshotNode, ValidationError> {
        let Some(children) = &self.children else {
            let id = ids.leaf()?;
            if self.ratios.is_some() {
                return Err(ValidationError::LeafWithRatios { leaf: id });
            }
            return Ok(SnapshotNode::Leaf {
                id,
                content: self.content.clone().unwrap_or_default(),
                name: self.name.clone(),
            });
        };

        let id = ids.container()?;
        if self.content.is_some() {
            return Err(ValidationError::ContainerWithContent { container: id });
        }
        if self.name.is_some() {
            return Err(ValidationError::ContainerWithName { container: id });
        }
        let ratios = match &self.ratios {
            Some(ratios) => ratios.clone(),
            None if children.is_empty() => Vec::new(),
            None => vec![RATIO_TOTAL / children.len() as f64; children.len()],
        };
        let children = children
            .iter()
            .map(|child| child.to_snapshot_node(ids))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SnapshotNode::Container {
            id,
            direction: self.direction.unwrap_or_default(),
            ratios,
            children,
        })
    }
}

struct PreorderIds {
    next_leaf: u64,
    next_container: u64,
}

impl PreorderIds {
    fn leaf(&mut self) -> Result<LeafId, ValidationError> {
        let id = LeafId::new(self.next_leaf)?;
        self.next_leaf += 1;
        Ok(id)
    }

    fn container(&mut self) -> Result<ContainerId, ValidationError> {
        let id = ContainerId::new(self.next_container)?;
        self.next_container += 1;
        Ok(id)
    }
}

impl LayoutConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate the description and build a layout from it.
    pub fn build(&self) -> Result<Layout, ConfigError> {
        let catalog = ContentCatalog::new(self.catalog.iter().cloned());
        let mut ids = PreorderIds {
            next_leaf: 1,
            next_container: 1,
        };
        let snapshot = LayoutSnapshot {
            schema_version: LAYOUT_SNAPSHOT_SCHEMA_VERSION,
            root: self.layout.to_snapshot_node(&mut ids)?,
            next_leaf_id: None,
            next_container_id: None,
            extensions: Default::default(),
        };
        let (tree, _) = LayoutTree::from_snapshot(&snapshot, &catalog, &IdAllocator::default())?;
        Ok(Layout::from_tree(tree, catalog))
    }
}

impl Layout {
    /// Build a layout from host configuration.
    pub fn from_config(config: &LayoutConfig) -> Result<Self, ConfigError> {
        config.build()
    }
}

/// Errors from loading or building a [`LayoutConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// The description violates a tree invariant.
    Validation(ValidationError),
    /// Building the tree failed for a reason other than validation.
    Layout(LayoutError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(e) => write!(f, "invalid layout: {e}"),
            Self::Layout(e) => write!(f, "layout error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Layout(e) => Some(e),
        }
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<LayoutError> for ConfigError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Validation(err) => Self::Validation(err),
            other => Self::Layout(other),
        }
    }
}
