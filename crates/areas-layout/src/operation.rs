//! Serializable layout operations for replay and journaling.

use serde::{Deserialize, Serialize};

use crate::layout::SwapOutcome;
use crate::node::{ContainerId, ContentRef, Direction, LeafId};
use crate::tree::{RevisionManifest, SplitOutcome};

/// Supported layout operations.
///
/// ```json
/// {"op": "split_leaf", "leaf": 1, "direction": "row", "percentage": 20.0}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayoutOperation {
    /// Split a leaf in two; the existing leaf keeps `percentage` of its share.
    SplitLeaf {
        leaf: LeafId,
        direction: Direction,
        percentage: f64,
        #[serde(default = "default_insert_after")]
        insert_after: bool,
    },
    /// Remove a non-root leaf and fold its share into a sibling.
    DeleteLeaf { leaf: LeafId },
    /// Exchange the content of two leaves.
    SwapContent { first: LeafId, second: LeafId },
    /// Replace a container's ratios wholesale.
    UpdateRatios {
        container: ContainerId,
        ratios: Vec<f64>,
    },
    /// Drag the divider after child `index` by `delta` percentage points.
    ResizeDivider {
        container: ContainerId,
        index: usize,
        delta: f64,
    },
    /// Point a leaf at different content.
    ChangeLeafContent { leaf: LeafId, content: ContentRef },
}

const fn default_insert_after() -> bool {
    true
}

impl LayoutOperation {
    /// Operation family.
    #[must_use]
    pub const fn kind(&self) -> LayoutOperationKind {
        match self {
            Self::SplitLeaf { .. } => LayoutOperationKind::SplitLeaf,
            Self::DeleteLeaf { .. } => LayoutOperationKind::DeleteLeaf,
            Self::SwapContent { .. } => LayoutOperationKind::SwapContent,
            Self::UpdateRatios { .. } => LayoutOperationKind::UpdateRatios,
            Self::ResizeDivider { .. } => LayoutOperationKind::ResizeDivider,
            Self::ChangeLeafContent { .. } => LayoutOperationKind::ChangeLeafContent,
        }
    }
}

/// Stable operation discriminator used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOperationKind {
    SplitLeaf,
    DeleteLeaf,
    SwapContent,
    UpdateRatios,
    ResizeDivider,
    ChangeLeafContent,
}

impl LayoutOperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SplitLeaf => "split_leaf",
            Self::DeleteLeaf => "delete_leaf",
            Self::SwapContent => "swap_content",
            Self::UpdateRatios => "update_ratios",
            Self::ResizeDivider => "resize_divider",
            Self::ChangeLeafContent => "change_leaf_content",
        }
    }
}

/// Successful result of [`crate::Layout::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Split(SplitOutcome),
    Deleted(RevisionManifest),
    Swapped(SwapOutcome),
    RatiosUpdated,
    Resized { applied: f64 },
    ContentChanged { previous: ContentRef },
}

impl OperationOutcome {
    /// Revision changes caused by the operation, if it was structural.
    #[must_use]
    pub fn manifest(&self) -> Option<&RevisionManifest> {
        match self {
            Self::Split(outcome) => Some(&outcome.manifest),
            Self::Deleted(manifest) => Some(manifest),
            _ => None,
        }
    }
}
