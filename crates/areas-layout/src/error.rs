//! Error taxonomy for layout operations.

use std::fmt;

use crate::node::{ContainerId, ContentRef, LeafId, NodeId};

/// Coarse error classification exposed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutErrorKind {
    /// An unknown leaf or container id was passed in.
    NotFound,
    /// The sole remaining leaf cannot be deleted.
    RootDeletion,
    /// Malformed configuration, snapshot, or ratio sequence.
    Validation,
    /// Out-of-range argument to an otherwise valid call.
    InvalidArgument,
    /// An id or revision counter is exhausted.
    Overflow,
}

/// Failure of a layout operation. The tree is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    LeafNotFound {
        leaf: LeafId,
    },
    ContainerNotFound {
        container: ContainerId,
    },
    RootDeletion {
        leaf: LeafId,
    },
    InvalidPercentage {
        percentage: f64,
    },
    UnknownDirection {
        value: String,
    },
    DividerOutOfRange {
        index: usize,
        dividers: usize,
    },
    NonFiniteDelta {
        delta: f64,
    },
    IdOverflow {
        kind: &'static str,
    },
    Validation(ValidationError),
}

impl LayoutError {
    #[must_use]
    pub const fn kind(&self) -> LayoutErrorKind {
        match self {
            Self::LeafNotFound { .. } | Self::ContainerNotFound { .. } => {
                LayoutErrorKind::NotFound
            }
            Self::RootDeletion { .. } => LayoutErrorKind::RootDeletion,
            Self::InvalidPercentage { .. }
            | Self::UnknownDirection { .. }
            | Self::DividerOutOfRange { .. }
            | Self::NonFiniteDelta { .. } => LayoutErrorKind::InvalidArgument,
            Self::IdOverflow { .. } => LayoutErrorKind::Overflow,
            Self::Validation(_) => LayoutErrorKind::Validation,
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeafNotFound { leaf } => write!(f, "leaf {leaf} not found"),
            Self::ContainerNotFound { container } => {
                write!(f, "container {container} not found")
            }
            Self::RootDeletion { leaf } => write!(
                f,
                "cannot delete leaf {leaf} because it is the root of the layout"
            ),
            Self::InvalidPercentage { percentage } => write!(
                f,
                "split percentage {percentage} must be strictly between 0 and 100"
            ),
            Self::UnknownDirection { value } => write!(
                f,
                "unknown direction {value:?} (expected row, column, vertical or horizontal)"
            ),
            Self::DividerOutOfRange { index, dividers } => write!(
                f,
                "divider {index} out of range for container with {dividers} dividers"
            ),
            Self::NonFiniteDelta { delta } => write!(f, "resize delta {delta} is not finite"),
            Self::IdOverflow { kind } => write!(f, "{kind} counter overflow"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Validation(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<ValidationError> for LayoutError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Structural invariant violations in configuration, snapshots, or ratios.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    UnsupportedSchemaVersion {
        version: u16,
    },
    ZeroId {
        kind: &'static str,
    },
    RatioCountMismatch {
        container: ContainerId,
        ratios: usize,
        children: usize,
    },
    DegenerateContainer {
        container: ContainerId,
        children: usize,
    },
    InvalidRatio {
        container: ContainerId,
        index: usize,
        value: f64,
    },
    RatioSumOutOfTolerance {
        container: ContainerId,
        sum: f64,
    },
    LeafWithRatios {
        leaf: LeafId,
    },
    ContainerWithContent {
        container: ContainerId,
    },
    ContainerWithName {
        container: ContainerId,
    },
    DuplicateLeafId {
        leaf: LeafId,
    },
    DuplicateContainerId {
        container: ContainerId,
    },
    UnknownContent {
        content: ContentRef,
    },
    MissingNode {
        node: NodeId,
    },
    ParentMismatch {
        node: NodeId,
        expected: Option<ContainerId>,
        actual: Option<ContainerId>,
    },
    UnreachableNode {
        node: NodeId,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedSchemaVersion { version } => write!(
                f,
                "unsupported layout schema version {version} (expected {})",
                crate::snapshot::LAYOUT_SNAPSHOT_SCHEMA_VERSION
            ),
            Self::ZeroId { kind } => write!(f, "{kind} id 0 is invalid"),
            Self::RatioCountMismatch {
                container,
                ratios,
                children,
            } => write!(
                f,
                "container {container} has {ratios} ratios for {children} children"
            ),
            Self::DegenerateContainer {
                container,
                children,
            } => write!(
                f,
                "container {container} has {children} children (at least 2 required)"
            ),
            Self::InvalidRatio {
                container,
                index,
                value,
            } => write!(
                f,
                "container {container} ratio {index} is {value}: ratios must be finite and >= 0"
            ),
            Self::RatioSumOutOfTolerance { container, sum } => write!(
                f,
                "container {container} ratios sum to {sum} instead of {}",
                crate::ratio::RATIO_TOTAL
            ),
            Self::LeafWithRatios { leaf } => {
                write!(f, "leaf {leaf} declares ratios but has no children")
            }
            Self::ContainerWithContent { container } => {
                write!(f, "container {container} declares content")
            }
            Self::ContainerWithName { container } => {
                write!(f, "container {container} declares a name (only leaves are named)")
            }
            Self::DuplicateLeafId { leaf } => write!(f, "duplicate leaf id {leaf}"),
            Self::DuplicateContainerId { container } => {
                write!(f, "duplicate container id {container}")
            }
            Self::UnknownContent { content } => {
                write!(f, "content {content} is not in the catalog")
            }
            Self::MissingNode { node } => write!(f, "{node} is referenced but missing"),
            Self::ParentMismatch {
                node,
                expected,
                actual,
            } => write!(
                f,
                "{node} parent mismatch: expected {:?}, got {:?}",
                expected.map(ContainerId::get),
                actual.map(ContainerId::get)
            ),
            Self::UnreachableNode { node } => write!(f, "{node} is unreachable from root"),
        }
    }
}

impl std::error::Error for ValidationError {}
