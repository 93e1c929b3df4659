//! Node model for the layout tree.
//!
//! A layout tree is made of two kinds of records:
//!
//! - [`Leaf`]: a region holding host content, addressed by a [`LeafId`].
//! - [`Container`]: an ordered run of children laid out along a
//!   [`Direction`], each child owning a percentage share of the extent.
//!
//! Children are referenced through the closed [`NodeId`] union, and borrowed
//! access to either record goes through [`Node`], so every consumer handles
//! both variants exhaustively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, ValidationError};

macro_rules! layout_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        ///
        /// `0` is reserved/invalid so values are always non-zero.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Lowest valid value.
            pub const MIN: Self = Self(1);

            /// Create a new value, rejecting 0.
            pub fn new(raw: u64) -> Result<Self, ValidationError> {
                if raw == 0 {
                    return Err(ValidationError::ZeroId { kind: $label });
                }
                Ok(Self(raw))
            }

            /// Get the raw numeric value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            pub(crate) const fn is_zero(self) -> bool {
                self.0 == 0
            }

            pub(crate) fn checked_next(self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::MIN
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

layout_id!(
    /// Stable identifier of a leaf, unique for the lifetime of the tree.
    LeafId,
    "leaf"
);

layout_id!(
    /// Stable identifier of a container.
    ContainerId,
    "container"
);

layout_id!(
    /// Cache-invalidation stamp carried by containers.
    Revision,
    "revision"
);

/// Axis along which a container lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Children arranged left-to-right.
    #[default]
    #[serde(alias = "vertical")]
    Row,
    /// Children arranged top-to-bottom.
    #[serde(alias = "horizontal")]
    Column,
}

impl Direction {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }

    /// The other axis.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `row`/`column`, plus the divider vocabulary hosts tend to use for
/// split gestures: a `vertical` divider produces a row, a `horizontal` divider
/// produces a column.
impl FromStr for Direction {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("row") || trimmed.eq_ignore_ascii_case("vertical") {
            Ok(Self::Row)
        } else if trimmed.eq_ignore_ascii_case("column")
            || trimmed.eq_ignore_ascii_case("horizontal")
        {
            Ok(Self::Column)
        } else {
            Err(LayoutError::UnknownDirection {
                value: value.to_owned(),
            })
        }
    }
}

/// Opaque host selector for the content shown in a leaf.
///
/// Serialized untagged: `null`, a catalog index, or a catalog name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentRef {
    /// No content; the host shows its placeholder.
    #[default]
    Empty,
    /// Position in the host catalog.
    Index(usize),
    /// Name of a catalog entry.
    Name(String),
}

impl ContentRef {
    /// Returns true for [`ContentRef::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl From<usize> for ContentRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ContentRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for ContentRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Reference to either kind of node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeId {
    Leaf(LeafId),
    Container(ContainerId),
}

impl NodeId {
    #[must_use]
    pub const fn as_leaf(self) -> Option<LeafId> {
        match self {
            Self::Leaf(id) => Some(id),
            Self::Container(_) => None,
        }
    }

    #[must_use]
    pub const fn as_container(self) -> Option<ContainerId> {
        match self {
            Self::Container(id) => Some(id),
            Self::Leaf(_) => None,
        }
    }
}

impl From<LeafId> for NodeId {
    fn from(id: LeafId) -> Self {
        Self::Leaf(id)
    }
}

impl From<ContainerId> for NodeId {
    fn from(id: ContainerId) -> Self {
        Self::Container(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(id) => write!(f, "leaf {id}"),
            Self::Container(id) => write!(f, "container {id}"),
        }
    }
}

/// Leaf record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub id: LeafId,
    /// `None` only for the root leaf.
    pub parent: Option<ContainerId>,
    pub content: ContentRef,
    /// Optional host label. Names stay with the position across swaps.
    pub name: Option<String>,
}

impl Leaf {
    pub(crate) fn new(id: LeafId, parent: Option<ContainerId>, content: ContentRef) -> Self {
        Self {
            id,
            parent,
            content,
            name: None,
        }
    }
}

/// Container record.
///
/// `ratios[i]` is the percentage share of `children[i]`; the ratios of a
/// well-formed container sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: ContainerId,
    pub parent: Option<ContainerId>,
    pub revision: Revision,
    pub direction: Direction,
    pub ratios: Vec<f64>,
    pub children: Vec<NodeId>,
}

impl Container {
    /// Position of `child` in this container.
    #[must_use]
    pub fn child_index(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|candidate| *candidate == child)
    }

    /// Share held by `child`, if it belongs here.
    #[must_use]
    pub fn ratio_of(&self, child: NodeId) -> Option<f64> {
        self.child_index(child)
            .and_then(|index| self.ratios.get(index).copied())
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Borrowed view of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Leaf(&'a Leaf),
    Container(&'a Container),
}

impl Node<'_> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Leaf(leaf) => NodeId::Leaf(leaf.id),
            Self::Container(container) => NodeId::Container(container.id),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<ContainerId> {
        match self {
            Self::Leaf(leaf) => leaf.parent,
            Self::Container(container) => container.parent,
        }
    }
}
