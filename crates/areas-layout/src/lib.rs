#![forbid(unsafe_code)]

//! Recursive split-area layout engine.
//!
//! A layout is a tree of [`Container`]s and [`Leaf`]s. Each container lays its
//! children out along a [`Direction`] and gives each one a percentage share;
//! the shares of one container always sum to 100. Leaves hold opaque host
//! content ([`ContentRef`]) and keep their [`LeafId`] for their whole life, so
//! hosts can cache rendered content by leaf.
//!
//! [`Layout`] is the entry point. It splits, deletes and swaps leaves,
//! adjusts ratios, and saves or restores the arrangement as a
//! [`LayoutSnapshot`]. Structural changes return a [`RevisionManifest`]
//! naming the containers whose revision changed.
//!
//! ```
//! use areas_layout::{ContentCatalog, Direction, Layout, LeafId};
//!
//! let mut layout = Layout::new(ContentCatalog::new(["editor", "terminal"]));
//! let split = layout.split_leaf(LeafId::MIN, Direction::Row, 20.0, true)?;
//! assert_eq!(layout.tree().leaves_in_order(), vec![LeafId::MIN, split.leaf]);
//! # Ok::<(), areas_layout::LayoutError>(())
//! ```
//!
//! The engine never renders anything and never installs a `tracing`
//! subscriber; it only emits events under the `areas.layout` target.

pub mod alloc;
pub mod catalog;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod layout;
pub mod node;
pub mod operation;
pub mod ratio;
pub mod snapshot;
pub mod subscription;
pub mod tree;

pub use alloc::IdAllocator;
pub use catalog::ContentCatalog;
#[cfg(feature = "config")]
pub use config::{ConfigError, LayoutConfig, NodeConfig};
pub use error::{LayoutError, LayoutErrorKind, ValidationError};
pub use layout::{Layout, SwapOutcome};
pub use node::{Container, ContainerId, ContentRef, Direction, Leaf, LeafId, Node, NodeId, Revision};
pub use operation::{LayoutOperation, LayoutOperationKind, OperationOutcome};
pub use ratio::{RATIO_SUM_TOLERANCE, RATIO_TOTAL};
pub use snapshot::{LAYOUT_SNAPSHOT_SCHEMA_VERSION, LayoutSnapshot, SnapshotNode};
pub use subscription::{ContentCallback, SubscriptionId};
pub use tree::{ContentMove, LayoutTree, RevisionManifest, SplitOutcome};
