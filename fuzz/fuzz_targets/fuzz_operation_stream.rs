#![no_main]

use arbitrary::Arbitrary;
use areas_layout::{ContentCatalog, ContentRef, Direction, Layout, LayoutOperation, LeafId};
use libfuzzer_sys::fuzz_target;

/// Operation with indices resolved against the live tree at apply time.
#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Split {
        leaf: u8,
        column: bool,
        percentage: f64,
        insert_after: bool,
    },
    Delete {
        leaf: u8,
    },
    Swap {
        first: u8,
        second: u8,
    },
    Ratios {
        container: u8,
        weights: Vec<u8>,
    },
    Resize {
        container: u8,
        index: u8,
        delta: f64,
    },
    Content {
        leaf: u8,
        content: Option<u8>,
    },
}

fn pick<T: Copy>(items: &[T], index: u8) -> Option<T> {
    (!items.is_empty()).then(|| items[usize::from(index) % items.len()])
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut layout = Layout::new(ContentCatalog::new(["editor", "terminal"]));

    for op in ops.into_iter().take(256) {
        let leaves = layout.tree().leaves_in_order();
        let containers = layout.tree().containers_in_order();
        let operation = match op {
            FuzzOp::Split {
                leaf,
                column,
                percentage,
                insert_after,
            } => LayoutOperation::SplitLeaf {
                leaf: pick(&leaves, leaf).unwrap_or(LeafId::MIN),
                direction: if column { Direction::Column } else { Direction::Row },
                percentage,
                insert_after,
            },
            FuzzOp::Delete { leaf } => LayoutOperation::DeleteLeaf {
                leaf: pick(&leaves, leaf).unwrap_or(LeafId::MIN),
            },
            FuzzOp::Swap { first, second } => LayoutOperation::SwapContent {
                first: pick(&leaves, first).unwrap_or(LeafId::MIN),
                second: pick(&leaves, second).unwrap_or(LeafId::MIN),
            },
            FuzzOp::Ratios { container, weights } => {
                let Some(container) = pick(&containers, container) else {
                    continue;
                };
                let total: f64 = weights.iter().map(|w| f64::from(*w)).sum();
                let ratios = if total > 0.0 {
                    weights.iter().map(|w| f64::from(*w) / total * 100.0).collect()
                } else {
                    Vec::new()
                };
                LayoutOperation::UpdateRatios { container, ratios }
            }
            FuzzOp::Resize {
                container,
                index,
                delta,
            } => {
                let Some(container) = pick(&containers, container) else {
                    continue;
                };
                LayoutOperation::ResizeDivider {
                    container,
                    index: usize::from(index),
                    delta,
                }
            }
            FuzzOp::Content { leaf, content } => LayoutOperation::ChangeLeafContent {
                leaf: pick(&leaves, leaf).unwrap_or(LeafId::MIN),
                content: content.map_or(ContentRef::Empty, |i| ContentRef::Index(usize::from(i))),
            },
        };

        let before = layout.tree().clone();
        if layout.apply(operation).is_err() {
            assert_eq!(layout.tree(), &before, "failed operation mutated the layout");
        }
        layout.tree().validate().expect("tree stays valid");
    }
});
