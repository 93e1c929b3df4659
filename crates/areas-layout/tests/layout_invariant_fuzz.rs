//! Property/fuzz-style invariants for layout operation streams.
//!
//! Random operation sequences run against the public `Layout` API; after each
//! step the tree must validate, every container must keep at least two
//! children whose ratios sum to 100, and split must never reissue a leaf id.

use std::collections::BTreeSet;

use areas_layout::{
    ContainerId, ContentCatalog, ContentRef, Direction, Layout, LayoutOperation, LayoutTree,
    LeafId, OperationOutcome, RATIO_SUM_TOLERANCE, RATIO_TOTAL,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        min + unit * (max - min)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }
}

const CATALOG: [&str; 4] = ["editor", "terminal", "preview", "log"];

fn catalog() -> ContentCatalog {
    ContentCatalog::new(CATALOG)
}

fn random_direction(rng: &mut Lcg) -> Direction {
    if rng.choose_bool() {
        Direction::Row
    } else {
        Direction::Column
    }
}

fn random_content(rng: &mut Lcg) -> ContentRef {
    match rng.choose_index(CATALOG.len() + 2) {
        0 => ContentRef::Empty,
        1 => ContentRef::from(CATALOG[rng.choose_index(CATALOG.len())]),
        n => ContentRef::Index(n - 2),
    }
}

fn random_ratios(rng: &mut Lcg, count: usize) -> Vec<f64> {
    let weights: Vec<f64> = (0..count).map(|_| rng.next_f64_range(1.0, 32.0)).collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| w / total * RATIO_TOTAL).collect()
}

fn random_operation(tree: &LayoutTree, rng: &mut Lcg) -> LayoutOperation {
    let leaves = tree.leaves_in_order();
    let containers = tree.containers_in_order();

    let mut candidates = vec![0usize, 5]; // SplitLeaf, ChangeLeafContent
    if leaves.len() > 1 {
        candidates.push(1); // DeleteLeaf
        candidates.push(2); // SwapContent
    }
    if !containers.is_empty() {
        candidates.push(3); // UpdateRatios
        candidates.push(4); // ResizeDivider
    }

    match candidates[rng.choose_index(candidates.len())] {
        1 => LayoutOperation::DeleteLeaf {
            leaf: leaves[rng.choose_index(leaves.len())],
        },
        2 => LayoutOperation::SwapContent {
            first: leaves[rng.choose_index(leaves.len())],
            second: leaves[rng.choose_index(leaves.len())],
        },
        3 => {
            let container = containers[rng.choose_index(containers.len())];
            let count = tree
                .container(container)
                .expect("listed container exists")
                .child_count();
            LayoutOperation::UpdateRatios {
                container,
                ratios: random_ratios(rng, count),
            }
        }
        4 => {
            let container = containers[rng.choose_index(containers.len())];
            let dividers = tree
                .container(container)
                .expect("listed container exists")
                .child_count()
                - 1;
            LayoutOperation::ResizeDivider {
                container,
                index: rng.choose_index(dividers),
                delta: rng.next_f64_range(-60.0, 60.0),
            }
        }
        5 => LayoutOperation::ChangeLeafContent {
            leaf: leaves[rng.choose_index(leaves.len())],
            content: random_content(rng),
        },
        _ => LayoutOperation::SplitLeaf {
            leaf: leaves[rng.choose_index(leaves.len())],
            direction: random_direction(rng),
            percentage: rng.next_f64_range(5.0, 95.0),
            insert_after: rng.choose_bool(),
        },
    }
}

fn assert_tree_invariants(tree: &LayoutTree) {
    tree.validate()
        .expect("tree should remain structurally valid");
    for container in tree.containers() {
        assert!(
            container.child_count() >= 2,
            "container {} has {} children",
            container.id,
            container.child_count()
        );
        assert_eq!(container.ratios.len(), container.child_count());
        let sum: f64 = container.ratios.iter().sum();
        assert!(
            (sum - RATIO_TOTAL).abs() <= RATIO_SUM_TOLERANCE,
            "container {} ratios {:?} sum to {sum}",
            container.id,
            container.ratios
        );
        assert!(container.ratios.iter().all(|ratio| *ratio >= 0.0));
    }

    let leaves = tree.leaves_in_order();
    let distinct: BTreeSet<LeafId> = leaves.iter().copied().collect();
    assert_eq!(distinct.len(), leaves.len(), "duplicate leaf ids");
    let containers = tree.containers_in_order();
    let distinct: BTreeSet<ContainerId> = containers.iter().copied().collect();
    assert_eq!(distinct.len(), containers.len(), "duplicate container ids");
    assert_eq!(leaves.len(), tree.leaf_count());
    assert_eq!(containers.len(), tree.container_count());
}

fn run_sequence(seed: u64, steps: usize) -> (Layout, Vec<LayoutOperation>) {
    let mut layout = Layout::new(catalog());
    let mut rng = Lcg::new(seed);
    let mut applied = Vec::with_capacity(steps);
    let mut issued: BTreeSet<LeafId> = BTreeSet::from([LeafId::MIN]);

    for step in 0..steps {
        let operation = random_operation(layout.tree(), &mut rng);
        let outcome = layout.apply(operation.clone());
        assert!(
            outcome.is_ok(),
            "operation failed at step {step}, seed={seed}, op={operation:?}, err={outcome:?}"
        );
        if let Ok(OperationOutcome::Split(split)) = &outcome {
            assert!(
                issued.insert(split.leaf),
                "leaf id {} reissued at step {step}, seed={seed}",
                split.leaf
            );
        }

        assert_tree_invariants(layout.tree());
        applied.push(operation);
    }

    (layout, applied)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_operation_sequences_preserve_invariants(
        seed in any::<u64>(),
        steps in 20usize..120,
    ) {
        let (layout, _) = run_sequence(seed, steps);
        assert_tree_invariants(layout.tree());
    }

    #[test]
    fn random_operation_sequences_replay_deterministically(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let (final_layout, operations) = run_sequence(seed, steps);

        let mut replay = Layout::new(catalog());
        for operation in operations {
            replay
                .apply(operation)
                .expect("replay operation should succeed");
        }

        prop_assert_eq!(replay.snapshot(), final_layout.snapshot());
        prop_assert_eq!(replay.tree(), final_layout.tree());
    }

    #[test]
    fn snapshots_restore_to_identical_structure(
        seed in any::<u64>(),
        steps in 10usize..80,
    ) {
        let (layout, _) = run_sequence(seed, steps);
        let snapshot = layout.snapshot();
        let json = snapshot.to_json().expect("snapshot serializes");

        let mut restored = Layout::new(catalog());
        let parsed = areas_layout::LayoutSnapshot::from_json(&json).expect("snapshot parses");
        let manifest = restored.restore(&parsed).expect("snapshot restores");

        prop_assert_eq!(manifest.changed.len(), layout.tree().container_count());
        prop_assert_eq!(restored.tree().leaves_in_order(), layout.tree().leaves_in_order());
        prop_assert_eq!(restored.snapshot(), snapshot);
        assert_tree_invariants(restored.tree());
    }
}

#[test]
fn fuzz_seed_corpus_preserves_invariants() {
    let seeds = [
        0_u64,
        1,
        2,
        3,
        5,
        8,
        13,
        21,
        34,
        55,
        89,
        144,
        u32::MAX as u64,
        (u32::MAX as u64) + 1,
        u64::MAX - 1,
        u64::MAX,
    ];

    for seed in seeds {
        let (layout, _) = run_sequence(seed, 180);
        assert_tree_invariants(layout.tree());
    }
}

#[test]
fn swapping_twice_restores_content_mapping() {
    for seed in [7_u64, 99, 4242] {
        let (mut layout, _) = run_sequence(seed, 60);
        let leaves = layout.tree().leaves_in_order();
        if leaves.len() < 2 {
            continue;
        }
        let before = layout.snapshot();
        let (first, second) = (leaves[0], leaves[leaves.len() - 1]);
        let forward = layout.swap_content(first, second).expect("swap");
        let backward = layout.swap_content(first, second).expect("swap back");
        assert_eq!(layout.snapshot(), before);
        assert_eq!(forward.moves.len(), backward.moves.len());
        for there in &forward.moves {
            let back = backward
                .moves
                .iter()
                .find(|moved| moved.content == there.content)
                .expect("every moved content moves back");
            assert_eq!(there.current, back.previous);
            assert_eq!(there.previous, back.current);
        }
    }
}
