#![no_main]

use areas_layout::{ContentCatalog, Layout, LayoutSnapshot, RATIO_SUM_TOLERANCE, RATIO_TOTAL};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = LayoutSnapshot::from_json(json) else {
        return;
    };

    let mut layout = Layout::new(ContentCatalog::new(["editor", "terminal", "preview"]));
    let before = layout.tree().clone();
    let Ok(manifest) = layout.restore(&snapshot) else {
        // Rejected snapshots leave the layout untouched.
        assert_eq!(layout.tree(), &before, "failed restore mutated the layout");
        return;
    };

    let tree = layout.tree();
    tree.validate().expect("restored tree validates");
    assert_eq!(manifest.changed.len(), tree.container_count());
    for container in tree.containers() {
        let sum: f64 = container.ratios.iter().sum();
        assert!((sum - RATIO_TOTAL).abs() <= RATIO_SUM_TOLERANCE);
        assert!(container.child_count() >= 2);
    }
    for leaf in tree.leaves() {
        assert!(leaf.id < tree.allocator().peek_leaf(), "leaf counter below live id");
    }

    // Export and re-import must be stable.
    let exported = layout.snapshot();
    let mut again = Layout::new(ContentCatalog::new(["editor", "terminal", "preview"]));
    again.restore(&exported).expect("exported snapshot restores");
    assert_eq!(again.snapshot(), exported);
});
