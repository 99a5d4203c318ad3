//! Tests for TidyTree over generated hierarchies

use rstest::rstest;

use springtree::domain::{Canvas, Extent, Hierarchy, HierarchyBuilder, LayoutOptions, Record, TidyTree};
use springtree::util::testing::init_test_setup;

/// Deterministic pseudo-random forest: record `i` hangs off an earlier record or the root.
fn forest(size: usize, seed: u64) -> Vec<Record> {
    let mut state = seed;
    (0..size)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let pick = (state >> 33) as usize % (i + 1);
            let parent = (pick < i).then(|| format!("n{pick}"));
            Record::new(format!("n{i}"), parent.as_deref(), format!("Node {i}"))
        })
        .collect()
}

fn laid_out(records: &[Record], extent: Extent) -> Hierarchy {
    init_test_setup();
    let mut h = HierarchyBuilder::default()
        .build(records)
        .unwrap()
        .expect("hierarchy");
    TidyTree::new(LayoutOptions::default())
        .layout(&mut h, extent)
        .unwrap();
    h
}

#[rstest]
#[case(1, 7)]
#[case(2, 11)]
#[case(10, 3)]
#[case(50, 42)]
#[case(200, 1234)]
fn given_forest_when_laying_out_then_one_finite_position_per_node(
    #[case] size: usize,
    #[case] seed: u64,
) {
    let extent = Canvas::default().inner_extent().unwrap();
    let h = laid_out(&forest(size, seed), extent);

    assert!(h.is_laid_out());
    assert_eq!(h.iter().count(), size + 1);
    for (_, node) in h.iter() {
        let p = node.position.expect("position");
        assert!(p.is_finite(), "{} at {}", node, p);
        assert!(p.x > 0.0 && p.x < extent.spread, "{} spread {}", node, p.x);
        assert!(p.y >= 0.0 && p.y <= extent.depth + 1e-9, "{} depth {}", node, p.y);
    }
}

#[rstest]
#[case(30, 5)]
#[case(120, 99)]
fn given_forest_when_laying_out_then_depth_maps_to_evenly_spaced_levels(
    #[case] size: usize,
    #[case] seed: u64,
) {
    let extent = Extent {
        spread: 400.0,
        depth: 600.0,
    };
    let h = laid_out(&forest(size, seed), extent);
    let step = extent.depth / h.depth() as f64;

    for (_, node) in h.iter() {
        let y = node.position.unwrap().y;
        assert!((y - node.depth as f64 * step).abs() < 1e-9);
    }
}

#[test]
fn given_forest_when_laying_out_then_same_level_nodes_do_not_overlap() {
    let h = laid_out(
        &forest(80, 17),
        Extent {
            spread: 1000.0,
            depth: 500.0,
        },
    );

    let mut levels: Vec<Vec<f64>> = vec![Vec::new(); h.depth() + 1];
    for (_, node) in h.iter() {
        levels[node.depth].push(node.position.unwrap().x);
    }
    for mut xs in levels {
        xs.sort_by(f64::total_cmp);
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] > 1e-6, "overlap at {:?}", pair);
        }
    }
}

#[test]
fn given_root_when_laying_out_then_centered_over_its_children() {
    let h = laid_out(
        &forest(25, 8),
        Extent {
            spread: 400.0,
            depth: 300.0,
        },
    );

    for (_, node) in h.iter().filter(|(_, n)| !n.is_leaf()) {
        let first = h.node(node.children[0]).unwrap().position.unwrap().x;
        let last = h
            .node(*node.children.last().unwrap())
            .unwrap()
            .position
            .unwrap()
            .x;
        let x = node.position.unwrap().x;
        assert!((x - (first + last) / 2.0).abs() < 1e-6, "{} not centered", node);
    }
}
