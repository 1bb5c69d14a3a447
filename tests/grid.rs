//! Tests of several grids stored on one tree
use ndtree::algorithms::node_location;
use ndtree::grid::{MultiTree, SolverGrid};
use ndtree::types::{GridIdx, GridNodeIdx, Level, NodeIdx};

fn n(i: usize) -> NodeIdx {
    NodeIdx(i)
}

/// Refine the grid until all its nodes are at `level`
fn uniform_grid<const D: usize>(tree: &mut MultiTree<D>, grid: &mut SolverGrid, level: Level) {
    if grid.size() == 0 {
        grid.push(tree, n(0));
    }
    loop {
        let coarse = grid.in_use().find(|gn| grid.level(&*tree, *gn) < level);
        let Some(gn) = coarse else {
            break;
        };
        grid.refine(tree, gn, |_, _| {});
    }
}

/// Coarsen the grid until none of its nodes is below `level`
fn coarsen_grid<const D: usize>(tree: &mut MultiTree<D>, grid: &mut SolverGrid, level: Level) {
    loop {
        let fine = grid.in_use().find(|gn| grid.level(&*tree, *gn) > level);
        let Some(gn) = fine else {
            break;
        };
        grid.coarsen(tree, gn, |_, _| {});
    }
}

#[test]
fn test_grids_at_different_resolutions() {
    let mut tree = MultiTree::<2>::new(2);
    let mut fine = SolverGrid::new(GridIdx(0));
    let mut coarse = SolverGrid::new(GridIdx(1));
    uniform_grid(&mut tree, &mut fine, 2);
    uniform_grid(&mut tree, &mut coarse, 1);

    assert_eq!(fine.size(), 16);
    assert_eq!(coarse.size(), 4);
    assert_eq!(tree.tree().size(), 21);
    assert_eq!(fine.levels(&tree), Some(2..=2));
    assert_eq!(coarse.levels(&tree), Some(1..=1));
    for m in tree.nodes(GridIdx(1)) {
        assert!(tree.tree().is_internal(m));
        assert_eq!(
            tree.grid_nodes(m).collect::<Vec<_>>(),
            vec![None, tree.node(m, GridIdx(1))]
        );
    }

    // Pairs of nodes sharing a face or a corner in a 4x4 grid, counted from both sides
    let no_neighbors: usize = fine.in_use().map(|gn| fine.neighbors(&tree, gn).len()).sum();
    assert_eq!(no_neighbors, 2 * (12 + 12 + 18));

    // Nodes that no grid uses anymore are removed from the tree
    coarsen_grid(&mut tree, &mut fine, 1);
    assert_eq!(fine.size(), 4);
    assert_eq!(tree.tree().size(), 5);
    assert_eq!(
        tree.nodes(GridIdx(0)).collect::<Vec<_>>(),
        tree.nodes(GridIdx(1)).collect::<Vec<_>>()
    );
    for m in tree.tree().children(n(0)) {
        assert!(tree.grid_nodes(m).all(|gn| gn.is_some()));
    }

    // The coarse grid still uses the level 1 nodes
    coarsen_grid(&mut tree, &mut fine, 0);
    assert_eq!(fine.size(), 1);
    assert_eq!(tree.tree().size(), 5);
    coarsen_grid(&mut tree, &mut coarse, 0);
    assert_eq!(tree.tree().size(), 1);
    assert_eq!(fine.tree_node(fine.in_use().next().unwrap()), n(0));
    assert_eq!(coarse.tree_node(coarse.in_use().next().unwrap()), n(0));
}

#[test]
fn test_grid_refinement_keeps_tree_balanced() {
    let mut tree = MultiTree::<2>::new(1);
    let mut grid = SolverGrid::new(GridIdx(0));
    uniform_grid(&mut tree, &mut grid, 1);
    let first = tree.node(n(1), GridIdx(0)).unwrap();
    grid.refine(&mut tree, first, |_, _| {});
    assert_eq!(grid.size(), 7);

    // Refining the level 2 node in the corner refines its coarser tree neighbors
    let corner = tree.node(n(8), GridIdx(0)).unwrap();
    let children = grid.refine(&mut tree, corner, |_, _| {});
    assert_eq!(children.len(), 4);
    assert_eq!(grid.size(), 10);
    assert_eq!(grid.levels(&tree), Some(1..=3));
    assert!(tree.tree().is_internal(n(2)));
    assert!(tree.tree().is_internal(n(3)));
    assert!(tree.in_grid(n(2), GridIdx(0)));
    assert!(tree.in_grid(n(3), GridIdx(0)));
    assert!(!tree.in_grid(n(8), GridIdx(0)));
}

#[test]
fn test_sort_grids() {
    let mut tree = MultiTree::<2>::new(2);
    let mut fine = SolverGrid::new(GridIdx(0));
    let mut coarse = SolverGrid::new(GridIdx(1));
    uniform_grid(&mut tree, &mut coarse, 1);
    uniform_grid(&mut tree, &mut fine, 2);
    let last = tree.tree().children(n(0)).last().unwrap();
    let child = tree.tree().children(last).next().unwrap();
    let child = tree.node(child, GridIdx(0)).unwrap();
    fine.coarsen(&mut tree, child, |_, _| {});
    assert_eq!(fine.size(), 13);
    assert!(!fine.is_compact());

    // Every grid node carries the location of its tree node as data
    let mut data: Vec<_> = (0..fine.capacity())
        .map(|i| {
            let gn = GridNodeIdx(i);
            (!fine.is_free(gn)).then(|| node_location(tree.tree(), fine.tree_node(gn)))
        })
        .collect();

    tree.sort();
    assert!(tree.is_sorted());
    fine.sort(&mut tree, |a, b| data.swap(a.0, b.0));
    coarse.sort(&mut tree, |_, _| {});

    for grid in [&fine, &coarse] {
        assert!(grid.is_compact());
        assert_eq!(SolverGrid::from_tree(&tree, grid.idx()), *grid);
        let tree_nodes: Vec<_> = grid.in_use().map(|gn| grid.tree_node(gn)).collect();
        assert!(tree_nodes.windows(2).all(|w| w[0] < w[1]));
    }
    assert_eq!(fine.capacity(), 13);
    for gn in fine.in_use() {
        assert_eq!(
            data[gn.0],
            Some(node_location(tree.tree(), fine.tree_node(gn)))
        );
    }
    // The free slot left by the root is closed
    assert_eq!(coarse.capacity(), 4);
    for (i, m) in tree.tree().children(n(0)).enumerate() {
        assert_eq!(coarse.tree_node(GridNodeIdx(i)), m);
    }
}
