//! Tests of trees and their algorithms on randomly refined trees
use ndtree::algorithms::{
    balanced_coarsen, balanced_refine, dfs_sort, is_dfs_sorted, node_at, node_level,
    node_location, node_neighbors, uniform_refine,
};
use ndtree::location::{Deinterleaved, Interleaved};
use ndtree::traits::Location;
use ndtree::tree::{BinaryTree, QuadTree, Tree};
use ndtree::types::{Level, NodeIdx};
use paste::paste;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn n(i: usize) -> NodeIdx {
    NodeIdx(i)
}

/// Refine `no_refinements` random leaves above `max_level`, keeping the tree balanced
fn random_tree<const D: usize, L: Location<D>>(
    rng: &mut StdRng,
    no_refinements: usize,
    max_level: Level,
) -> Tree<D, L> {
    let mut tree = Tree::new();
    for _ in 0..no_refinements {
        let leaves: Vec<_> = tree.leaves().collect();
        let leaf = leaves[rng.gen_range(0..leaves.len())];
        if node_level(&tree, leaf) < max_level {
            balanced_refine(&mut tree, leaf, |_, _| {});
        }
    }
    tree
}

/// Leaves below node `n` in the order a depth-first traversal visits them
fn dfs_leaves<const D: usize, L: Location<D>>(
    tree: &Tree<D, L>,
    n: NodeIdx,
    leaves: &mut Vec<NodeIdx>,
) {
    if tree.is_leaf(n) {
        leaves.push(n);
        return;
    }
    for c in tree.children(n) {
        dfs_leaves(tree, c, leaves);
    }
}

fn assert_leaves_in_location_order<const D: usize, L: Location<D>>(tree: &Tree<D, L>) {
    let mut expected = vec![];
    dfs_leaves(tree, Tree::<D, L>::root(), &mut expected);
    let mut by_location: Vec<_> = tree.leaves().collect();
    by_location.sort_by_key(|m| node_location(tree, *m));
    assert_eq!(by_location, expected);
}

/// Coarsen random internal nodes whose children are all leaves
fn random_coarsening<const D: usize, L: Location<D>>(
    rng: &mut StdRng,
    tree: &mut Tree<D, L>,
    no_coarsenings: usize,
) -> usize {
    let mut coarsened = 0;
    for _ in 0..no_coarsenings {
        let candidates: Vec<_> = tree
            .nodes()
            .filter(|m| tree.is_internal(*m) && tree.children(*m).all(|c| tree.is_leaf(c)))
            .collect();
        if candidates.is_empty() {
            break;
        }
        let m = candidates[rng.gen_range(0..candidates.len())];
        if balanced_coarsen(tree, m, |_, _| {}) {
            coarsened += 1;
        }
    }
    coarsened
}

/// No leaf shares a face with a leaf more than one level coarser
fn assert_balanced<const D: usize, L: Location<D>>(tree: &Tree<D, L>) {
    for leaf in tree.leaves() {
        let level = node_level(tree, leaf);
        for m in node_neighbors(tree, leaf).into_iter().flatten() {
            let neighbor_level = node_level(tree, m);
            assert!(
                level <= neighbor_level + 1,
                "leaf {leaf} at level {level} shares a face with node {m} at level {neighbor_level}"
            );
        }
    }
}

fn leaf_locations<const D: usize, L: Location<D>>(tree: &Tree<D, L>) -> HashSet<L> {
    tree.leaves().map(|m| node_location(tree, m)).collect()
}

macro_rules! random_tree_tests {
    ($dim:literal, $location:ident, $refinements:expr, $max_level:expr) => {
        paste! {
            #[test]
            fn [<test_locations_ $dim d_ $location:lower>]() {
                let mut rng = StdRng::seed_from_u64(1);
                let tree =
                    random_tree::<$dim, $location<$dim>>(&mut rng, $refinements, $max_level);
                for m in tree.nodes() {
                    let loc = node_location(&tree, m);
                    assert_eq!(loc.level(), node_level(&tree, m));
                    assert_eq!(node_at(&tree, loc), Some(m));
                    assert_eq!($location::<$dim>::from_positions(loc.positions()), loc);
                    if let Some(p) = tree.parent(m) {
                        assert_eq!(node_location(&tree, p), loc.parent());
                        assert_eq!(loc.at(loc.level()), Tree::<$dim>::position_in_parent(m));
                    }
                }
            }

            #[test]
            fn [<test_balance_ $dim d_ $location:lower>]() {
                let mut rng = StdRng::seed_from_u64(2);
                let mut tree =
                    random_tree::<$dim, $location<$dim>>(&mut rng, $refinements, $max_level);
                assert_balanced(&tree);
                random_coarsening(&mut rng, &mut tree, $refinements);
                assert_balanced(&tree);
            }

            #[test]
            fn [<test_refine_coarsen_inverse_ $dim d_ $location:lower>]() {
                let mut rng = StdRng::seed_from_u64(3);
                let tree =
                    random_tree::<$dim, $location<$dim>>(&mut rng, $refinements, $max_level);
                for leaf in tree.leaves() {
                    let mut refined = tree.clone();
                    assert_eq!(refined.refine(leaf).len(), 1 << $dim);
                    refined.coarsen(leaf);
                    assert_eq!(refined, tree);
                }
            }

            #[test]
            fn [<test_dfs_sort_ $dim d_ $location:lower>]() {
                let mut rng = StdRng::seed_from_u64(4);
                let mut tree =
                    random_tree::<$dim, $location<$dim>>(&mut rng, $refinements, $max_level);
                random_coarsening(&mut rng, &mut tree, $refinements / 2);
                let leaves = leaf_locations(&tree);
                let size = tree.size();
                dfs_sort(&mut tree, |_, _| {});
                assert!(tree.is_compact());
                assert!(is_dfs_sorted(&tree));
                assert_eq!(tree.size(), size);
                assert_eq!(leaf_locations(&tree), leaves);
                // Arena order of a sorted tree is location order
                let locations: Vec<_> = tree.nodes().map(|m| node_location(&tree, m)).collect();
                assert!(locations.windows(2).all(|w| w[0] < w[1]));
            }

            #[test]
            fn [<test_location_order_is_dfs_order_ $dim d_ $location:lower>]() {
                let mut tree = Tree::<$dim, $location<$dim>>::new();
                uniform_refine(&mut tree, 3);
                assert_leaves_in_location_order(&tree);

                let mut rng = StdRng::seed_from_u64(6);
                let tree =
                    random_tree::<$dim, $location<$dim>>(&mut rng, $refinements, $max_level);
                assert_leaves_in_location_order(&tree);
            }
        }
    };
}

random_tree_tests!(1, Interleaved, 40, 12);
random_tree_tests!(1, Deinterleaved, 40, 12);
random_tree_tests!(2, Interleaved, 40, 6);
random_tree_tests!(2, Deinterleaved, 40, 6);
random_tree_tests!(3, Interleaved, 20, 4);
random_tree_tests!(3, Deinterleaved, 20, 4);

macro_rules! location_order_test {
    ($dim:literal) => {
        paste! {
            #[test]
            fn [<test_location_order_ $dim d>]() {
                let mut rng = StdRng::seed_from_u64(5);
                let random_positions = |rng: &mut StdRng| -> Vec<usize> {
                    let level = rng.gen_range(0..8);
                    (0..level).map(|_| rng.gen_range(0..1 << $dim)).collect()
                };
                for _ in 0..200 {
                    let a = random_positions(&mut rng);
                    let b = random_positions(&mut rng);
                    let (ia, ib) = (
                        Interleaved::<$dim>::from_positions(a.clone()),
                        Interleaved::<$dim>::from_positions(b.clone()),
                    );
                    let (da, db) = (
                        Deinterleaved::<$dim>::from_positions(a),
                        Deinterleaved::<$dim>::from_positions(b),
                    );
                    assert_eq!(ia.coordinates(), da.coordinates());
                    assert_eq!(ia.morton_idx(), da.morton_idx());
                    assert_eq!(ia.cmp(&ib), da.cmp(&db));
                }
            }

            #[test]
            fn [<test_shift_back_ $dim d>]() {
                let mut t = Tree::<$dim>::new();
                uniform_refine(&mut t, 2);
                for m in t.leaves() {
                    let loc = node_location(&t, m);
                    for axis in 0..$dim {
                        for step in [-1, 1] {
                            let mut offset = [0; $dim];
                            offset[axis] = step;
                            if let Some(shifted) = loc.shift(offset) {
                                offset[axis] = -step;
                                assert_eq!(shifted.shift(offset), Some(loc));
                            }
                        }
                    }
                }
            }
        }
    };
}

location_order_test!(1);
location_order_test!(2);
location_order_test!(3);

#[test]
fn test_location_order_mixed_levels_1d() {
    let mut t = BinaryTree::new();
    t.refine(n(0));
    t.refine(n(1));
    t.refine(n(3));
    // Leaves at levels 3, 3, 2 and 1 from left to right
    let mut leaves: Vec<_> = t.leaves().collect();
    leaves.sort_by_key(|m| node_location(&t, *m));
    assert_eq!(leaves, vec![n(5), n(6), n(4), n(2)]);
    assert_leaves_in_location_order(&t);
}

#[test]
fn test_cascading_refinement_2d() {
    let mut t = QuadTree::new();
    let children = t.refine(n(0));
    assert_eq!(
        children
            .map(QuadTree::position_in_parent)
            .collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
    let mut grandchildren = t.refine(n(1));
    assert!(grandchildren.all(|m| node_level(&t, m) == 2));

    // Node 8 is the grandchild in the corner touching the other level 1 nodes
    let refined = balanced_refine(&mut t, n(8), |_, _| {});
    assert_eq!(refined.len(), 4);
    assert!(t.is_internal(n(2)));
    assert!(t.is_internal(n(3)));
    assert!(t.is_leaf(n(4)));
    assert_balanced(&t);
    let max_level = t.leaves().map(|m| node_level(&t, m)).max();
    assert_eq!(max_level, Some(3));
}

#[test]
fn test_neighbors_1d() {
    let mut t = BinaryTree::new();
    t.refine(n(0));
    assert_eq!(node_neighbors(&t, n(2)).to_vec(), vec![Some(n(1)), None]);
    assert_eq!(node_neighbors(&t, n(1)).to_vec(), vec![None, Some(n(2))]);
    assert_eq!(node_neighbors(&t, n(0)).to_vec(), vec![None, None]);
}
