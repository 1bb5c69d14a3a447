//! Depth-first sorting of the tree arena
use crate::traits::Location;
use crate::tree::Tree;
use crate::types::{NodeIdx, SiblingsIdx};

/// Sort the sub-tree below sibling group `s`, which must already be at its final position
///
/// Returns the last sibling group of the sorted sub-tree.
fn sort_below<const D: usize, L: Location<D>, F: FnMut(NodeIdx, NodeIdx)>(
    tree: &mut Tree<D, L>,
    s: SiblingsIdx,
    data_swap: &mut F,
) -> SiblingsIdx {
    let mut should = s;
    for n in Tree::<D, L>::group_nodes(s) {
        let Some(cg) = tree.children_group(n) else {
            continue;
        };
        should = SiblingsIdx(should.0 + 1);
        if cg != should {
            tree.swap(cg, should);
            for (a, b) in Tree::<D, L>::group_nodes(cg).zip(Tree::<D, L>::group_nodes(should)) {
                data_swap(a, b);
            }
        }
        should = sort_below(tree, should, data_swap);
    }
    should
}

/// Sort the tree arena in depth-first order
///
/// After sorting, the children of a node are stored after the node and after the sub-trees of
/// all its preceding siblings, and the arena is compact. Every time two nodes exchange their
/// positions `data_swap(a, b)` is called so that node data can be moved along.
pub fn dfs_sort<const D: usize, L: Location<D>, F: FnMut(NodeIdx, NodeIdx)>(
    tree: &mut Tree<D, L>,
    mut data_swap: F,
) {
    sort_below(tree, SiblingsIdx(0), &mut data_swap);
    debug_assert!(tree.is_compact(), "tree is not compact after sorting");
}

/// Is the tree arena sorted in depth-first order?
pub fn is_dfs_sorted<const D: usize, L: Location<D>>(tree: &Tree<D, L>) -> bool {
    let mut expected = SiblingsIdx(0);
    let mut stack = vec![SiblingsIdx(0)];
    while let Some(s) = stack.pop() {
        // Children groups of `s` are visited in position order
        for n in Tree::<D, L>::group_nodes(s).rev() {
            if let Some(cg) = tree.children_group(n) {
                stack.push(cg);
            }
        }
        if s != expected {
            return false;
        }
        expected = SiblingsIdx(expected.0 + 1);
    }
    true
}
