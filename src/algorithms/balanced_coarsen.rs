//! 2:1 balanced coarsening
use super::neighbors::neighbors_across;
use super::traversal::node_level;
use crate::traits::Location;
use crate::tree::neighbor::Manifold;
use crate::tree::Tree;
use crate::types::{NodeIdx, NodeRange};
use log::warn;

/// Coarsen node `n` if that keeps the tree 2:1 balanced across faces
///
/// `n` is coarsened only if all its children are leaves and none of them shares a face with a
/// finer node. `restriction(parent, children)` is called right before the children are removed.
/// Returns whether `n` was coarsened.
pub fn balanced_coarsen<const D: usize, L: Location<D>, R: FnMut(NodeIdx, NodeRange)>(
    tree: &mut Tree<D, L>,
    n: NodeIdx,
    mut restriction: R,
) -> bool {
    let children = tree.children(n);
    if children.is_empty() || children.into_iter().any(|c| tree.is_internal(c)) {
        return false;
    }
    let child_level = node_level(tree, n) + 1;
    for child in children {
        for neighbor in neighbors_across(tree, child, Manifold::faces(), |_| true) {
            let neighbor_level = node_level(tree, neighbor);
            if neighbor_level > child_level {
                warn!(
                    "Cannot coarsen node {n}: its child {child} at level {child_level} has a \
                     neighbor {neighbor} at level {neighbor_level}"
                );
                return false;
            }
        }
    }
    restriction(n, children);
    tree.coarsen(n);
    true
}
