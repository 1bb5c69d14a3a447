//! Neighbor search
use super::lookup::{node_at, node_or_parent_at};
use super::traversal::node_location;
use crate::traits::Location;
use crate::tree::neighbor::{children_sharing_face, Manifold};
use crate::tree::Tree;
use crate::types::{NodeIdx, Offset};
use smallvec::SmallVec;

/// Neighbor of a node across each of its faces, in the order of [`Manifold::offsets`]
pub type FaceNeighbors = SmallVec<[Option<NodeIdx>; 6]>;

/// Neighbors of a node across one manifold
pub type ManifoldNeighbors = SmallVec<[NodeIdx; 24]>;

/// Neighbors of a node across all manifolds
pub type AllNeighbors = SmallVec<[NodeIdx; 64]>;

/// Node at the same level as `n` displaced by `offset` node lengths, if it exists
pub fn same_level_neighbor<const D: usize, L: Location<D>>(
    tree: &Tree<D, L>,
    n: NodeIdx,
    offset: Offset<D>,
) -> Option<NodeIdx> {
    node_location(tree, n)
        .shift(offset)
        .and_then(|loc| node_at(tree, loc))
}

/// Node at the same level as `n` sharing its face normal to `axis`, on the positive or negative
/// side
pub fn face_neighbor<const D: usize, L: Location<D>>(
    tree: &Tree<D, L>,
    n: NodeIdx,
    axis: usize,
    positive: bool,
) -> Option<NodeIdx> {
    assert!(axis < D, "axis {axis} out of bounds [0, {D})");
    let mut offset = [0; D];
    offset[axis] = if positive { 1 } else { -1 };
    same_level_neighbor(tree, n, offset)
}

/// Neighbors of node `n` across its faces
///
/// For every face the neighbor is the node at the same level if it exists, otherwise the
/// coarser leaf covering it. Faces on the boundary of the root node have no neighbor.
pub fn node_neighbors<const D: usize, L: Location<D>>(
    tree: &Tree<D, L>,
    n: NodeIdx,
) -> FaceNeighbors {
    let loc = node_location(tree, n);
    Manifold::<D>::faces()
        .offsets()
        .iter()
        .map(|o| loc.shift(*o).map(|s| node_or_parent_at(tree, s).idx))
        .collect()
}

fn push_neighbors_across<const D: usize, L: Location<D>, P: FnMut(NodeIdx) -> bool>(
    tree: &Tree<D, L>,
    loc: L,
    manifold: Manifold<D>,
    pred: &mut P,
    neighbors: &mut impl Extend<NodeIdx>,
) {
    if loc.level() == 0 {
        return;
    }
    for offset in manifold.offsets() {
        let Some(shifted) = loc.shift(offset) else {
            continue;
        };
        let m = node_or_parent_at(tree, shifted).idx;
        if tree.is_leaf(m) {
            if pred(m) {
                neighbors.extend([m]);
            } else if let Some(p) = tree.parent(m).filter(|p| pred(*p)) {
                neighbors.extend([p]);
            }
        } else {
            for pos in children_sharing_face(&offset) {
                if let Some(c) = tree.child(m, pos).filter(|c| pred(*c)) {
                    neighbors.extend([c]);
                }
            }
        }
    }
}

/// Neighbors of node `n` across `manifold` accepted by `pred`
///
/// For every same-level position the neighbor is the leaf at the same or at a coarser level,
/// or the children of the same-level node that touch `n`. If a leaf is rejected by `pred`, its
/// parent is tried instead.
pub fn neighbors_across<const D: usize, L: Location<D>, P: FnMut(NodeIdx) -> bool>(
    tree: &Tree<D, L>,
    n: NodeIdx,
    manifold: Manifold<D>,
    mut pred: P,
) -> ManifoldNeighbors {
    let mut neighbors = ManifoldNeighbors::new();
    push_neighbors_across(
        tree,
        node_location(tree, n),
        manifold,
        &mut pred,
        &mut neighbors,
    );
    neighbors
}

/// Unique neighbors of node `n` across all manifolds accepted by `pred`, sorted by index
pub fn all_neighbors<const D: usize, L: Location<D>, P: FnMut(NodeIdx) -> bool>(
    tree: &Tree<D, L>,
    n: NodeIdx,
    mut pred: P,
) -> AllNeighbors {
    let loc = node_location(tree, n);
    let mut neighbors = AllNeighbors::new();
    for manifold in Manifold::<D>::all() {
        push_neighbors_across(tree, loc, manifold, &mut pred, &mut neighbors);
    }
    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors
}
