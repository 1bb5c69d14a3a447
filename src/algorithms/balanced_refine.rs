//! 2:1 balanced refinement
use super::lookup::node_or_parent_at;
use super::traversal::{node_level, node_location};
use crate::traits::Location;
use crate::tree::neighbor::Manifold;
use crate::tree::Tree;
use crate::types::{Level, NodeIdx, NodeRange};
use log::{debug, warn};
use smallvec::SmallVec;

/// Leaves sharing a face with node `n` that are coarser than `n`
fn coarser_face_leaves<const D: usize, L: Location<D>>(
    tree: &Tree<D, L>,
    n: NodeIdx,
) -> SmallVec<[NodeIdx; 6]> {
    let loc = node_location(tree, n);
    let mut coarser = SmallVec::new();
    for offset in Manifold::<D>::faces().offsets() {
        if let Some(shifted) = loc.shift(offset) {
            let found = node_or_parent_at(tree, shifted);
            if found.level < loc.level() && tree.is_leaf(found.idx) && !coarser.contains(&found.idx)
            {
                coarser.push(found.idx);
            }
        }
    }
    coarser
}

/// Refine node `n` keeping the tree 2:1 balanced across faces
///
/// Before `n` is refined, every leaf sharing a face with `n` that is coarser than `n` is refined
/// (recursively, with the same guarantee), so that after the refinement no leaf shares a face
/// with a leaf more than one level apart. `projection(parent, children)` is called once after
/// every refinement, including the cascaded ones.
///
/// Returns the children of `n`, or an empty range if `n` is not a leaf or is at the deepest
/// level its location code can encode.
pub fn balanced_refine<const D: usize, L: Location<D>, P: FnMut(NodeIdx, NodeRange)>(
    tree: &mut Tree<D, L>,
    n: NodeIdx,
    mut projection: P,
) -> NodeRange {
    if !tree.is_leaf(n) {
        return NodeRange::empty();
    }
    let level = node_level(tree, n);
    if level >= L::max_level() {
        warn!(
            "Cannot refine node {n}: level {level} is the maximum level {}",
            L::max_level()
        );
        return NodeRange::empty();
    }

    // Coarser neighbors are refined first: the stack only grows with nodes strictly coarser
    // than the node below them, so its depth is bounded by the level of `n`.
    let mut stack = vec![n];
    while let Some(&m) = stack.last() {
        if tree.is_internal(m) {
            stack.pop();
            continue;
        }
        let coarser = coarser_face_leaves(tree, m);
        if coarser.is_empty() {
            let children = tree.refine(m);
            projection(m, children);
            stack.pop();
        } else {
            debug!(
                "Refining node {m} requires refining its coarser neighbors {:?} first",
                coarser
            );
            stack.extend(coarser);
        }
    }
    tree.children(n)
}

/// Refine the tree until every leaf is at least at `level`
pub fn uniform_refine<const D: usize, L: Location<D>>(tree: &mut Tree<D, L>, level: Level) {
    assert!(
        level <= L::max_level(),
        "level {level} out of bounds [0, {}]",
        L::max_level()
    );
    let mut stack = vec![(Tree::<D, L>::root(), 0)];
    while let Some((n, l)) = stack.pop() {
        if l == level {
            continue;
        }
        if tree.is_leaf(n) {
            tree.refine(n);
        }
        // Children are visited in position order, allocating sibling groups depth-first
        stack.extend(tree.children(n).rev().map(|c| (c, l + 1)));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithms::node_neighbors;
    use crate::tree::{OcTree, QuadTree};

    fn n(i: usize) -> NodeIdx {
        NodeIdx(i)
    }

    fn assert_balanced<const D: usize, L: Location<D>>(tree: &Tree<D, L>) {
        for m in tree.leaves() {
            let l = node_level(tree, m);
            for neighbor in node_neighbors(tree, m).into_iter().flatten() {
                let nl = node_level(tree, neighbor);
                assert!(
                    l.abs_diff(nl) <= 1,
                    "leaf {m} at level {l} has neighbor {neighbor} at level {nl}"
                );
            }
        }
    }

    #[test]
    fn test_no_cascade() {
        let mut t = QuadTree::new();
        let mut calls = vec![];
        let children = balanced_refine(&mut t, n(0), |p, c| calls.push((p, c)));
        assert_eq!(children.collect::<Vec<_>>(), vec![n(1), n(2), n(3), n(4)]);
        assert_eq!(calls, vec![(n(0), children)]);
    }

    #[test]
    fn test_internal_node() {
        let mut t = QuadTree::new();
        t.refine(n(0));
        let children = balanced_refine(&mut t, n(0), |_, _| panic!("nothing to refine"));
        assert!(children.is_empty());
        assert_eq!(t.size(), 5);
    }

    #[test]
    fn test_cascade_2d() {
        let mut t = QuadTree::new();
        t.refine(n(0));
        t.refine(n(1));
        t.refine(n(5));
        assert_balanced(&t);

        // Node 10 lies at the right edge of node 5, next to node 6 (level 2), which lies next to
        // node 2 (level 1)
        let mut refined = vec![];
        let children = balanced_refine(&mut t, n(10), |p, _| refined.push(p));
        assert_eq!(refined, vec![n(2), n(6), n(10)]);
        assert_eq!(children.len(), 4);
        assert!(t.children(n(10)).eq(children));
        assert_balanced(&t);
    }

    #[test]
    fn test_cascade_3d() {
        let mut t = OcTree::new();
        uniform_refine(&mut t, 1);
        let mut deepest = n(1);
        for _ in 0..4 {
            let children = balanced_refine(&mut t, deepest, |_, _| {});
            deepest = children.get(7).unwrap();
            assert_balanced(&t);
        }
        assert_eq!(node_level(&t, deepest), 5);
    }

    #[test]
    fn test_uniform_refine() {
        let mut t = QuadTree::new();
        uniform_refine(&mut t, 3);
        assert_eq!(t.leaves().count(), 64);
        assert_eq!(t.size(), 1 + 4 + 16 + 64);
        assert!(t.leaves().all(|m| node_level(&t, m) == 3));
        assert!(crate::algorithms::is_dfs_sorted(&t));
        uniform_refine(&mut t, 2);
        assert_eq!(t.size(), 85);
    }
}
