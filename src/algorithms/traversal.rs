//! Root traversal and the node queries built on it
use crate::traits::Location;
use crate::tree::Tree;
use crate::types::{Level, NodeIdx};

/// Walk from node `n` towards the root, calling `f` on every visited node
///
/// The walk stops when `f` returns `false` or after visiting the root. Returns the last node
/// visited.
pub fn root_traversal<const D: usize, L: Location<D>, F: FnMut(NodeIdx) -> bool>(
    tree: &Tree<D, L>,
    n: NodeIdx,
    mut f: F,
) -> NodeIdx {
    let mut current = n;
    while f(current) {
        match tree.parent(current) {
            Some(p) => current = p,
            None => break,
        }
    }
    current
}

/// Level of node `n`: number of ancestors between `n` and the root
pub fn node_level<const D: usize, L: Location<D>>(tree: &Tree<D, L>, n: NodeIdx) -> Level {
    let mut level = 0;
    root_traversal(tree, n, |m| {
        if Tree::<D, L>::is_root(m) {
            false
        } else {
            level += 1;
            true
        }
    });
    level
}

/// Location code of node `n`
pub fn node_location<const D: usize, L: Location<D>>(tree: &Tree<D, L>, n: NodeIdx) -> L {
    let mut loc = L::root();
    root_traversal(tree, n, |m| {
        if Tree::<D, L>::is_root(m) {
            false
        } else {
            loc.push(Tree::<D, L>::position_in_parent(m));
            true
        }
    });
    loc.reverse();
    loc
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::location::Deinterleaved;
    use crate::tree::BinaryTree;

    #[test]
    fn test_root_traversal() {
        let mut t = BinaryTree::new();
        t.refine(NodeIdx(0));
        t.refine(NodeIdx(2));
        t.refine(NodeIdx(4));
        let mut visited = vec![];
        let last = root_traversal(&t, NodeIdx(5), |m| {
            visited.push(m);
            true
        });
        assert_eq!(last, NodeIdx(0));
        assert_eq!(visited, vec![NodeIdx(5), NodeIdx(4), NodeIdx(2), NodeIdx(0)]);

        let last = root_traversal(&t, NodeIdx(5), |m| m != NodeIdx(2));
        assert_eq!(last, NodeIdx(2));
    }

    #[test]
    fn test_level_and_location() {
        let mut t = BinaryTree::new();
        t.refine(NodeIdx(0));
        t.refine(NodeIdx(2));
        t.refine(NodeIdx(3));
        assert_eq!(node_level(&t, NodeIdx(0)), 0);
        assert_eq!(node_level(&t, NodeIdx(2)), 1);
        assert_eq!(node_level(&t, NodeIdx(6)), 3);
        let loc = node_location(&t, NodeIdx(6));
        assert_eq!(loc.positions().collect::<Vec<_>>(), vec![1, 0, 1]);
        assert_eq!(loc.level(), 3);
        assert_eq!(node_location(&t, NodeIdx(0)).level(), 0);
    }

    #[test]
    fn test_deinterleaved_location() {
        let mut t = Tree::<2, Deinterleaved<2>>::new();
        t.refine(NodeIdx(0));
        t.refine(NodeIdx(4));
        let loc = node_location(&t, NodeIdx(7));
        assert_eq!(loc.positions().collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(loc.coordinates(), [0b10, 0b11]);
    }
}
