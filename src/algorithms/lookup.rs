//! Finding nodes from their location
use crate::traits::Location;
use crate::tree::Tree;
use crate::types::{Level, NodeIdx};

/// A node together with its level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeAtLevel {
    /// Node index
    pub idx: NodeIdx,
    /// Level of the node
    pub level: Level,
}

/// Node at location `loc`, if the tree is refined down to it
pub fn node_at<const D: usize, L: Location<D>>(tree: &Tree<D, L>, loc: L) -> Option<NodeIdx> {
    let mut n = Tree::<D, L>::root();
    for pos in loc.positions() {
        n = tree.child(n, pos)?;
    }
    Some(n)
}

/// Deepest existing node on the path from the root to location `loc`
///
/// Returns the node at `loc` if it exists, otherwise the leaf enclosing it.
pub fn node_or_parent_at<const D: usize, L: Location<D>>(tree: &Tree<D, L>, loc: L) -> NodeAtLevel {
    let mut found = NodeAtLevel {
        idx: Tree::<D, L>::root(),
        level: 0,
    };
    for pos in loc.positions() {
        match tree.child(found.idx, pos) {
            Some(c) => {
                found.idx = c;
                found.level += 1;
            }
            None => break,
        }
    }
    found
}
