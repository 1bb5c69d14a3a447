//! Adaptive mesh refinement of the leaves of a tree
use crate::algorithms::{all_neighbors, balanced_coarsen, balanced_refine, node_level};
use crate::location::Interleaved;
use crate::traits::{AmrTarget, Location};
use crate::tree::Tree;
use crate::types::{Level, NodeIdx, NodeRange};

type Transfer<'a> = Box<dyn FnMut(NodeIdx, NodeRange) + 'a>;

/// Adapts the leaves of a tree
///
/// Refinements are 2:1 balanced. Coarsening a sibling group is skipped (with a warning) if it
/// would break the balance.
pub struct TreeTarget<'a, const D: usize, L: Location<D> = Interleaved<D>> {
    tree: &'a mut Tree<D, L>,
    projection: Transfer<'a>,
    restriction: Transfer<'a>,
}

impl<'a, const D: usize, L: Location<D>> TreeTarget<'a, D, L> {
    /// Create a target for the leaves of `tree`
    pub fn new(tree: &'a mut Tree<D, L>) -> Self {
        Self {
            tree,
            projection: Box::new(|_, _| {}),
            restriction: Box::new(|_, _| {}),
        }
    }

    /// Call `projection(parent, children)` after every refinement, including the cascaded ones
    pub fn with_projection<P: FnMut(NodeIdx, NodeRange) + 'a>(mut self, projection: P) -> Self {
        self.projection = Box::new(projection);
        self
    }

    /// Call `restriction(parent, children)` before every coarsening
    pub fn with_restriction<R: FnMut(NodeIdx, NodeRange) + 'a>(mut self, restriction: R) -> Self {
        self.restriction = Box::new(restriction);
        self
    }

    /// The tree
    pub fn tree(&self) -> &Tree<D, L> {
        &*self.tree
    }
}

impl<const D: usize, L: Location<D>> AmrTarget for TreeTarget<'_, D, L> {
    type Node = NodeIdx;

    fn nodes(&self) -> Vec<NodeIdx> {
        self.tree.leaves().collect()
    }

    fn siblings(&self, n: NodeIdx) -> Vec<NodeIdx> {
        if Tree::<D, L>::is_root(n) {
            return vec![n];
        }
        Tree::<D, L>::siblings(n)
            .filter(|s| self.tree.is_leaf(*s))
            .collect()
    }

    fn no_siblings(&self) -> usize {
        Tree::<D, L>::no_children()
    }

    fn neighbors(&self, n: NodeIdx) -> Vec<NodeIdx> {
        all_neighbors(&*self.tree, n, |m| self.tree.is_leaf(m)).to_vec()
    }

    fn level(&self, n: NodeIdx) -> Level {
        node_level(&*self.tree, n)
    }

    fn max_level(&self) -> Level {
        L::max_level()
    }

    fn refine(&mut self, n: NodeIdx) -> bool {
        let projection = &mut self.projection;
        !balanced_refine(&mut *self.tree, n, |p, c| projection(p, c)).is_empty()
    }

    fn coarsen_siblings_of(&mut self, n: NodeIdx) -> bool {
        let Some(parent) = self.tree.parent(n) else {
            return false;
        };
        let restriction = &mut self.restriction;
        balanced_coarsen(&mut *self.tree, parent, |p, c| restriction(p, c))
    }
}
