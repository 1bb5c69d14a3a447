//! Adaptive mesh refinement targets
use crate::types::Level;
use std::fmt::Debug;
use std::hash::Hash;

pub trait AmrTarget {
    //! A hierarchical grid that can be adapted by [`crate::amr::Amr`]
    //!
    //! The target exposes its nodes, their levels, siblings and neighbors, and applies the
    //! refinements and coarsenings the AMR algorithm decides on.

    /// The type used to identify a node of the target
    type Node: Copy + Debug + Eq + Ord + Hash;

    /// The nodes the AMR algorithm computes actions for
    fn nodes(&self) -> Vec<Self::Node>;

    /// The nodes of the target sharing the parent of node `n`, including `n`
    fn siblings(&self, n: Self::Node) -> Vec<Self::Node>;

    /// Number of siblings of a complete sibling group
    fn no_siblings(&self) -> usize;

    /// The nodes of the target sharing a face, edge or corner with node `n`
    fn neighbors(&self, n: Self::Node) -> Vec<Self::Node>;

    /// Level of node `n`
    fn level(&self, n: Self::Node) -> Level;

    /// Deepest level of the target: nodes at this level cannot be refined
    fn max_level(&self) -> Level;

    /// Refine node `n`
    ///
    /// Returns whether `n` was refined.
    fn refine(&mut self, n: Self::Node) -> bool;

    /// Replace node `n` and its siblings with their parent
    ///
    /// Returns whether the sibling group was coarsened.
    fn coarsen_siblings_of(&mut self, n: Self::Node) -> bool;
}
