//! Multiple grids stored on one tree
use crate::algorithms::{
    all_neighbors, balanced_coarsen, balanced_refine, dfs_sort, is_dfs_sorted, node_level,
    AllNeighbors,
};
use crate::location::Interleaved;
use crate::traits::Location;
use crate::tree::Tree;
use crate::types::{GridIdx, GridNodeIdx, Level, NodeIdx, NodeRange};

/// A tree storing several grids
///
/// Every node of the tree can be part of any number of grids. For every grid the tree stores
/// the index of the node within that grid's storage (see [`crate::grid::SolverGrid`]).
///
/// Refining or coarsening the tree never adds or removes grid nodes: the grids decide which of
/// the new nodes they use.
#[derive(Clone, Debug)]
pub struct MultiTree<const D: usize, L: Location<D> = Interleaved<D>> {
    tree: Tree<D, L>,
    no_grids: usize,
    /// Grid node of every (tree node, grid) pair, one row of `no_grids` entries per tree node
    grid_nodes: Vec<Option<GridNodeIdx>>,
}

impl<const D: usize, L: Location<D>> MultiTree<D, L> {
    /// Create a tree containing only the root node, and storing `no_grids` grids
    pub fn new(no_grids: usize) -> Self {
        Self::with_capacity(1, no_grids)
    }

    /// Create a tree containing only the root node, with memory for at least `node_capacity`
    /// nodes, and storing `no_grids` grids
    pub fn with_capacity(node_capacity: usize, no_grids: usize) -> Self {
        Self::from_tree(Tree::with_capacity(node_capacity), no_grids)
    }

    /// Store `no_grids` empty grids on an existing tree
    pub fn from_tree(tree: Tree<D, L>, no_grids: usize) -> Self {
        assert!(no_grids > 0, "a multi-tree stores at least one grid");
        let grid_nodes = vec![None; tree.capacity() * no_grids];
        Self {
            tree,
            no_grids,
            grid_nodes,
        }
    }

    /// Create a multi-tree from a tree and its grid node table (one row per arena slot)
    pub(crate) fn from_parts(
        tree: Tree<D, L>,
        no_grids: usize,
        mut grid_nodes: Vec<Option<GridNodeIdx>>,
    ) -> Self {
        assert!(no_grids > 0, "a multi-tree stores at least one grid");
        grid_nodes.resize(tree.capacity() * no_grids, None);
        Self {
            tree,
            no_grids,
            grid_nodes,
        }
    }

    /// The tree
    pub fn tree(&self) -> &Tree<D, L> {
        &self.tree
    }

    /// Number of grids
    pub fn no_grids(&self) -> usize {
        self.no_grids
    }

    /// All grids
    pub fn grids(&self) -> impl Iterator<Item = GridIdx> {
        (0..self.no_grids).map(GridIdx)
    }

    fn assert_grid_in_bounds(&self, g: GridIdx) {
        assert!(
            g.0 < self.no_grids,
            "grid {g} out of bounds [0, {})",
            self.no_grids
        );
    }

    fn assert_in_use(&self, n: NodeIdx) {
        assert!(self.tree.contains(n), "node {n} is not in use");
    }

    fn row(&self, n: NodeIdx) -> &[Option<GridNodeIdx>] {
        self.assert_in_use(n);
        &self.grid_nodes[n.0 * self.no_grids..(n.0 + 1) * self.no_grids]
    }

    /// Grid node of tree node `n` in grid `g`
    pub fn node(&self, n: NodeIdx, g: GridIdx) -> Option<GridNodeIdx> {
        self.assert_grid_in_bounds(g);
        self.row(n)[g.0]
    }

    /// Set the grid node of tree node `n` in grid `g`
    pub fn set_node(&mut self, n: NodeIdx, g: GridIdx, grid_node: Option<GridNodeIdx>) {
        self.assert_grid_in_bounds(g);
        self.assert_in_use(n);
        self.grid_nodes[n.0 * self.no_grids + g.0] = grid_node;
    }

    /// Is tree node `n` part of grid `g`?
    pub fn in_grid(&self, n: NodeIdx, g: GridIdx) -> bool {
        self.node(n, g).is_some()
    }

    /// Tree nodes that are part of grid `g`
    pub fn nodes(&self, g: GridIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.assert_grid_in_bounds(g);
        self.tree.nodes().filter(move |n| self.in_grid(*n, g))
    }

    /// Grid nodes of tree node `n` in every grid
    pub fn grid_nodes(&self, n: NodeIdx) -> impl Iterator<Item = Option<GridNodeIdx>> + '_ {
        self.row(n).iter().copied()
    }

    /// Does tree node `n` belong to any grid?
    pub fn in_any_grid(&self, n: NodeIdx) -> bool {
        self.row(n).iter().any(Option::is_some)
    }

    /// Children of tree node `n` that are part of grid `g`
    pub fn children(&self, n: NodeIdx, g: GridIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.assert_grid_in_bounds(g);
        self.tree.children(n).filter(move |c| self.in_grid(*c, g))
    }

    /// Siblings of tree node `n`, including `n`, that are part of grid `g`
    pub fn siblings(&self, n: NodeIdx, g: GridIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.assert_grid_in_bounds(g);
        self.assert_in_use(n);
        Tree::<D, L>::siblings(n).filter(move |s| self.in_grid(*s, g))
    }

    /// Number of siblings of a complete sibling group
    pub fn no_siblings() -> usize {
        Tree::<D, L>::no_children()
    }

    /// Neighbors of tree node `n` across all manifolds that are part of grid `g`
    pub fn neighbors(&self, n: NodeIdx, g: GridIdx) -> AllNeighbors {
        self.assert_grid_in_bounds(g);
        self.assert_in_use(n);
        all_neighbors(&self.tree, n, |m| self.in_grid(m, g))
    }

    /// Level of tree node `n`
    pub fn level(&self, n: NodeIdx) -> Level {
        node_level(&self.tree, n)
    }

    fn fit_grid_nodes(&mut self) {
        self.grid_nodes
            .resize(self.tree.capacity() * self.no_grids, None);
    }

    /// Refine tree node `n`, keeping the tree 2:1 balanced, and return its children
    ///
    /// If `n` already has children they are returned and the tree is left unchanged.
    pub fn refine(&mut self, n: NodeIdx) -> NodeRange {
        self.refine_with(n, |_, _| {})
    }

    /// Refine tree node `n` as [`MultiTree::refine`] does, calling `projection(parent, children)`
    /// after every refinement of the tree
    pub fn refine_with<P: FnMut(NodeIdx, NodeRange)>(
        &mut self,
        n: NodeIdx,
        projection: P,
    ) -> NodeRange {
        self.assert_in_use(n);
        if self.tree.is_internal(n) {
            return self.tree.children(n);
        }
        let children = balanced_refine(&mut self.tree, n, projection);
        self.fit_grid_nodes();
        children
    }

    /// Coarsen tree node `n` if none of its children is part of a grid and the tree stays 2:1
    /// balanced
    ///
    /// Returns whether the node was coarsened.
    pub fn try_coarsen(&mut self, n: NodeIdx) -> bool {
        self.assert_in_use(n);
        if self.tree.children(n).any(|c| self.in_any_grid(c)) {
            return false;
        }
        balanced_coarsen(&mut self.tree, n, |_, _| {})
    }

    /// Remove tree node `n` from grid `g`
    ///
    /// If afterwards no sibling of `n` is part of any grid, the parent of `n` is coarsened (see
    /// [`MultiTree::try_coarsen`]). Returns the parent of `n`.
    pub fn remove(&mut self, n: NodeIdx, g: GridIdx) -> Option<NodeIdx> {
        assert!(
            self.in_grid(n, g),
            "node {n} is not part of grid {g} and cannot be removed"
        );
        self.set_node(n, g, None);
        let parent = self.tree.parent(n);
        if let Some(p) = parent {
            if self.tree.is_leaf(n) && !self.tree.children(p).any(|s| self.in_any_grid(s)) {
                self.try_coarsen(p);
            }
        }
        parent
    }

    /// Sort the tree in depth-first order, moving the grid nodes along with the tree nodes
    pub fn sort(&mut self) {
        let no_grids = self.no_grids;
        let grid_nodes = &mut self.grid_nodes;
        dfs_sort(&mut self.tree, |a, b| {
            for g in 0..no_grids {
                grid_nodes.swap(a.0 * no_grids + g, b.0 * no_grids + g);
            }
        });
    }

    /// Is the tree sorted in depth-first order?
    pub fn is_sorted(&self) -> bool {
        is_dfs_sorted(&self.tree)
    }
}

/// Two multi-trees are equal if their trees are equal and their nodes belong to the same grids
impl<const D: usize, L: Location<D>> PartialEq for MultiTree<D, L> {
    fn eq(&self, other: &Self) -> bool {
        self.no_grids == other.no_grids
            && self.tree == other.tree
            && self
                .tree
                .nodes()
                .zip(other.tree.nodes())
                .all(|(a, b)| self.row(a) == other.row(b))
    }
}
