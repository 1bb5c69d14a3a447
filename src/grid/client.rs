//! Node storage of a single grid
use super::multi::MultiTree;
use crate::traits::Location;
use crate::types::{GridIdx, GridNodeIdx, Level, NodeIdx};
use smallvec::SmallVec;
use std::ops::RangeInclusive;

/// Grid nodes of a sibling group
pub type GridNodes = SmallVec<[GridNodeIdx; 8]>;

/// Storage of one of the grids of a [`MultiTree`]
///
/// Maps every grid node to its tree node; the tree maps its nodes back. Removing grid nodes
/// leaves free slots in the storage that later insertions reuse, and [`SolverGrid::sort`]
/// makes the storage contiguous again.
///
/// The grid does not own the tree, so every operation that needs it takes the tree as an
/// argument.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverGrid {
    idx: GridIdx,
    /// Tree node of each grid node (`None` for free slots)
    tree_nodes: Vec<Option<NodeIdx>>,
    size: usize,
    /// First free slot (`tree_nodes.len()` if there is none)
    first_free: usize,
}

impl SolverGrid {
    /// Create an empty grid stored as grid `idx` of its tree
    pub fn new(idx: GridIdx) -> Self {
        Self::with_capacity(idx, 0)
    }

    /// Create an empty grid with memory for `capacity` nodes
    pub fn with_capacity(idx: GridIdx, capacity: usize) -> Self {
        Self {
            idx,
            tree_nodes: Vec::with_capacity(capacity),
            size: 0,
            first_free: 0,
        }
    }

    /// Rebuild the storage of grid `idx` from the grid nodes stored in `tree`
    pub fn from_tree<const D: usize, L: Location<D>>(tree: &MultiTree<D, L>, idx: GridIdx) -> Self {
        let mut grid = Self::new(idx);
        for n in tree.nodes(idx) {
            if let Some(gn) = tree.node(n, idx) {
                if gn.0 >= grid.tree_nodes.len() {
                    grid.tree_nodes.resize(gn.0 + 1, None);
                }
                assert!(
                    grid.tree_nodes[gn.0].is_none(),
                    "grid node {gn} of grid {idx} is stored in more than one tree node"
                );
                grid.tree_nodes[gn.0] = Some(n);
                grid.size += 1;
            }
        }
        grid.first_free = grid.next_free(0);
        grid
    }

    /// Index of the grid within its tree
    pub fn idx(&self) -> GridIdx {
        self.idx
    }

    /// Number of grid nodes in use
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of slots of the storage
    pub fn capacity(&self) -> usize {
        self.tree_nodes.len()
    }

    /// Is the slot of grid node `gn` free?
    pub fn is_free(&self, gn: GridNodeIdx) -> bool {
        self.tree_nodes.get(gn.0).map_or(true, Option::is_none)
    }

    /// Tree node of grid node `gn`
    pub fn tree_node(&self, gn: GridNodeIdx) -> NodeIdx {
        self.tree_nodes
            .get(gn.0)
            .copied()
            .flatten()
            .unwrap_or_else(|| panic!("node {gn} of grid {} is not in use", self.idx))
    }

    /// Grid nodes in use
    pub fn in_use(&self) -> impl Iterator<Item = GridNodeIdx> + '_ {
        self.tree_nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| GridNodeIdx(i))
    }

    /// Are the grid nodes in use stored contiguously from the first slot on?
    pub fn is_compact(&self) -> bool {
        self.tree_nodes[..self.size].iter().all(Option::is_some)
    }

    /// Levels of the grid nodes, from the coarsest to the finest
    pub fn levels<const D: usize, L: Location<D>>(
        &self,
        tree: &MultiTree<D, L>,
    ) -> Option<RangeInclusive<Level>> {
        let levels = self.in_use().map(|gn| self.level(tree, gn));
        let (min, max) = levels.fold(None, |acc: Option<(Level, Level)>, l| match acc {
            None => Some((l, l)),
            Some((min, max)) => Some((min.min(l), max.max(l))),
        })?;
        Some(min..=max)
    }

    /// First free slot at or after `from`
    fn next_free(&self, from: usize) -> usize {
        self.tree_nodes[from..]
            .iter()
            .position(Option::is_none)
            .map_or(self.tree_nodes.len(), |i| from + i)
    }

    /// Take the first free slot, growing the storage if there is none
    fn free_node(&mut self) -> GridNodeIdx {
        let gn = self.first_free;
        if gn == self.tree_nodes.len() {
            self.tree_nodes.push(None);
        }
        self.first_free = self.next_free(gn + 1);
        GridNodeIdx(gn)
    }

    /// Add tree node `n` to the grid and return its grid node
    pub fn push<const D: usize, L: Location<D>>(
        &mut self,
        tree: &mut MultiTree<D, L>,
        n: NodeIdx,
    ) -> GridNodeIdx {
        if let Some(gn) = tree.node(n, self.idx) {
            panic!("tree node {n} is already node {gn} of grid {}", self.idx);
        }
        let gn = self.free_node();
        self.tree_nodes[gn.0] = Some(n);
        tree.set_node(n, self.idx, Some(gn));
        self.size += 1;
        gn
    }

    /// Remove grid node `gn` from the grid
    ///
    /// The tree may coarsen the parent of the removed node (see [`MultiTree::remove`]).
    pub fn pop<const D: usize, L: Location<D>>(
        &mut self,
        tree: &mut MultiTree<D, L>,
        gn: GridNodeIdx,
    ) {
        let n = self.tree_node(gn);
        assert_eq!(
            tree.node(n, self.idx),
            Some(gn),
            "link from tree node {n} to node {gn} of grid {} is broken",
            self.idx
        );
        self.tree_nodes[gn.0] = None;
        self.size -= 1;
        self.first_free = self.first_free.min(gn.0);
        tree.remove(n, self.idx);
    }

    /// Swap the storage slots of grid nodes `i` and `j`, either of which can be free
    pub fn swap<const D: usize, L: Location<D>>(
        &mut self,
        tree: &mut MultiTree<D, L>,
        i: GridNodeIdx,
        j: GridNodeIdx,
    ) {
        let capacity = i.0.max(j.0) + 1;
        if capacity > self.tree_nodes.len() {
            self.tree_nodes.resize(capacity, None);
        }
        self.tree_nodes.swap(i.0, j.0);
        for gn in [i, j] {
            match self.tree_nodes[gn.0] {
                Some(n) => tree.set_node(n, self.idx, Some(gn)),
                None => self.first_free = self.first_free.min(gn.0),
            }
        }
        self.first_free = self.next_free(self.first_free);
    }

    /// Level of grid node `gn`
    pub fn level<const D: usize, L: Location<D>>(
        &self,
        tree: &MultiTree<D, L>,
        gn: GridNodeIdx,
    ) -> Level {
        tree.level(self.tree_node(gn))
    }

    /// Grid nodes sharing the parent of grid node `gn`, including `gn`
    pub fn siblings<const D: usize, L: Location<D>>(
        &self,
        tree: &MultiTree<D, L>,
        gn: GridNodeIdx,
    ) -> GridNodes {
        let n = self.tree_node(gn);
        tree.siblings(n, self.idx)
            .filter_map(|m| tree.node(m, self.idx))
            .collect()
    }

    /// Grid nodes sharing a face, edge or corner with grid node `gn`
    pub fn neighbors<const D: usize, L: Location<D>>(
        &self,
        tree: &MultiTree<D, L>,
        gn: GridNodeIdx,
    ) -> Vec<GridNodeIdx> {
        let n = self.tree_node(gn);
        tree.neighbors(n, self.idx)
            .into_iter()
            .filter_map(|m| tree.node(m, self.idx))
            .collect()
    }

    /// Replace grid node `gn` with grid nodes for the children of its tree node
    ///
    /// The tree node is refined if it is a leaf. `projection(parent, children)` is called after
    /// the children are added and before the parent is removed. Returns the new grid nodes in
    /// position order.
    pub fn refine<const D: usize, L: Location<D>, P: FnMut(GridNodeIdx, &[GridNodeIdx])>(
        &mut self,
        tree: &mut MultiTree<D, L>,
        gn: GridNodeIdx,
        mut projection: P,
    ) -> GridNodes {
        let n = self.tree_node(gn);
        let children = tree.refine(n);
        assert!(
            !children.is_empty(),
            "cannot refine node {gn} of grid {}: tree node {n} cannot be refined",
            self.idx
        );
        let new: GridNodes = children.map(|c| self.push(tree, c)).collect();
        projection(gn, &new);
        self.pop(tree, gn);
        new
    }

    /// Replace grid node `gn` and its siblings with a grid node for their parent
    ///
    /// `restriction(parent, children)` is called after the parent is added and before the
    /// children are removed. Returns the new grid node.
    pub fn coarsen<const D: usize, L: Location<D>, R: FnMut(GridNodeIdx, &[GridNodeIdx])>(
        &mut self,
        tree: &mut MultiTree<D, L>,
        gn: GridNodeIdx,
        mut restriction: R,
    ) -> GridNodeIdx {
        let n = self.tree_node(gn);
        let parent = tree
            .tree()
            .parent(n)
            .unwrap_or_else(|| panic!("node {gn} of grid {} is the root node", self.idx));
        let old = self.siblings(tree, gn);
        let new = self.push(tree, parent);
        restriction(new, &old);
        for c in old {
            self.pop(tree, c);
        }
        new
    }

    /// Sort the grid nodes in the order of their tree nodes, calling `data_swap(a, b)` every
    /// time the slots of two grid nodes are exchanged
    ///
    /// Afterwards the storage is compact. Sort the tree first to store the grid nodes in
    /// depth-first order.
    pub fn sort<const D: usize, L: Location<D>, F: FnMut(GridNodeIdx, GridNodeIdx)>(
        &mut self,
        tree: &mut MultiTree<D, L>,
        mut data_swap: F,
    ) {
        let nodes: Vec<NodeIdx> = tree.nodes(self.idx).collect();
        for (i, n) in nodes.into_iter().enumerate() {
            let target = GridNodeIdx(i);
            let current = self.grid_node_of(tree, n);
            if current != target {
                data_swap(target, current);
                self.swap(tree, target, current);
            }
        }
        self.tree_nodes.truncate(self.size);
        self.first_free = self.size;
        debug_assert!(self.is_compact(), "grid {} is not compact", self.idx);
    }

    fn grid_node_of<const D: usize, L: Location<D>>(
        &self,
        tree: &MultiTree<D, L>,
        n: NodeIdx,
    ) -> GridNodeIdx {
        tree.node(n, self.idx)
            .unwrap_or_else(|| panic!("tree node {n} is not part of grid {}", self.idx))
    }
}
