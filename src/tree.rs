//! `D`-dimensional 2^D-ary tree
//!
//! The tree stores only its topology, in an arena of nodes addressed by [`NodeIdx`]. Siblings
//! (the children of one node) are stored contiguously in memory in a *sibling group*: group 0
//! holds the root node only, and group `s > 0` holds the nodes `1 + 2^D (s - 1)..1 + 2^D s`.
//! Each node stores the index of its first child and each sibling group stores the index of its
//! parent, so the tree needs `1 + 1 / 2^D` words per node.
//!
//! Coarsening frees a sibling group, leaving a hole in the arena that the next refinement reuses.
//! A tree without holes is *compact*; [`crate::algorithms::dfs_sort`] compacts the arena and
//! sorts it in depth-first order.
pub mod neighbor;
pub mod relations;

use crate::location::Interleaved;
use crate::traits::Location;
use crate::types::{ChildPos, NodeRange, NodeIdx, SiblingsIdx};
use log::debug;
use relations::no_children;
use std::marker::PhantomData;

/// A `D`-dimensional tree whose nodes are located with location codes of type `L`
#[derive(Clone, Debug)]
pub struct Tree<const D: usize, L: Location<D> = Interleaved<D>> {
    /// Parent node of each sibling group
    parents: Vec<Option<NodeIdx>>,
    /// First child of each node
    first_children: Vec<Option<NodeIdx>>,
    /// Number of nodes in use
    size: usize,
    /// All sibling groups before this one are in use
    first_free_sibling_group: SiblingsIdx,
    _location: PhantomData<L>,
}

/// Binary tree
pub type BinaryTree = Tree<1>;
/// Quadtree
pub type QuadTree = Tree<2>;
/// Octree
pub type OcTree = Tree<3>;

impl<const D: usize, L: Location<D>> Default for Tree<D, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize, L: Location<D>> Tree<D, L> {
    /// Number of children of an internal node
    pub const fn no_children() -> usize {
        no_children(D)
    }

    /// Create a tree containing only the root node
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Create a tree containing only the root node, with memory for at least `node_capacity`
    /// nodes
    pub fn with_capacity(node_capacity: usize) -> Self {
        assert!(D > 0, "spatial dimension must be positive");
        let groups = Self::no_sibling_groups(node_capacity.max(1));
        Self {
            parents: vec![None; groups],
            first_children: vec![None; Self::no_nodes(groups)],
            size: 1,
            first_free_sibling_group: SiblingsIdx(1),
            _location: PhantomData,
        }
    }

    /// Number of sibling groups required to hold `no_nodes` nodes
    pub fn no_sibling_groups(no_nodes: usize) -> usize {
        if no_nodes == 0 {
            0
        } else {
            Self::sibling_group(NodeIdx(no_nodes - 1)).0 + 1
        }
    }

    /// Number of nodes held by `no_sibling_groups` sibling groups
    pub fn no_nodes(no_sibling_groups: usize) -> usize {
        match no_sibling_groups {
            0 => 0,
            n => 1 + (n - 1) * Self::no_children(),
        }
    }

    /// Number of nodes in use
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of nodes the arena can hold without growing
    pub fn capacity(&self) -> usize {
        self.first_children.len()
    }

    /// Number of sibling groups the arena can hold without growing
    pub fn sibling_group_capacity(&self) -> usize {
        self.parents.len()
    }

    /// The root node
    pub fn root() -> NodeIdx {
        NodeIdx(0)
    }

    /// Sibling group of node `n`
    pub fn sibling_group(n: NodeIdx) -> SiblingsIdx {
        if n.0 == 0 {
            SiblingsIdx(0)
        } else {
            SiblingsIdx((n.0 - 1) / Self::no_children() + 1)
        }
    }

    /// First node of sibling group `s`
    pub fn first_node(s: SiblingsIdx) -> NodeIdx {
        if s.0 == 0 {
            NodeIdx(0)
        } else {
            NodeIdx(1 + Self::no_children() * (s.0 - 1))
        }
    }

    /// Nodes of sibling group `s`
    pub fn group_nodes(s: SiblingsIdx) -> NodeRange {
        let first = Self::first_node(s);
        if s.0 == 0 {
            NodeRange::new(first, NodeIdx(1))
        } else {
            NodeRange::new(first, NodeIdx(first.0 + Self::no_children()))
        }
    }

    /// Nodes sharing the parent of node `n`, including `n`
    pub fn siblings(n: NodeIdx) -> NodeRange {
        Self::group_nodes(Self::sibling_group(n))
    }

    /// Position of node `n` within its parent
    pub fn position_in_parent(n: NodeIdx) -> ChildPos {
        assert!(n.0 != 0, "the root node has no position in parent");
        (n.0 - 1) % Self::no_children()
    }

    /// Is `n` the root node?
    pub fn is_root(n: NodeIdx) -> bool {
        n.0 == 0
    }

    fn assert_in_bounds(&self, n: NodeIdx) {
        assert!(
            n.0 < self.capacity(),
            "node {n} out of bounds [0, {})",
            self.capacity()
        );
    }

    /// Parent of the nodes in sibling group `s`
    pub fn group_parent(&self, s: SiblingsIdx) -> Option<NodeIdx> {
        assert!(
            s.0 < self.sibling_group_capacity(),
            "sibling group {s} out of bounds [0, {})",
            self.sibling_group_capacity()
        );
        self.parents[s.0]
    }

    /// Parent of node `n` (`None` for the root)
    pub fn parent(&self, n: NodeIdx) -> Option<NodeIdx> {
        self.group_parent(Self::sibling_group(n))
    }

    /// First child of node `n`
    pub fn first_child(&self, n: NodeIdx) -> Option<NodeIdx> {
        self.assert_in_bounds(n);
        self.first_children[n.0]
    }

    /// Child at position `pos` of node `n` (`None` if `n` is a leaf or `pos` is invalid)
    pub fn child(&self, n: NodeIdx, pos: ChildPos) -> Option<NodeIdx> {
        if pos >= Self::no_children() {
            return None;
        }
        self.first_child(n).map(|c| NodeIdx(c.0 + pos))
    }

    /// Children of node `n` in position order (empty if `n` is a leaf)
    pub fn children(&self, n: NodeIdx) -> NodeRange {
        match self.first_child(n) {
            Some(c) => NodeRange::new(c, NodeIdx(c.0 + Self::no_children())),
            None => NodeRange::empty(),
        }
    }

    /// Sibling group of the children of node `n`
    pub fn children_group(&self, n: NodeIdx) -> Option<SiblingsIdx> {
        self.first_child(n).map(Self::sibling_group)
    }

    /// Is `n` a leaf node?
    pub fn is_leaf(&self, n: NodeIdx) -> bool {
        self.first_child(n).is_none()
    }

    /// Does `n` have children?
    pub fn is_internal(&self, n: NodeIdx) -> bool {
        !self.is_leaf(n)
    }

    /// Is sibling group `s` free, i.e. not in use?
    pub fn is_free_group(&self, s: SiblingsIdx) -> bool {
        s.0 != 0 && (s.0 >= self.sibling_group_capacity() || self.parents[s.0].is_none())
    }

    /// Is node `n` free, i.e. not in use?
    pub fn is_free(&self, n: NodeIdx) -> bool {
        self.is_free_group(Self::sibling_group(n))
    }

    /// Is `n` a node in use?
    pub fn contains(&self, n: NodeIdx) -> bool {
        n.0 < self.capacity() && !self.is_free(n)
    }

    /// Sibling groups in use
    pub fn sibling_groups(&self) -> impl Iterator<Item = SiblingsIdx> + '_ {
        (0..self.sibling_group_capacity())
            .map(SiblingsIdx)
            .filter(|s| !self.is_free_group(*s))
    }

    /// All nodes in use
    ///
    /// The tree does not need to be compact.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.sibling_groups().flat_map(Self::group_nodes)
    }

    /// All leaf nodes
    pub fn leaves(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.nodes().filter(|n| self.is_leaf(*n))
    }

    /// Does the arena have no free sibling groups before the last one in use?
    pub fn is_compact(&self) -> bool {
        self.first_free_sibling_group == Self::sibling_group(NodeIdx(self.size))
    }

    /// First free sibling group
    pub fn first_free_sibling_group(&self) -> SiblingsIdx {
        self.first_free_sibling_group
    }

    fn grow(&mut self) {
        let groups = (2 * self.sibling_group_capacity()).max(2);
        debug!(
            "Growing tree arena from {} to {} sibling groups",
            self.sibling_group_capacity(),
            groups
        );
        self.parents.resize(groups, None);
        self.first_children.resize(Self::no_nodes(groups), None);
    }

    fn next_free_group(&self, from: SiblingsIdx) -> SiblingsIdx {
        (from.0..self.sibling_group_capacity())
            .map(SiblingsIdx)
            .find(|s| self.is_free_group(*s))
            .unwrap_or(SiblingsIdx(self.sibling_group_capacity()))
    }

    /// Refine node `n` and return its children
    ///
    /// If `n` already has children the tree is left unchanged and the returned range is empty.
    /// Panics if `n` is not in use.
    pub fn refine(&mut self, n: NodeIdx) -> NodeRange {
        assert!(self.contains(n), "node {n} is free and cannot be refined");
        if self.is_internal(n) {
            return NodeRange::empty();
        }
        if self.first_free_sibling_group.0 >= self.sibling_group_capacity() {
            self.grow();
        }
        let s = self.first_free_sibling_group;
        debug_assert!(self.is_free_group(s), "first free sibling group {s} in use");

        self.parents[s.0] = Some(n);
        self.first_children[n.0] = Some(Self::first_node(s));
        self.size += Self::no_children();
        self.first_free_sibling_group = self.next_free_group(SiblingsIdx(s.0 + 1));

        Self::group_nodes(s)
    }

    /// Coarsen node `n`, freeing its children
    ///
    /// Panics if `n` is a leaf or any of its children has children.
    pub fn coarsen(&mut self, n: NodeIdx) {
        assert!(self.contains(n), "node {n} is free and cannot be coarsened");
        let cg = self
            .children_group(n)
            .unwrap_or_else(|| panic!("node {n} is a leaf and cannot be coarsened"));
        assert!(
            self.children(n).all(|c| self.is_leaf(c)),
            "node {n} has children with children and cannot be coarsened"
        );

        self.parents[cg.0] = None;
        self.first_children[n.0] = None;
        self.size -= Self::no_children();
        if cg < self.first_free_sibling_group {
            self.first_free_sibling_group = cg;
        }
    }

    /// Swap the memory locations of sibling groups `a` and `b`
    ///
    /// Moves every node of `a` to the same position in `b` and vice versa, updating all parent
    /// and children links. Panics if either group is the root's group or if `a == b`.
    pub fn swap(&mut self, a: SiblingsIdx, b: SiblingsIdx) {
        assert!(a.0 != 0 && b.0 != 0, "the root sibling group cannot be swapped");
        assert!(a != b, "cannot swap sibling group {a} with itself");
        assert!(
            a.0 < self.sibling_group_capacity() && b.0 < self.sibling_group_capacity(),
            "sibling groups ({a}, {b}) out of bounds [1, {})",
            self.sibling_group_capacity()
        );
        if self.is_free_group(a) && self.is_free_group(b) {
            return;
        }

        // Children links of the swapped nodes
        for (l, r) in Self::group_nodes(a).zip(Self::group_nodes(b)) {
            self.first_children.swap(l.0, r.0);
            for m in [l, r] {
                if let Some(cg) = self.children_group(m) {
                    self.parents[cg.0] = Some(m);
                }
            }
        }

        // Parent links of the swapped groups
        let (p_a, p_b) = (self.parents[a.0], self.parents[b.0]);
        for (p, s) in [(p_a, b), (p_b, a)] {
            if let Some(p) = p {
                self.first_children[p.0] = Some(Self::first_node(s));
            }
            self.parents[s.0] = p;
        }

        if !self.is_free_group(self.first_free_sibling_group) {
            self.first_free_sibling_group = self.next_free_group(self.first_free_sibling_group);
        }
        for s in [a, b] {
            if self.is_free_group(s) && s < self.first_free_sibling_group {
                self.first_free_sibling_group = s;
            }
        }
    }

    /// Rebuild a tree from the parent of every sibling group, in arena order
    ///
    /// `parents[0]` must be `None` (the root's group). Returns `None` if the links do not
    /// describe a tree.
    pub(crate) fn from_group_parents(parents: Vec<Option<NodeIdx>>) -> Option<Self> {
        if parents.first().copied().flatten().is_some() {
            return None;
        }
        let groups = parents.len().max(1);
        let mut tree = Self::with_capacity(Self::no_nodes(groups));
        for (s, p) in parents.iter().enumerate().skip(1) {
            if let Some(p) = *p {
                if p.0 >= tree.capacity() || tree.first_children[p.0].is_some() {
                    return None;
                }
                tree.parents[s] = Some(p);
                tree.first_children[p.0] = Some(Self::first_node(SiblingsIdx(s)));
                tree.size += Self::no_children();
            }
        }
        // Every group in use must hang from the root
        for s in tree.sibling_groups() {
            let mut current = s;
            let mut steps = 0;
            while current.0 != 0 {
                match tree.parents[current.0] {
                    Some(p) if steps < groups && !tree.is_free(p) => {
                        current = Self::sibling_group(p);
                        steps += 1;
                    }
                    _ => return None,
                }
            }
        }
        tree.first_free_sibling_group = tree.next_free_group(SiblingsIdx(1));
        Some(tree)
    }
}

/// Graph equality: two trees are equal if their parent/children graphs are the same
impl<const D: usize, L: Location<D>> PartialEq for Tree<D, L> {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self.nodes().zip(other.nodes()).all(|(a, b)| {
                self.parent(a) == other.parent(b) && self.children(a) == other.children(b)
            })
    }
}

impl<const D: usize, L: Location<D>> Eq for Tree<D, L> {}
