//! Algorithms operating on a tree
//!
//! All algorithms are free functions taking the tree as first argument. Algorithms that change
//! the topology of the tree take a callback through which the caller keeps its node data
//! consistent with the new topology.
mod balanced_coarsen;
mod balanced_refine;
mod dfs_sort;
mod lookup;
mod neighbors;
mod traversal;

pub use balanced_coarsen::balanced_coarsen;
pub use balanced_refine::{balanced_refine, uniform_refine};
pub use dfs_sort::{dfs_sort, is_dfs_sorted};
pub use lookup::{node_at, node_or_parent_at, NodeAtLevel};
pub use neighbors::{
    all_neighbors, face_neighbor, neighbors_across, node_neighbors, same_level_neighbor,
    AllNeighbors, FaceNeighbors, ManifoldNeighbors,
};
pub use traversal::{node_level, node_location, root_traversal};
