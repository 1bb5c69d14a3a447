//! Grids stored on a shared tree
//!
//! A [`MultiTree`] stores several grids on a single tree. Every grid is a subset of the tree
//! nodes, usually a layer of leaves, mapped to the indices a solver uses for its data. A
//! [`SolverGrid`] holds the node storage of one of these grids and [`GridTarget`] adapts it with
//! [`crate::amr::Amr`].
mod client;
mod multi;
mod target;

pub use client::{GridNodes, SolverGrid};
pub use multi::MultiTree;
pub use target::GridTarget;
