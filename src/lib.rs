//! Hierarchical 2^D-ary trees for adaptive mesh refinement
//!
//! A [`tree::Tree`] stores the topology of a binary tree (1D), quadtree (2D) or octree (3D) in an
//! index arena. Nodes are addressed by [`types::NodeIdx`] and identified spatially by location
//! codes ([`location::Interleaved`], [`location::Deinterleaved`]). The [`algorithms`] operate on
//! the arena: level and location queries, neighbor search and 2:1 balanced refinement.
//! A [`grid::MultiTree`] lets several grids share one tree, and [`amr`] combines refinement
//! indicators into refine/coarsen decisions applied through an [`traits::AmrTarget`].
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod algorithms;
pub mod amr;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod location;
pub mod traits;
pub mod tree;
pub mod types;
