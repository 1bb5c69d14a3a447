//! Adaptive mesh refinement
//!
//! Refinement indicators vote an [`Action`] for every node of an [`crate::traits::AmrTarget`].
//! [`Amr`] combines the votes, makes them 2:1 balanced and applies them to the target.
mod action;
mod state;
mod target;

pub use action::{combine, combine_all, Action};
pub use state::{Amr, AmrOptions, AmrSummary};
pub use target::TreeTarget;
