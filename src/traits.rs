//! Trait definitions

mod amr;
mod location;

pub use amr::AmrTarget;
pub use location::{Location, LocationInt};
