//! Geometry of the nodes of a tree
//!
//! The tree only stores topology. A [`Domain`] places the root node in space as a cube, which
//! gives every node, identified by its location code, a bounding box.
use crate::algorithms::{node_location, node_or_parent_at};
use crate::traits::{Location, LocationInt};
use crate::tree::relations::node_length_at_level;
use crate::tree::Tree;
use crate::types::{Level, NodeIdx};
use num::{Float, Zero};

/// Integer coordinate as a float
fn as_float<T: Float>(x: u128) -> T {
    T::from(x).unwrap_or_else(T::infinity)
}

/// An axis-aligned box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds<T: Float, const D: usize> {
    /// Lower corner
    pub min: [T; D],
    /// Upper corner
    pub max: [T; D],
}

impl<T: Float, const D: usize> Bounds<T, D> {
    /// Centre of the box
    pub fn centroid(&self) -> [T; D] {
        let two = T::one() + T::one();
        std::array::from_fn(|d| (self.min[d] + self.max[d]) / two)
    }

    /// Extent of the box along `axis`
    pub fn length(&self, axis: usize) -> T {
        self.max[axis] - self.min[axis]
    }

    /// Does the closed box contain `point`?
    pub fn contains(&self, point: &[T; D]) -> bool {
        (0..D).all(|d| self.min[d] <= point[d] && point[d] <= self.max[d])
    }
}

/// The cube covered by the root node of a tree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain<T: Float, const D: usize> {
    origin: [T; D],
    length: T,
}

impl<T: Float, const D: usize> Domain<T, D> {
    /// Create the cube with lower corner `origin` and side length `length`
    pub fn new(origin: [T; D], length: T) -> Self {
        assert!(length > T::zero(), "domain length must be positive");
        Self { origin, length }
    }

    /// The unit cube `[0, 1]^D`
    pub fn unit() -> Self {
        Self::new([T::zero(); D], T::one())
    }

    /// Lower corner of the domain
    pub fn origin(&self) -> [T; D] {
        self.origin
    }

    /// Side length of the domain
    pub fn length(&self) -> T {
        self.length
    }

    /// Bounds of the whole domain
    pub fn bounds_of_domain(&self) -> Bounds<T, D> {
        Bounds {
            min: self.origin,
            max: self.origin.map(|x| x + self.length),
        }
    }

    /// Side length of a node at `level`
    pub fn node_length(&self, level: Level) -> T {
        self.length * node_length_at_level::<T>(level)
    }

    /// Bounding box of the node at `loc`
    pub fn bounds<L: Location<D>>(&self, loc: &L) -> Bounds<T, D> {
        let length = self.node_length(loc.level());
        let xs = loc.coordinates();
        let min: [T; D] =
            std::array::from_fn(|d| self.origin[d] + as_float::<T>(xs[d].widen()) * length);
        Bounds {
            min,
            max: min.map(|x| x + length),
        }
    }

    /// Centre of the node at `loc`
    pub fn centroid<L: Location<D>>(&self, loc: &L) -> [T; D] {
        self.bounds(loc).centroid()
    }

    /// Bounding box of node `n` of `tree`
    pub fn node_bounds<L: Location<D>>(&self, tree: &Tree<D, L>, n: NodeIdx) -> Bounds<T, D> {
        self.bounds(&node_location(tree, n))
    }

    /// Location of the node at `level` containing `point`
    ///
    /// Points on the upper boundary of the domain belong to the last node along each axis.
    /// Returns `None` if the point lies outside the domain.
    pub fn location<L: Location<D>>(&self, point: &[T; D], level: Level) -> Option<L> {
        if level > L::max_level() || !self.bounds_of_domain().contains(point) {
            return None;
        }
        let extent = 1u128 << level;
        let scale = as_float::<T>(extent);
        let mut xs = [L::Int::zero(); D];
        for (x, (p, o)) in xs.iter_mut().zip(point.iter().zip(self.origin.iter())) {
            let relative = (*p - *o) / self.length * scale;
            let i = num::cast::<T, u128>(relative.floor())?.min(extent - 1);
            *x = L::Int::narrow(i);
        }
        Some(L::from_coordinates(xs, level))
    }

    /// Deepest node of `tree` containing `point`
    ///
    /// Returns `None` if the point lies outside the domain.
    pub fn leaf_at<L: Location<D>>(&self, tree: &Tree<D, L>, point: &[T; D]) -> Option<NodeIdx> {
        let loc: L = self.location(point, L::max_level())?;
        Some(node_or_parent_at(tree, loc).idx)
    }
}
