//! Location code stored as a single interleaved Morton index
use super::{decode, dfs_key, encode, max_level};
use crate::traits::{Location, LocationInt};
use crate::types::{ChildPos, Level};
use std::cmp::Ordering;

/// Interleaved location code
///
/// The path from the root to the node is stored in a single unsigned integer: every level
/// occupies `D` bits holding the position in parent of the node at that level, deeper levels in
/// lower bits. The bit above the shallowest level is always set, so the level of the code can be
/// recovered from the number of leading zeros.
///
/// For a node at level 2 of a 2D tree with path `[p1, p2]` the code is `0b1_p1_p2`.
///
/// Codes are ordered depth-first, which is not the numeric order of their values: comparing
/// aligns both paths to the deepest level first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interleaved<const D: usize, T: LocationInt = u64> {
    value: T,
}

impl<const D: usize, T: LocationInt> Default for Interleaved<D, T> {
    fn default() -> Self {
        Self { value: T::one() }
    }
}

impl<const D: usize, T: LocationInt> PartialOrd for Interleaved<D, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const D: usize, T: LocationInt> Ord for Interleaved<D, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        dfs_key::<D, T>(self.value, self.level())
            .cmp(&dfs_key::<D, T>(other.value, other.level()))
    }
}

impl<const D: usize, T: LocationInt> Interleaved<D, T> {
    fn mask() -> T {
        (T::one() << D) - T::one()
    }

    /// Raw value of the code
    pub fn value(&self) -> T {
        self.value
    }
}

impl<const D: usize, T: LocationInt> Location<D> for Interleaved<D, T> {
    type Int = T;

    fn max_level() -> Level {
        max_level::<D, T>()
    }

    fn level(&self) -> Level {
        (T::BITS - 1 - self.value.leading_zeros() as usize) / D
    }

    fn push(&mut self, pos: ChildPos) {
        assert!(
            pos < 1 << D,
            "position in parent {pos} out of bounds [0, {})",
            1 << D
        );
        assert!(
            self.level() < Self::max_level(),
            "location is full: level equals max level {}",
            Self::max_level()
        );
        self.value = (self.value << D) | T::narrow(pos as u128);
    }

    fn pop(&mut self) -> ChildPos {
        assert!(self.level() > 0, "cannot pop the root node from a location");
        let pos = (self.value & Self::mask()).widen() as ChildPos;
        self.value = self.value >> D;
        pos
    }

    fn reverse(&mut self) {
        let mut reversed = Self::default();
        let mut current = *self;
        while current.level() > 0 {
            reversed.push(current.pop());
        }
        *self = reversed;
    }

    fn at(&self, level: Level) -> ChildPos {
        let l = self.level();
        assert!(
            level > 0 && level <= l,
            "level {level} out of bounds [1, {l}]"
        );
        ((self.value >> ((l - level) * D)) & Self::mask()).widen() as ChildPos
    }

    fn coordinates(&self) -> [T; D] {
        decode::<D, T>(self.value, self.level())
    }

    fn from_coordinates(xs: [T; D], level: Level) -> Self {
        assert!(
            level <= Self::max_level(),
            "level {level} out of bounds [0, {}]",
            Self::max_level()
        );
        Self {
            value: encode::<D, T>(&xs, level),
        }
    }

    fn morton_idx(&self) -> T {
        self.value
    }
}
