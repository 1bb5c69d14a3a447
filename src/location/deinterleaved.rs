//! Location code stored as per-axis Morton coordinates
use super::{dfs_key, encode, max_level};
use crate::traits::{Location, LocationInt};
use crate::types::{ChildPos, Level};
use std::cmp::Ordering;

/// Deinterleaved location code
///
/// Stores the Morton coordinate of the node along each axis together with the level of the node.
/// Bit `k` of the coordinate along axis `d` is bit `d` of the position in parent of the ancestor
/// at level `level - k`. Requires `D + 1` words of storage, but shifting a location does not need
/// to decode it first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Deinterleaved<const D: usize, T: LocationInt = u64> {
    xs: [T; D],
    level: Level,
}

impl<const D: usize, T: LocationInt> Default for Deinterleaved<D, T> {
    fn default() -> Self {
        Self {
            xs: [T::zero(); D],
            level: 0,
        }
    }
}

impl<const D: usize, T: LocationInt> PartialOrd for Deinterleaved<D, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const D: usize, T: LocationInt> Ord for Deinterleaved<D, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        dfs_key::<D, T>(self.morton_idx(), self.level)
            .cmp(&dfs_key::<D, T>(other.morton_idx(), other.level))
    }
}

impl<const D: usize, T: LocationInt> Location<D> for Deinterleaved<D, T> {
    type Int = T;

    fn max_level() -> Level {
        max_level::<D, T>()
    }

    fn level(&self) -> Level {
        self.level
    }

    fn push(&mut self, pos: ChildPos) {
        assert!(
            pos < 1 << D,
            "position in parent {pos} out of bounds [0, {})",
            1 << D
        );
        assert!(
            self.level < Self::max_level(),
            "location is full: level equals max level {}",
            Self::max_level()
        );
        for (d, x) in self.xs.iter_mut().enumerate() {
            *x = (*x << 1) | T::narrow(((pos >> d) & 1) as u128);
        }
        self.level += 1;
    }

    fn pop(&mut self) -> ChildPos {
        assert!(self.level > 0, "cannot pop the root node from a location");
        let mut pos = 0;
        for (d, x) in self.xs.iter_mut().enumerate() {
            if *x & T::one() == T::one() {
                pos |= 1 << d;
            }
            *x = *x >> 1;
        }
        self.level -= 1;
        pos
    }

    fn reverse(&mut self) {
        for x in self.xs.iter_mut() {
            let mut r = T::zero();
            for k in 0..self.level {
                if (*x >> k) & T::one() == T::one() {
                    r = r | (T::one() << (self.level - 1 - k));
                }
            }
            *x = r;
        }
    }

    fn at(&self, level: Level) -> ChildPos {
        assert!(
            level > 0 && level <= self.level,
            "level {level} out of bounds [1, {}]",
            self.level
        );
        let k = self.level - level;
        self.xs
            .iter()
            .enumerate()
            .filter(|(_, x)| (**x >> k) & T::one() == T::one())
            .fold(0, |pos, (d, _)| pos | (1 << d))
    }

    fn coordinates(&self) -> [T; D] {
        self.xs
    }

    fn from_coordinates(xs: [T; D], level: Level) -> Self {
        assert!(
            level <= Self::max_level(),
            "level {level} out of bounds [0, {}]",
            Self::max_level()
        );
        Self { xs, level }
    }

    fn morton_idx(&self) -> T {
        encode::<D, T>(&self.xs, self.level)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::location::Interleaved;
    use itertools::Itertools;

    #[test]
    fn test_push_pop() {
        let mut loc = Deinterleaved::<3>::root();
        loc.push(5);
        loc.push(2);
        assert_eq!(loc.level(), 2);
        assert_eq!(loc.coordinates(), [0b10, 0b01, 0b10]);
        assert_eq!(loc.at(1), 5);
        assert_eq!(loc.at(2), 2);
        assert_eq!(loc.pop(), 2);
        assert_eq!(loc.pop(), 5);
        assert_eq!(loc, Deinterleaved::root());
    }

    #[test]
    fn test_reverse() {
        let mut loc = Deinterleaved::<2, u32>::from_positions([3, 0, 2, 1]);
        loc.reverse();
        assert_eq!(loc.positions().collect_vec(), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_matches_interleaved() {
        for path in (0..3).map(|_| 0..8usize).multi_cartesian_product() {
            let d = Deinterleaved::<3>::from_positions(path.iter().copied());
            let i = Interleaved::<3>::from_positions(path.iter().copied());
            assert_eq!(d.morton_idx(), i.morton_idx());
            assert_eq!(d.coordinates(), i.coordinates());
            assert_eq!(d.level(), i.level());
        }
    }

    #[test]
    fn test_ordering_matches_interleaved() {
        let paths = [vec![0, 3], vec![1], vec![2, 2], vec![3, 0, 1], vec![0, 0]];
        let mut d = paths
            .iter()
            .map(|p| Deinterleaved::<2>::from_positions(p.iter().copied()))
            .collect_vec();
        let mut i = paths
            .iter()
            .map(|p| Interleaved::<2>::from_positions(p.iter().copied()))
            .collect_vec();
        d.sort();
        i.sort();
        for (a, b) in d.iter().zip(i.iter()) {
            assert_eq!(a.positions().collect_vec(), b.positions().collect_vec());
        }
    }
}
