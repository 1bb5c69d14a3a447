//! Location codes of tree nodes
mod deinterleaved;
mod interleaved;

pub use deinterleaved::Deinterleaved;
pub use interleaved::Interleaved;

use crate::traits::{Location, LocationInt};
use crate::types::{Level, Offset};

/// Translate the location `loc` by `offset` nodes at its own level
///
/// Returns `None` if the translated node lies outside of the root node.
pub fn shift<const D: usize, L: Location<D>>(loc: L, offset: Offset<D>) -> Option<L> {
    loc.shift(offset)
}

/// Deepest level that a location stored in an integer of type `T` can encode in `D` dimensions
///
/// One bit of the integer is reserved for the level sentinel.
pub(crate) fn max_level<const D: usize, T: LocationInt>() -> Level {
    assert!(D > 0, "spatial dimension must be positive");
    (T::BITS - 1) / D
}

/// Interleave the lowest `level` bits of the Morton coordinates `xs`, and mark the level with
/// a sentinel bit
pub(crate) fn encode<const D: usize, T: LocationInt>(xs: &[T; D], level: Level) -> T {
    let mut value = T::one() << (level * D);
    for k in 0..level {
        for (d, x) in xs.iter().enumerate() {
            if (*x >> k) & T::one() == T::one() {
                value = value | (T::one() << (k * D + d));
            }
        }
    }
    value
}

/// Key ordering the node with Morton index `value` at `level` depth-first
///
/// The path below the sentinel bit is aligned to the deepest level, so that the first position
/// in parent in which two paths differ decides the order. An ancestor has the same aligned path
/// as its first descendants and sorts before them by its lower level.
pub(crate) fn dfs_key<const D: usize, T: LocationInt>(value: T, level: Level) -> (T, Level) {
    let path = value ^ (T::one() << (level * D));
    (path << ((max_level::<D, T>() - level) * D), level)
}

/// Deinterleave the Morton index `value` of a node at `level` into Morton coordinates
pub(crate) fn decode<const D: usize, T: LocationInt>(value: T, level: Level) -> [T; D] {
    let mut xs = [T::zero(); D];
    for k in 0..level {
        for (d, x) in xs.iter_mut().enumerate() {
            if (value >> (k * D + d)) & T::one() == T::one() {
                *x = *x | (T::one() << k);
            }
        }
    }
    xs
}

#[cfg(test)]
mod test {
    use super::*;
    use paste::paste;

    #[test]
    fn test_max_level() {
        assert_eq!(max_level::<1, u64>(), 63);
        assert_eq!(max_level::<2, u64>(), 31);
        assert_eq!(max_level::<3, u64>(), 21);
        assert_eq!(max_level::<3, u32>(), 10);
    }

    #[test]
    fn test_encode() {
        // x = 0b10, y = 0b01 at level 2: interleaved y0x0y1x1 below the sentinel
        let v = encode::<2, u64>(&[0b10, 0b01], 2);
        assert_eq!(v, 0b1_0110);
        assert_eq!(decode::<2, u64>(v, 2), [0b10, 0b01]);
        assert_eq!(encode::<3, u32>(&[0, 0, 0], 0), 1);
    }

    macro_rules! shift_test {
        ($dim:literal, $loc:ident) => {
            paste! {
                #[test]
                fn [<test_shift_ $loc:lower _ $dim d>]() {
                    let root = $loc::<$dim>::root();
                    assert_eq!(shift(root, [0; $dim]), Some(root));
                    assert_eq!(shift(root, [1; $dim]), None);

                    let first = $loc::<$dim>::from_positions([0, 0]);
                    let last = $loc::<$dim>::from_positions([(1 << $dim) - 1, (1 << $dim) - 1]);
                    assert_eq!(shift(first, [3; $dim]), Some(last));
                    assert_eq!(shift(last, [-3; $dim]), Some(first));
                    assert_eq!(shift(first, [-1; $dim]), None);
                    assert_eq!(shift(last, [1; $dim]), None);
                    assert_eq!(shift(first, [4; $dim]), None);
                }
            }
        };
    }

    shift_test!(1, Interleaved);
    shift_test!(2, Interleaved);
    shift_test!(3, Interleaved);
    shift_test!(1, Deinterleaved);
    shift_test!(2, Deinterleaved);
    shift_test!(3, Deinterleaved);

    #[test]
    fn test_shift_across_parents() {
        // In 2D, child 1 of child 0 is at (1, 0); one step along x lands in child 0 of child 1.
        let loc = Interleaved::<2>::from_positions([0, 1]);
        assert_eq!(loc.coordinates(), [1, 0]);
        let n = shift(loc, [1, 0]).unwrap();
        assert_eq!(n.positions().collect::<Vec<_>>(), vec![1, 0]);
        let n = shift(loc, [0, 1]).unwrap();
        assert_eq!(n.positions().collect::<Vec<_>>(), vec![0, 3]);
    }
}
