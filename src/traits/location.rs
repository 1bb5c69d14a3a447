//! Location codes
use crate::types::{ChildPos, Level, Offset};
use num::{PrimInt, Unsigned};
use std::fmt::Debug;
use std::hash::Hash;

/// Unsigned integer type used to store a location code
pub trait LocationInt: PrimInt + Unsigned + Hash + Debug + Default + Send + Sync + 'static {
    /// Number of bits of the integer
    const BITS: usize;

    /// Lossless widening to `u128`
    fn widen(self) -> u128;

    /// Truncating conversion from `u128`
    fn narrow(x: u128) -> Self;
}

macro_rules! location_int {
    ($($t:ty),*) => {
        $(
            impl LocationInt for $t {
                const BITS: usize = <$t>::BITS as usize;

                #[inline]
                fn widen(self) -> u128 {
                    self as u128
                }

                #[inline]
                fn narrow(x: u128) -> Self {
                    x as $t
                }
            }
        )*
    };
}

location_int!(u8, u16, u32, u64, u128);

/// The location of a node within a `D`-dimensional tree
///
/// A location code stores the path from the root node to a node as the sequence of the
/// positions in parent of every node along the path. The root node has level 0 and an empty path.
///
/// Locations are ordered depth-first: a node sorts before its descendants, and two nodes that are
/// not ancestors of each other are ordered by the first position in parent in which their paths
/// differ. This is the order in which a depth-first traversal visiting children in position
/// order reaches them.
pub trait Location<const D: usize>:
    Copy + Clone + Debug + Default + PartialEq + Eq + PartialOrd + Ord + Hash
{
    /// Integer type storing the code
    type Int: LocationInt;

    /// Deepest level a location of this type can encode
    fn max_level() -> Level;

    /// Level of the node
    fn level(&self) -> Level;

    /// Move the location to the child at position `pos` of the current node
    ///
    /// Panics if the node is at `max_level()` or `pos` is not in `[0, 2^D)`.
    fn push(&mut self, pos: ChildPos);

    /// Move the location to the parent of the current node and return the position in parent of
    /// the current node
    ///
    /// Panics if the location is the root.
    fn pop(&mut self) -> ChildPos;

    /// Reverse the order of the positions in parent stored in the location
    ///
    /// Turns a node-to-root path into a root-to-node path and vice versa.
    fn reverse(&mut self);

    /// Position in parent of the ancestor at level `level`, in `1..=self.level()`
    fn at(&self, level: Level) -> ChildPos;

    /// Deinterleaved Morton coordinates of the node, in `[0, 2^level)` along each axis
    fn coordinates(&self) -> [Self::Int; D];

    /// Create the location of the node at `level` with Morton coordinates `xs`
    fn from_coordinates(xs: [Self::Int; D], level: Level) -> Self;

    /// Interleaved Morton index of the node, including the level sentinel bit
    fn morton_idx(&self) -> Self::Int;

    /// The root node
    fn root() -> Self {
        Self::default()
    }

    /// Positions in parent along the path from the root to the node
    fn positions(self) -> impl Iterator<Item = ChildPos> {
        (1..=self.level()).map(move |l| self.at(l))
    }

    /// Create a location from a root-to-node sequence of positions in parent
    fn from_positions<I: IntoIterator<Item = ChildPos>>(positions: I) -> Self {
        let mut loc = Self::root();
        for p in positions {
            loc.push(p);
        }
        loc
    }

    /// Location of the parent node
    fn parent(self) -> Self {
        let mut p = self;
        p.pop();
        p
    }

    /// Location of the child at `pos`
    fn child(self, pos: ChildPos) -> Self {
        let mut c = self;
        c.push(pos);
        c
    }

    /// Translate the location by `offset` nodes at its own level
    ///
    /// Returns `None` if the translated node lies outside the root node.
    fn shift(self, offset: Offset<D>) -> Option<Self> {
        let level = self.level();
        let extent = 1u128 << level;
        let mut xs = self.coordinates();
        for (x, o) in xs.iter_mut().zip(offset.iter()) {
            let shifted = (x.widen() as i128).checked_add(*o as i128)?;
            if shifted < 0 || shifted as u128 >= extent {
                return None;
            }
            *x = Self::Int::narrow(shifted as u128);
        }
        Some(Self::from_coordinates(xs, level))
    }
}
