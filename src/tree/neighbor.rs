//! Neighbor stencils
//!
//! Same-level neighbors of a node are described by offsets in units of the node length. A node
//! in `D` dimensions has neighbors across manifolds of rank `1..=D`: rank 1 neighbors share a
//! face (dimension `D - 1`), rank 2 neighbors an edge (dimension `D - 2`) and rank 3 neighbors a
//! corner.
//!
//! ```text
//! 2D faces        2D corners
//!       3          2     3
//!    0  *  1          *
//!       2          0     1
//! ```
use crate::tree::relations::no_children;
use crate::types::{ChildPos, Offset};
use itertools::Itertools;
use smallvec::SmallVec;

/// Same-level neighbor offsets of one manifold
///
/// Large enough for the 12 edge neighbors of a 3D node.
pub type Offsets<const D: usize> = SmallVec<[Offset<D>; 12]>;

/// Set of neighbors across faces of dimension `D - rank`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Manifold<const D: usize> {
    rank: usize,
}

impl<const D: usize> Manifold<D> {
    /// Create the neighbor manifold of rank `rank`, in `1..=D`
    pub fn new(rank: usize) -> Self {
        assert!(
            rank > 0 && rank <= D,
            "neighbor manifold rank {rank} out of bounds [1, {D}]"
        );
        Self { rank }
    }

    /// Neighbors sharing a face
    pub fn faces() -> Self {
        Self::new(1)
    }

    /// Neighbors sharing an edge
    pub fn edges() -> Self {
        Self::new(2)
    }

    /// Neighbors sharing a corner
    pub fn corners() -> Self {
        Self::new(3)
    }

    /// All neighbor manifolds of a `D`-dimensional node
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=D).map(Self::new)
    }

    /// Rank of the manifold
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Spatial dimension of the faces shared with the neighbors
    pub fn face_dimension(&self) -> usize {
        D - self.rank
    }

    /// Number of same-level neighbors
    pub fn size(&self) -> usize {
        binomial(D, self.rank) << self.rank
    }

    /// Maximum number of neighbors one level below the node
    pub fn no_child_level_neighbors(&self) -> usize {
        self.size() << self.face_dimension()
    }

    /// Same-level neighbor offsets
    ///
    /// Axes vary slowest and the negative side comes first: the 2D face offsets are
    /// `[-1, 0]`, `[1, 0]`, `[0, -1]`, `[0, 1]`.
    pub fn offsets(&self) -> Offsets<D> {
        let mut offsets = Offsets::<D>::new();
        for axes in (0..D).combinations(self.rank) {
            for signs in 0..(1usize << self.rank) {
                let mut o = [0; D];
                for (i, d) in axes.iter().enumerate() {
                    o[*d] = if (signs >> i) & 1 == 1 { 1 } else { -1 };
                }
                offsets.push(o);
            }
        }
        offsets
    }
}

/// Maximum number of neighbors one level below a node across all manifolds
pub fn max_no_neighbors(dim: usize) -> usize {
    (1..=dim)
        .map(|rank| (binomial(dim, rank) << rank) << (dim - rank))
        .sum()
}

fn binomial(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Positions in parent of the children of the neighbor at `offset` that touch the node
pub fn children_sharing_face<const D: usize>(offset: &Offset<D>) -> SmallVec<[ChildPos; 8]> {
    (0..no_children(D))
        .filter(|c| {
            offset
                .iter()
                .enumerate()
                .all(|(d, o)| *o == 0 || ((c >> d) & 1 == 1) == (*o < 0))
        })
        .collect()
}

/// Offset under which a node is seen by its neighbor at `offset`
pub fn opposite<const D: usize>(offset: &Offset<D>) -> Offset<D> {
    offset.map(|o| -o)
}
