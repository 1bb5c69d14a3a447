//! Parent/child relations of a `D`-dimensional tree
use crate::types::{ChildPos, Level};
use num::Float;

/// Number of children of an internal node
pub const fn no_children(dim: usize) -> usize {
    1 << dim
}

/// Number of children of a node sharing one of its faces of dimension `face_dim`
///
/// E.g. in 3D four children share a face, two share an edge and one shares a corner.
pub const fn no_nodes_sharing_face(face_dim: usize) -> usize {
    1 << face_dim
}

/// Relative position of the child at `pos` with respect to its parent's centre
///
/// Returns `-1` or `1` along each axis.
pub fn relative_child_position<const D: usize>(pos: ChildPos) -> [i64; D] {
    assert!(
        pos < no_children(D),
        "position in parent {pos} out of bounds [0, {})",
        no_children(D)
    );
    std::array::from_fn(|d| if (pos >> d) & 1 == 1 { 1 } else { -1 })
}

/// Position in parent of the child lying on the `signs` side of its parent's centre along each
/// axis
///
/// Inverse of [`relative_child_position`]. Non-negative entries select the positive side.
pub fn child_position<const D: usize>(signs: [i64; D]) -> ChildPos {
    signs
        .iter()
        .enumerate()
        .filter(|(_, s)| **s >= 0)
        .fold(0, |pos, (d, _)| pos | (1 << d))
}

/// Length of a node at `level` relative to the length of the root node
pub fn node_length_at_level<T: Float>(level: Level) -> T {
    let two = T::one() + T::one();
    two.powi(-(level as i32))
}

/// Centroid of the child at `pos` of a node with centroid `x` and length `length`
pub fn child_centroid<T: Float, const D: usize>(x: [T; D], length: T, pos: ChildPos) -> [T; D] {
    let offsets = relative_child_position::<D>(pos);
    let two = T::one() + T::one();
    let quarter = length / (two * two);
    std::array::from_fn(|d| {
        if offsets[d] > 0 {
            x[d] + quarter
        } else {
            x[d] - quarter
        }
    })
}
