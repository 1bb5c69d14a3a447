//! General type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub usize);

        impl $name {
            /// The underlying index
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(i: usize) -> Self {
                Self(i)
            }
        }

        impl From<$name> for usize {
            fn from(i: $name) -> Self {
                i.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_type!(
    /// Index of a node within a tree arena
    NodeIdx
);
index_type!(
    /// Index of a group of siblings within a tree arena
    ///
    /// Group 0 only contains the root node.
    SiblingsIdx
);
index_type!(
    /// Index of a grid stored within a multi-grid tree
    GridIdx
);
index_type!(
    /// Index of a node within the storage of a single grid
    GridNodeIdx
);

/// Position of a child within its parent, in `[0, 2^D)`
pub type ChildPos = usize;

/// Distance from the root node (the root is at level 0)
pub type Level = usize;

/// Signed per-axis displacement, in units of node lengths at a given level
pub type Offset<const D: usize> = [i64; D];

/// A contiguous range of tree nodes, e.g. the children of a node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeRange {
    start: usize,
    end: usize,
}

impl NodeRange {
    /// Create a range `[start, end)`
    pub fn new(start: NodeIdx, end: NodeIdx) -> Self {
        assert!(start <= end, "invalid node range [{start}, {end})");
        Self {
            start: start.0,
            end: end.0,
        }
    }

    /// The empty range
    pub fn empty() -> Self {
        Self { start: 0, end: 0 }
    }

    /// First node in the range
    pub fn first(&self) -> Option<NodeIdx> {
        if self.start < self.end {
            Some(NodeIdx(self.start))
        } else {
            None
        }
    }

    /// Node at offset `i` within the range
    pub fn get(&self, i: usize) -> Option<NodeIdx> {
        if self.start + i < self.end {
            Some(NodeIdx(self.start + i))
        } else {
            None
        }
    }

    /// Does the range contain node `n`?
    pub fn contains(&self, n: NodeIdx) -> bool {
        self.start <= n.0 && n.0 < self.end
    }

    /// Number of nodes left in the range
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Is the range empty?
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Iterator for NodeRange {
    type Item = NodeIdx;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            self.start += 1;
            Some(NodeIdx(self.start - 1))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for NodeRange {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            self.end -= 1;
            Some(NodeIdx(self.end))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for NodeRange {}

/// Generic error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The tree arena has free sibling groups before its last group in use
    #[error("Tree is not compact: sort the tree before writing it")]
    NotCompact,
    /// The tree arena is not in depth-first order
    #[error("Tree is not sorted in depth-first order")]
    NotSorted,
    /// A persisted tree was written for a different spatial dimension
    #[error("Spatial dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimension of the tree type being read
        expected: usize,
        /// Dimension stored in the file
        found: usize,
    },
    /// The persisted data does not describe a valid tree
    #[error("Corrupted tree data: {0}")]
    Corrupted(String),
    /// Underlying reader/writer failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
