use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnnTreeError {
    /// Tried to remove an element from an empty priority queue.
    #[error("Cannot dequeue from an empty collection")]
    EmptyCollection,

    /// No node in the tree has the requested coordinate.
    #[error("Point not found in tree")]
    NotFound,

    /// A majority vote was requested over zero neighbors, either because the tree is empty or
    /// because `k` is zero.
    #[error("Nearest neighbor search returned no candidates")]
    EmptyResult,

    /// A coordinate value on the given axis cannot be ordered against itself (e.g. NaN).
    #[error("Coordinate on axis {axis} is not totally ordered")]
    UnorderedCoordinate { axis: usize },

    /// A coordinate value on the given axis is infinite.
    #[error("Coordinate on axis {axis} is not finite")]
    NonFiniteCoordinate { axis: usize },

    /// A coordinate with the wrong number of dimensions was provided.
    #[error("Expected a coordinate with {expected} dimensions, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, KnnTreeError>;
