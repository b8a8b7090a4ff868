//! An implementation of a mutable K-D Tree with bounded k-nearest neighbor search.

#![warn(missing_docs)]

mod index;
mod knn;
mod traversal;

pub use index::KDTree;
pub use knn::Neighbor;
