#![doc = include_str!("../README.md")]

pub mod bpq;
pub mod distance;
mod error;
pub mod kdtree;
mod r#type;

pub use error::KnnTreeError;
pub use r#type::{IndexableNum, Point};
