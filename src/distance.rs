//! Distance metrics for nearest neighbor queries.
//!
//! All metrics measure in `f64` regardless of the coordinate type. The k-d tree prunes a subtree
//! when the gap between the query and the splitting plane on the node's axis is no smaller than
//! the current k-th best distance, so a metric is only valid for tree search if
//! [`DistanceMetric::axis_distance`] never exceeds [`DistanceMetric::distance`] for the same
//! pair of points. This holds for every Minkowski metric provided here.

use crate::r#type::{IndexableNum, Point};

/// A trait for calculating distances between points.
pub trait DistanceMetric<N: IndexableNum> {
    /// Distance between two points.
    fn distance<const D: usize>(&self, a: &Point<N, D>, b: &Point<N, D>) -> f64;

    /// Distance between two points that differ only on a single axis. Used as a lower bound of
    /// [`DistanceMetric::distance`] for any point on the far side of a splitting plane.
    #[inline]
    fn axis_distance(&self, a: N, b: N) -> f64 {
        a.abs_diff_f64(b)
    }
}

/// Euclidean (L2) distance metric.
///
/// This is the standard straight-line distance and the default metric for every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl<N: IndexableNum> DistanceMetric<N> for EuclideanDistance {
    #[inline]
    fn distance<const D: usize>(&self, a: &Point<N, D>, b: &Point<N, D>) -> f64 {
        a.coords()
            .iter()
            .zip(b.coords())
            .map(|(&x, &y)| {
                let d = x.abs_diff_f64(y);
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// Manhattan (L1) distance metric: the sum of absolute axis differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanDistance;

impl<N: IndexableNum> DistanceMetric<N> for ManhattanDistance {
    #[inline]
    fn distance<const D: usize>(&self, a: &Point<N, D>, b: &Point<N, D>) -> f64 {
        a.coords()
            .iter()
            .zip(b.coords())
            .map(|(&x, &y)| x.abs_diff_f64(y))
            .sum()
    }
}

/// Chebyshev (L∞) distance metric: the largest absolute axis difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChebyshevDistance;

impl<N: IndexableNum> DistanceMetric<N> for ChebyshevDistance {
    #[inline]
    fn distance<const D: usize>(&self, a: &Point<N, D>, b: &Point<N, D>) -> f64 {
        a.coords()
            .iter()
            .zip(b.coords())
            .map(|(&x, &y)| x.abs_diff_f64(y))
            .fold(0.0, f64::max)
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance<N: IndexableNum, const D: usize>(a: &Point<N, D>, b: &Point<N, D>) -> f64 {
    EuclideanDistance.distance(a, b)
}
