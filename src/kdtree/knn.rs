use std::collections::BTreeMap;

use geo_traits::CoordTrait;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::debug;

use crate::distance::{DistanceMetric, EuclideanDistance};
use crate::error::{KnnTreeError, Result};
use crate::kdtree::traversal::nearest;
use crate::kdtree::KDTree;
use crate::r#type::{IndexableNum, Point};

/// A point found by a nearest neighbor search.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a, N: IndexableNum, const D: usize, V> {
    /// The stored point
    pub point: &'a Point<N, D>,
    /// The value stored for this point
    pub value: &'a V,
    /// Distance from the query point
    pub distance: f64,
}

impl<N: IndexableNum, const D: usize, V> KDTree<N, D, V> {
    /// Find the `k` points nearest to `query` by Euclidean distance, in ascending order of
    /// distance.
    ///
    /// Fewer than `k` neighbors are returned if the tree holds fewer than `k` points.
    pub fn neighbors(&self, query: &Point<N, D>, k: usize) -> Vec<Neighbor<'_, N, D, V>> {
        self.neighbors_with_distance(query, k, &EuclideanDistance)
    }

    /// Find the `k` points nearest to `query` under the given metric, in ascending order of
    /// distance.
    ///
    /// Points at equal distance are returned in the order the search reached them.
    pub fn neighbors_with_distance(
        &self,
        query: &Point<N, D>,
        k: usize,
        metric: &impl DistanceMetric<N>,
    ) -> Vec<Neighbor<'_, N, D, V>> {
        nearest(self, query, k, metric)
            .into_sorted_vec()
            .into_iter()
            .map(|(idx, distance)| {
                let node = &self.nodes[idx];
                Neighbor {
                    point: &node.key,
                    value: &node.value,
                    distance,
                }
            })
            .collect()
    }

    /// Classify `query` by majority vote among the values of its `k` nearest points by
    /// Euclidean distance.
    ///
    /// When several values are equally frequent, the smallest by [`Ord`] wins. Returns
    /// [`KnnTreeError::EmptyResult`] if there is nothing to vote over, i.e. the tree is empty
    /// or `k` is zero.
    pub fn knn_value(&self, query: &Point<N, D>, k: usize) -> Result<V>
    where
        V: Ord + Clone,
    {
        self.knn_value_with_distance(query, k, &EuclideanDistance)
    }

    /// Classify `query` by majority vote among the values of its `k` nearest points under the
    /// given metric.
    ///
    /// See [`knn_value`][Self::knn_value] for tie-breaking and errors.
    pub fn knn_value_with_distance(
        &self,
        query: &Point<N, D>,
        k: usize,
        metric: &impl DistanceMetric<N>,
    ) -> Result<V>
    where
        V: Ord + Clone,
    {
        let queue = nearest(self, query, k, metric);
        most_common(queue.iter().map(|(&idx, _)| &self.nodes[idx].value))
            .cloned()
            .ok_or_else(empty_vote)
    }

    /// Classify `query` by majority vote for values that have no ordering.
    ///
    /// When several values are equally frequent, the one belonging to the nearest point wins.
    pub fn knn_value_unordered(&self, query: &Point<N, D>, k: usize) -> Result<V>
    where
        V: PartialEq + Clone,
    {
        let queue = nearest(self, query, k, &EuclideanDistance);
        first_most_common(queue.iter().map(|(&idx, _)| &self.nodes[idx].value))
            .cloned()
            .ok_or_else(empty_vote)
    }

    /// Classify a query given as any [`CoordTrait`] implementation.
    ///
    /// Fails with [`KnnTreeError::DimensionMismatch`] if the coordinate does not have exactly
    /// `D` dimensions.
    pub fn knn_value_coord(&self, coord: &impl CoordTrait<T = N>, k: usize) -> Result<V>
    where
        V: Ord + Clone,
    {
        let query = Point::try_from_coord(coord)?;
        self.knn_value(&query, k)
    }

    /// Classify many queries at once. The result at each position corresponds to the query at
    /// the same position.
    ///
    /// With the `rayon` feature enabled the queries are spread across the rayon thread pool.
    pub fn knn_values(&self, queries: &[Point<N, D>], k: usize) -> Vec<Result<V>>
    where
        V: Ord + Clone + Send + Sync,
    {
        #[cfg(feature = "rayon")]
        let results = queries
            .par_iter()
            .map(|query| self.knn_value(query, k))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let results = queries
            .iter()
            .map(|query| self.knn_value(query, k))
            .collect();

        results
    }
}

fn empty_vote() -> KnnTreeError {
    debug!("majority vote attempted over zero neighbors");
    KnnTreeError::EmptyResult
}

/// The most frequent value, with ties going to the smallest.
pub(crate) fn most_common<'a, V: Ord + 'a>(
    values: impl IntoIterator<Item = &'a V>,
) -> Option<&'a V> {
    let mut counts: BTreeMap<&V, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&V, usize)> = None;
    // BTreeMap iterates in ascending order, so only a strictly larger count replaces the best
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// The most frequent value, with ties going to the first one seen.
pub(crate) fn first_most_common<'a, V: PartialEq + 'a>(
    values: impl IntoIterator<Item = &'a V>,
) -> Option<&'a V> {
    let mut counts: Vec<(&V, usize)> = vec![];
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&V, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
