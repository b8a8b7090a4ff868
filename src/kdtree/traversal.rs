//! Bounded nearest neighbor traversal of the KDTree.

use tinyvec::TinyVec;
use tracing::trace;

use crate::bpq::BoundedPriorityQueue;
use crate::distance::DistanceMetric;
use crate::kdtree::KDTree;
use crate::r#type::{IndexableNum, Point};

/// Collect the indices of the `k` nodes nearest to `query` into a bounded queue, keyed by their
/// distance under `metric`.
///
/// The traversal visits the subtree on the query's side of each splitting plane first. Only once
/// that whole subtree has been searched does it decide whether the other side can still hold a
/// closer point: it is skipped when the queue is full and the query's gap to the plane is not
/// strictly smaller than the current k-th best distance.
///
/// An explicit stack replaces recursion so that degenerate trees don't exhaust the call stack.
/// Each entry is `(node, far_pending)`: with `far_pending == false` the node itself is visited,
/// with `true` its far child is considered.
pub(crate) fn nearest<N, const D: usize, V, M>(
    tree: &KDTree<N, D, V>,
    query: &Point<N, D>,
    k: usize,
    metric: &M,
) -> BoundedPriorityQueue<usize>
where
    N: IndexableNum,
    M: DistanceMetric<N>,
{
    let mut queue = BoundedPriorityQueue::new(k);
    let root = match tree.root() {
        Some(root) if k > 0 => root,
        _ => return queue,
    };

    // Use TinyVec to avoid heap allocations for reasonably shallow trees
    let mut stack: TinyVec<[(usize, bool); 64]> = TinyVec::new();
    stack.push((root, false));

    let mut visited = 0usize;
    let mut pruned = 0usize;

    while let Some((idx, far_pending)) = stack.pop() {
        let node = &tree.nodes[idx];
        let (near, far) = if node.goes_left(query) {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if far_pending {
            if let Some(far) = far {
                let axis = node.axis();
                let gap = metric.axis_distance(node.key[axis], query[axis]);
                if !queue.is_full() || gap < queue.worst() {
                    stack.push((far, false));
                } else {
                    pruned += 1;
                }
            }
            continue;
        }

        visited += 1;
        queue.enqueue(idx, metric.distance(&node.key, query));

        // Note: pushed in reverse of the order they are popped
        stack.push((idx, true));
        if let Some(near) = near {
            stack.push((near, false));
        }
    }

    trace!(k, visited, pruned, "nearest neighbor traversal finished");
    queue
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::distance::EuclideanDistance;

    #[test]
    fn prunes_far_side_of_split() {
        let mut tree = KDTree::new();
        tree.insert(Point::new([0.0]), 'a');
        tree.insert(Point::new([10.0]), 'b');
        tree.insert(Point::new([-10.0]), 'c');

        let queue = nearest(&tree, &Point::new([1.0]), 1, &EuclideanDistance);
        let found: Vec<_> = queue.into_sorted_vec();
        assert_eq!(found, vec![(0, 1.0)]);
    }

    #[test]
    fn zero_k_visits_nothing() {
        let mut tree = KDTree::new();
        tree.insert(Point::new([0.0, 0.0]), ());
        let queue = nearest(&tree, &Point::new([1.0, 1.0]), 0, &EuclideanDistance);
        assert!(queue.is_empty());
        assert_eq!(queue.max_size(), 0);
    }

    #[test]
    fn visits_whole_tree_when_k_exceeds_size() {
        let tree: KDTree<i32, 2, usize> = (0..20)
            .map(|i| (Point::new([i * 7 % 11, i * 3 % 5]), i as usize))
            .collect();
        let queue = nearest(&tree, &Point::new([4, 2]), 100, &EuclideanDistance);
        assert_eq!(queue.len(), tree.len());
    }
}
