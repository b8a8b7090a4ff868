use std::mem;
use std::ops::Index;

use tracing::debug;

use crate::error::{KnnTreeError, Result};
use crate::r#type::{IndexableNum, Point};

/// A single point stored in the tree.
///
/// The splitting axis of a node is `level % D`, where `level` is the depth at which the node was
/// created. It is stored once and never changes, even though nothing is ever removed.
#[derive(Debug, Clone)]
pub(crate) struct Node<N: IndexableNum, const D: usize, V> {
    pub(crate) key: Point<N, D>,
    pub(crate) value: V,
    pub(crate) level: usize,

    /// Keys that compared less than `key` on this node's axis
    pub(crate) left: Option<usize>,
    /// Keys that compared greater than or equal to `key` on this node's axis
    pub(crate) right: Option<usize>,
}

impl<N: IndexableNum, const D: usize, V> Node<N, D, V> {
    /// The axis this node splits its children over.
    #[inline]
    pub(crate) fn axis(&self) -> usize {
        self.level % D
    }

    /// Whether `point` belongs in the left subtree of this node.
    #[inline]
    pub(crate) fn goes_left(&self, point: &Point<N, D>) -> bool {
        let axis = self.axis();
        point[axis] < self.key[axis]
    }
}

/// Where a descent from the root for a given point ended.
enum Descent {
    /// A node with exactly this key exists
    Found(usize),
    /// No such node; a new one would hang off `parent` at depth `level`
    Vacant {
        parent: Option<(usize, bool)>,
        level: usize,
    },
}

/// A k-d tree mapping `D`-dimensional points to values, built by insertion.
///
/// The shape of the tree is fully determined by insertion order; it is never rebalanced. Nodes
/// are held in a flat arena and refer to their children by index, so cloning produces a fully
/// independent copy and dropping never recurses, no matter how degenerate the tree is.
///
/// ```
/// use knn_tree::kdtree::KDTree;
/// use knn_tree::Point;
///
/// let mut tree = KDTree::new();
/// tree.insert(Point::new([0., 0.]), "A");
/// tree.insert(Point::new([2., 2.]), "B");
/// tree.insert(Point::new([0., 3.]), "A");
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.knn_value(&Point::new([0., 1.]), 2).unwrap(), "A");
/// ```
#[derive(Debug, Clone)]
pub struct KDTree<N: IndexableNum, const D: usize, V> {
    /// Node arena. The root, if any, is always at index 0.
    pub(crate) nodes: Vec<Node<N, D, V>>,
}

impl<N: IndexableNum, const D: usize, V> KDTree<N, D, V> {
    const VALID_DIMENSION: () = assert!(D > 0, "KDTree dimension must be at least 1");

    /// Create an empty tree.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty tree with room for `capacity` points before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_DIMENSION;
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// The number of dimensions of every point in this tree.
    #[inline]
    pub const fn dimension(&self) -> usize {
        D
    }

    /// The number of distinct points in this tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of levels in the tree, or 0 if it is empty.
    ///
    /// A tree built from points sorted on every axis degenerates into a list and has a height
    /// equal to its length.
    pub fn height(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| node.level + 1)
            .max()
            .unwrap_or(0)
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Returns `true` if a point with exactly these coordinates is stored in the tree.
    pub fn contains(&self, point: &Point<N, D>) -> bool {
        matches!(self.descend(point), Descent::Found(_))
    }

    /// Insert a point with its value.
    ///
    /// If the point is already present its value is replaced in place and the old value is
    /// returned; the size of the tree is unchanged.
    pub fn insert(&mut self, point: Point<N, D>, value: V) -> Option<V> {
        match self.descend(&point) {
            Descent::Found(idx) => {
                let node = &mut self.nodes[idx];
                debug!(level = node.level, "overwriting value of existing point");
                Some(mem::replace(&mut node.value, value))
            }
            Descent::Vacant { parent, level } => {
                self.attach(point, value, parent, level);
                None
            }
        }
    }

    /// Access the value stored for `point`.
    ///
    /// Returns [`KnnTreeError::NotFound`] if the point is not in the tree.
    pub fn get(&self, point: &Point<N, D>) -> Result<&V> {
        match self.descend(point) {
            Descent::Found(idx) => Ok(&self.nodes[idx].value),
            Descent::Vacant { .. } => Err(KnnTreeError::NotFound),
        }
    }

    /// Mutably access the value stored for `point`.
    ///
    /// Returns [`KnnTreeError::NotFound`] if the point is not in the tree.
    pub fn get_mut(&mut self, point: &Point<N, D>) -> Result<&mut V> {
        match self.descend(point) {
            Descent::Found(idx) => Ok(&mut self.nodes[idx].value),
            Descent::Vacant { .. } => Err(KnnTreeError::NotFound),
        }
    }

    /// Mutably access the value stored for `point`, first inserting it with a default value if
    /// it is not in the tree yet.
    ///
    /// Unlike [`get_mut`][Self::get_mut] this is not a pure lookup: a missing point grows the
    /// tree by one node.
    pub fn get_or_insert_default(&mut self, point: Point<N, D>) -> &mut V
    where
        V: Default,
    {
        let idx = match self.descend(&point) {
            Descent::Found(idx) => idx,
            Descent::Vacant { parent, level } => self.attach(point, V::default(), parent, level),
        };
        &mut self.nodes[idx].value
    }

    /// Iterate over all points and their values, in the order the points were first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&Point<N, D>, &V)> + '_ {
        self.nodes.iter().map(|node| (&node.key, &node.value))
    }

    /// Remove every point from the tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Walk from the root towards `point`, going right whenever the point is greater than or
    /// equal to the node key on the node's axis.
    fn descend(&self, point: &Point<N, D>) -> Descent {
        let mut current = self.root();
        let mut parent = None;
        let mut level = 0;

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.key == *point {
                return Descent::Found(idx);
            }

            let left = node.goes_left(point);
            parent = Some((idx, left));
            current = if left { node.left } else { node.right };
            level += 1;
        }

        Descent::Vacant { parent, level }
    }

    /// Push a new node and link it into its parent, returning its index.
    fn attach(
        &mut self,
        key: Point<N, D>,
        value: V,
        parent: Option<(usize, bool)>,
        level: usize,
    ) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            key,
            value,
            level,
            left: None,
            right: None,
        });

        if let Some((parent_idx, left)) = parent {
            let parent = &mut self.nodes[parent_idx];
            if left {
                parent.left = Some(idx);
            } else {
                parent.right = Some(idx);
            }
        }

        debug!(level, axis = level % D, "inserted new node");
        idx
    }
}

impl<N: IndexableNum, const D: usize, V> Default for KDTree<N, D, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: IndexableNum, const D: usize, V> Index<&Point<N, D>> for KDTree<N, D, V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the point is not in the tree.
    fn index(&self, point: &Point<N, D>) -> &V {
        match self.get(point) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<N: IndexableNum, const D: usize, V> FromIterator<(Point<N, D>, V)> for KDTree<N, D, V> {
    fn from_iter<I: IntoIterator<Item = (Point<N, D>, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<N: IndexableNum, const D: usize, V> Extend<(Point<N, D>, V)> for KDTree<N, D, V> {
    fn extend<I: IntoIterator<Item = (Point<N, D>, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.nodes.reserve(iter.size_hint().0);
        for (point, value) in iter {
            self.insert(point, value);
        }
    }
}

impl<'a, N: IndexableNum, const D: usize, V> IntoIterator for &'a KDTree<N, D, V> {
    type Item = (&'a Point<N, D>, &'a V);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
