use std::fmt::Debug;
use std::ops::Index;

use geo_traits::CoordTrait;
use num_traits::{Num, NumCast, ToPrimitive};

use crate::error::{KnnTreeError, Result};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Every implementor has a
/// lossless-enough conversion to `f64`, which is the unit all distances are measured in.
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + ToPrimitive
    + PartialOrd
    + Copy
    + Debug
    + Send
    + Sync
{
    /// Absolute difference between two values, measured in `f64`.
    #[inline]
    fn abs_diff_f64(self, other: Self) -> f64 {
        let a = self.to_f64().unwrap_or(f64::NAN);
        let b = other.to_f64().unwrap_or(f64::NAN);
        (a - b).abs()
    }
}

impl IndexableNum for i8 {}
impl IndexableNum for u8 {}
impl IndexableNum for i16 {}
impl IndexableNum for u16 {}
impl IndexableNum for i32 {}
impl IndexableNum for u32 {}
impl IndexableNum for f32 {}
impl IndexableNum for f64 {}

/// A point in `D`-dimensional space.
///
/// Every axis value of a point is finite and totally ordered against the values it will be
/// compared to in the tree. For floating point coordinates this means no axis may be NaN or
/// infinite; the constructors enforce this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<N: IndexableNum, const D: usize> {
    coords: [N; D],
}

impl<N: IndexableNum, const D: usize> Point<N, D> {
    /// Create a new point from its coordinates.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is NaN or infinite. Use [`Point::try_new`] to handle that case
    /// without panicking.
    pub fn new(coords: [N; D]) -> Self {
        match Self::try_new(coords) {
            Ok(point) => point,
            Err(err) => panic!("{}", err),
        }
    }

    /// Create a new point, returning an error if any coordinate is NaN or infinite.
    pub fn try_new(coords: [N; D]) -> Result<Self> {
        check_coords(&coords)?;
        Ok(Self { coords })
    }

    /// Create a point from any [`CoordTrait`] implementation with matching dimension.
    pub fn try_from_coord(coord: &impl CoordTrait<T = N>) -> Result<Self> {
        let found = coord.dim().size();
        if found != D {
            return Err(KnnTreeError::DimensionMismatch { expected: D, found });
        }

        let mut coords = [N::zero(); D];
        for (axis, value) in coords.iter_mut().enumerate() {
            *value = coord.nth_or_panic(axis);
        }
        Self::try_new(coords)
    }

    /// The number of dimensions of this point.
    #[inline]
    pub const fn dimension(&self) -> usize {
        D
    }

    /// The raw coordinates of this point.
    #[inline]
    pub fn coords(&self) -> &[N; D] {
        &self.coords
    }

    /// The coordinate on the given axis, or `None` if `axis >= D`.
    #[inline]
    pub fn nth(&self, axis: usize) -> Option<N> {
        self.coords.get(axis).copied()
    }
}

impl<N: IndexableNum, const D: usize> Index<usize> for Point<N, D> {
    type Output = N;

    #[inline]
    fn index(&self, axis: usize) -> &N {
        &self.coords[axis]
    }
}

impl<N: IndexableNum, const D: usize> TryFrom<[N; D]> for Point<N, D> {
    type Error = KnnTreeError;

    fn try_from(coords: [N; D]) -> Result<Self> {
        Self::try_new(coords)
    }
}

/// Distances are measured in `f64`, where `inf - inf` is NaN, so infinite axes are rejected
/// along with unordered ones.
#[inline]
fn check_coords<N: IndexableNum>(coords: &[N]) -> Result<()> {
    for (axis, c) in coords.iter().enumerate() {
        if c.partial_cmp(c).is_none() {
            return Err(KnnTreeError::UnorderedCoordinate { axis });
        }
        if !c.to_f64().is_some_and(f64::is_finite) {
            return Err(KnnTreeError::NonFiniteCoordinate { axis });
        }
    }
    Ok(())
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
