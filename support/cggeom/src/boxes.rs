use cgmath::{num_traits::NumCast, BaseNum, Point2, Vector2};
use std::cmp::Ordering;

/// An axis-aligned box.
///
/// All boxes are half-open: `min` is inclusive and `max` is exclusive. A box
/// is empty if it has a non-positive extent along any axis.
pub trait AxisAlignedBox<T>: Sized {
    type Point;
    type Vector;

    fn new(min: Self::Point, max: Self::Point) -> Self;

    fn min(&self) -> Self::Point;
    fn max(&self) -> Self::Point;

    /// The canonical empty box, located at the origin.
    fn zero() -> Self;

    fn size(&self) -> Self::Vector;

    fn is_empty(&self) -> bool;

    fn contains_point(&self, point: &Self::Point) -> bool;

    /// Check if `other` lies entirely within `self`. An empty `other` is
    /// contained by any box.
    fn contains_box(&self, other: &Self) -> bool;

    /// Compute the smallest box containing both of `self` and `other`.
    ///
    /// Neither of the inputs are checked for emptiness. Use
    /// [`union_nonempty`](AxisAlignedBox::union_nonempty) if an empty input
    /// should not extend the result.
    fn union(&self, other: &Self) -> Self;

    /// Like [`union`](AxisAlignedBox::union), but empty inputs are ignored.
    /// Returns an empty box if both inputs are empty.
    #[inline]
    fn union_nonempty(&self, other: &Self) -> Self
    where
        Self: Clone,
    {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Self::zero(),
            (true, false) => other.clone(),
            (false, true) => self.clone(),
            (false, false) => self.union(other),
        }
    }

    /// Compute the intersection. Returns `None` if the result is empty.
    fn intersection(&self, other: &Self) -> Option<Self>;
}

/// Represents an axis-aligned 2D box.
#[repr(C)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Box2<T> {
    /// The minimum coordinate (inclusive).
    pub min: Point2<T>,

    /// The maximum coordinate (exclusive).
    pub max: Point2<T>,
}

/// Construct a [`Box2`].
///
/// # Examples
///
/// ```
/// use cggeom::{box2, prelude::*};
///
/// let a = box2! { min: [1, 2], max: [5, 6] };
/// let b = box2! { top_left: [1, 2], size: [4, 4] };
/// assert_eq!(a, b);
/// assert!(box2! { min: [3, 3], max: [3, 8] }.is_empty());
/// ```
#[macro_export]
macro_rules! box2 {
    { min: [$min_x:expr, $min_y:expr], max: [$max_x:expr, $max_y:expr] } => {
        $crate::Box2 {
            min: $crate::cgmath::Point2::new($min_x, $min_y),
            max: $crate::cgmath::Point2::new($max_x, $max_y),
        }
    };
    { top_left: [$x:expr, $y:expr], size: [$w:expr, $h:expr] } => {{
        let (x, y) = ($x, $y);
        $crate::Box2 {
            min: $crate::cgmath::Point2::new(x, y),
            max: $crate::cgmath::Point2::new(x + $w, y + $h),
        }
    }};
}

#[inline]
fn num_min<T: BaseNum>(x: T, y: T) -> T {
    match x.partial_cmp(&y) {
        None | Some(Ordering::Equal) | Some(Ordering::Less) => x,
        Some(Ordering::Greater) => y,
    }
}

#[inline]
fn num_max<T: BaseNum>(x: T, y: T) -> T {
    match x.partial_cmp(&y) {
        None | Some(Ordering::Equal) | Some(Ordering::Greater) => x,
        Some(Ordering::Less) => y,
    }
}

impl<T: BaseNum> AxisAlignedBox<T> for Box2<T> {
    type Point = Point2<T>;
    type Vector = Vector2<T>;

    #[inline]
    fn new(min: Self::Point, max: Self::Point) -> Self {
        Self { min, max }
    }

    #[inline]
    fn min(&self) -> Self::Point {
        self.min
    }
    #[inline]
    fn max(&self) -> Self::Point {
        self.max
    }

    #[inline]
    fn zero() -> Self {
        Self::new(
            Point2::new(T::zero(), T::zero()),
            Point2::new(T::zero(), T::zero()),
        )
    }

    /// Get the extent of the box. Must not be called on an invalid box whose
    /// `T` cannot represent negative values.
    #[inline]
    fn size(&self) -> Self::Vector {
        self.max - self.min
    }

    // Compare the corners directly instead of checking `size()` so that this
    // works on invalid boxes of unsigned types
    #[inline]
    fn is_empty(&self) -> bool {
        !(self.min.x < self.max.x && self.min.y < self.max.y)
    }

    #[inline]
    fn contains_point(&self, point: &Self::Point) -> bool {
        point.x >= self.min.x && point.y >= self.min.y && point.x < self.max.x && point.y < self.max.y
    }

    #[inline]
    fn contains_box(&self, other: &Self) -> bool {
        other.is_empty()
            || (other.min.x >= self.min.x
                && other.min.y >= self.min.y
                && other.max.x <= self.max.x
                && other.max.y <= self.max.y)
    }

    #[inline]
    fn union(&self, other: &Self) -> Self {
        Self::new(
            Point2::new(num_min(self.min.x, other.min.x), num_min(self.min.y, other.min.y)),
            Point2::new(num_max(self.max.x, other.max.x), num_max(self.max.y, other.max.y)),
        )
    }

    #[inline]
    fn intersection(&self, other: &Self) -> Option<Self> {
        let s = Self::new(
            Point2::new(num_max(self.min.x, other.min.x), num_max(self.min.y, other.min.y)),
            Point2::new(num_min(self.max.x, other.max.x), num_min(self.max.y, other.max.y)),
        );
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}

impl<S: NumCast + Copy> Box2<S> {
    /// Component-wise casting to another type. Returns `None` if any
    /// coordinate is not representable by `T`.
    #[inline]
    pub fn cast<T: NumCast>(&self) -> Option<Box2<T>> {
        Some(Box2 {
            min: self.min.cast()?,
            max: self.max.cast()?,
        })
    }
}
