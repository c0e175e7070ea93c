use crate::math::transform_2d::transform_point;
use crate::math::{Matrix3, Point2};

/// An axis-aligned bounding box in 2D.
///
/// Values are never partially mutated; every operation returns a new box.
/// [`Bounds2::EMPTY`] has inverted infinite extents and is the identity
/// for [`Bounds2::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds2 {
    /// The empty box: contains nothing, identity for union.
    pub const EMPTY: Self = Self::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );

    /// Creates a box from its extents.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The degenerate box containing exactly one point.
    #[must_use]
    pub fn point(p: &Point2) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// The smallest box containing both points.
    #[must_use]
    pub fn from_points(a: &Point2, b: &Point2) -> Self {
        Self::point(a).with_point(b)
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Lower-left corner.
    #[must_use]
    pub fn min(&self) -> Point2 {
        Point2::new(self.min_x, self.min_y)
    }

    /// Upper-right corner.
    #[must_use]
    pub fn max(&self) -> Point2 {
        Point2::new(self.max_x, self.max_y)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Whether the box contains no points (negative extent on either axis).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() < 0.0 || self.height() < 0.0
    }

    /// Whether all four extents are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// The smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// The overlap of two boxes, empty when they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }

    /// This box extended to include `p`.
    #[must_use]
    pub fn with_point(&self, p: &Point2) -> Self {
        Self::new(
            self.min_x.min(p.x),
            self.min_y.min(p.y),
            self.max_x.max(p.x),
            self.max_y.max(p.y),
        )
    }

    /// Whether `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        self.min_x <= p.x && p.x <= self.max_x && self.min_y <= p.y && p.y <= self.max_y
    }

    /// Whether `other` lies entirely inside this box. The empty box is
    /// contained by everything.
    #[must_use]
    pub fn contains_bounds(&self, other: &Self) -> bool {
        other.is_empty()
            || (self.min_x <= other.min_x
                && self.min_y <= other.min_y
                && self.max_x >= other.max_x
                && self.max_y >= other.max_y)
    }

    /// Whether the two boxes share at least one point.
    #[must_use]
    pub fn intersects_bounds(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// This box grown by `amount` on every side.
    #[must_use]
    pub fn dilated(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    /// Bounds of the four transformed corners.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix3) -> Self {
        if self.is_empty() {
            return *self;
        }
        [
            Point2::new(self.min_x, self.min_y),
            Point2::new(self.max_x, self.min_y),
            Point2::new(self.min_x, self.max_y),
            Point2::new(self.max_x, self.max_y),
        ]
        .iter()
        .fold(Self::EMPTY, |acc, p| {
            acc.with_point(&transform_point(matrix, p))
        })
    }

    /// Whether both boxes match within `epsilon` on every extent.
    #[must_use]
    pub fn equals_epsilon(&self, other: &Self, epsilon: f64) -> bool {
        let close = |a: f64, b: f64| a == b || (a - b).abs() <= epsilon;
        close(self.min_x, other.min_x)
            && close(self.min_y, other.min_y)
            && close(self.max_x, other.max_x)
            && close(self.max_y, other.max_y)
    }
}

impl Default for Bounds2 {
    fn default() -> Self {
        Self::EMPTY
    }
}
