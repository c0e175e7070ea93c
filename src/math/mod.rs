pub mod arc_2d;
pub mod intersect_2d;
pub mod roots;
pub mod transform_2d;

use crate::error::{GeometryError, Result};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3x3 matrix, used as a 2D affine transform (last row `0 0 1`).
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `v` rotated a quarter turn toward decreasing angles: `(y, -x)`.
///
/// The stroking code offsets the "left" side by `-perpendicular(t)` and the
/// "right" side by `+perpendicular(t)` for a direction of travel `t`.
#[must_use]
pub fn perpendicular(v: Vector2) -> Vector2 {
    Vector2::new(v.y, -v.x)
}

/// 2D cross product `a.x * b.y - a.y * b.x`.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Linear interpolation between two points: `a + (b - a) * t`.
#[must_use]
pub fn blend(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// Returns the point halfway between `a` and `b`.
#[must_use]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    blend(a, b, 0.5)
}

/// Builds a vector from polar coordinates.
#[must_use]
pub fn polar(magnitude: f64, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(magnitude * cos, magnitude * sin)
}

/// Returns the polar angle of `v` in `(-π, π]`.
#[must_use]
pub fn angle_of(v: &Vector2) -> f64 {
    v.y.atan2(v.x)
}

/// Unsigned angle between two non-zero vectors, in `[0, π]`.
#[must_use]
pub fn angle_between(a: &Vector2, b: &Vector2) -> f64 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denominator).clamp(-1.0, 1.0).acos()
}

/// Normalizes `v`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `v` has zero length.
pub fn normalized(v: Vector2) -> Result<Vector2> {
    v.try_normalize(0.0).ok_or_else(|| GeometryError::ZeroVector.into())
}

/// Normalizes `v`, mapping the zero vector to itself.
///
/// Used for cached tangents of degenerate segments, which never reach the
/// drawable segment list.
#[must_use]
pub fn unit_or_zero(v: Vector2) -> Vector2 {
    v.try_normalize(0.0).unwrap_or_else(Vector2::zeros)
}

/// Whether two points coincide within `epsilon` on each axis.
#[must_use]
pub fn points_equal_eps(a: &Point2, b: &Point2, epsilon: f64) -> bool {
    (a.x - b.x).abs() <= epsilon && (a.y - b.y).abs() <= epsilon
}

/// Whether three points are collinear, measured by twice the triangle area.
#[must_use]
pub fn are_points_collinear(a: &Point2, b: &Point2, c: &Point2, epsilon: f64) -> bool {
    cross(&(b - a), &(c - a)).abs() <= epsilon
}
