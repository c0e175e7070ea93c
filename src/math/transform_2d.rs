//! 2D affine transforms stored as 3x3 matrices.

use super::{Matrix3, Point2, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Translation by `(x, y)`.
#[must_use]
pub fn translation(x: f64, y: f64) -> Matrix3 {
    Matrix3::new(1.0, 0.0, x, 0.0, 1.0, y, 0.0, 0.0, 1.0)
}

/// Rotation by `angle` radians about the origin.
#[must_use]
pub fn rotation(angle: f64) -> Matrix3 {
    let (sin, cos) = angle.sin_cos();
    Matrix3::new(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0)
}

/// Non-uniform scaling about the origin.
#[must_use]
pub fn scaling(sx: f64, sy: f64) -> Matrix3 {
    Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0)
}

/// Applies the full affine transform to a point.
#[must_use]
pub fn transform_point(m: &Matrix3, p: &Point2) -> Point2 {
    Point2::new(
        m[(0, 0)] * p.x + m[(0, 1)] * p.y + m[(0, 2)],
        m[(1, 0)] * p.x + m[(1, 1)] * p.y + m[(1, 2)],
    )
}

/// Applies only the linear part of the transform to a vector.
#[must_use]
pub fn transform_vector(m: &Matrix3, v: &Vector2) -> Vector2 {
    Vector2::new(
        m[(0, 0)] * v.x + m[(0, 1)] * v.y,
        m[(1, 0)] * v.x + m[(1, 1)] * v.y,
    )
}

/// Determinant of the linear (upper-left 2x2) part.
#[must_use]
pub fn linear_determinant(m: &Matrix3) -> f64 {
    m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]
}

/// Inverts an affine transform.
///
/// # Errors
///
/// Returns [`GeometryError::SingularTransform`] if the linear part has a
/// (near) zero determinant.
pub fn inverse(m: &Matrix3) -> Result<Matrix3> {
    if linear_determinant(m).abs() < TOLERANCE * TOLERANCE {
        return Err(GeometryError::SingularTransform.into());
    }
    m.try_inverse()
        .ok_or_else(|| GeometryError::SingularTransform.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn compose_rotation_then_translation() {
        let m = translation(1.0, 2.0) * rotation(PI / 2.0);
        let p = transform_point(&m, &Point2::new(1.0, 0.0));
        assert_abs_diff_eq!(p, Point2::new(1.0, 3.0), epsilon = 1e-12);
        let v = transform_vector(&m, &Vector2::new(1.0, 0.0));
        assert_abs_diff_eq!(v, Vector2::new(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn inverse_round_trips_points() {
        let m = translation(3.0, -1.0) * scaling(2.0, 0.5) * rotation(0.3);
        let inv = inverse(&m).unwrap();
        let p = Point2::new(0.7, -4.2);
        let back = transform_point(&inv, &transform_point(&m, &p));
        assert_abs_diff_eq!(back, p, epsilon = 1e-10);
    }

    #[test]
    fn singular_transform_fails() {
        assert!(inverse(&scaling(1.0, 0.0)).is_err());
    }
}
