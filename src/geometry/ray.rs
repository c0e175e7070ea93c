use crate::error::Result;
use crate::math::{normalized, Point2, Vector2};

/// A half-infinite ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2 {
    origin: Point2,
    direction: Vector2,
}

impl Ray2 {
    /// Creates a ray, normalizing `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if `direction` has zero length.
    pub fn new(origin: Point2, direction: Vector2) -> Result<Self> {
        Ok(Self {
            origin,
            direction: normalized(direction)?,
        })
    }

    #[must_use]
    pub fn origin(&self) -> &Point2 {
        &self.origin
    }

    /// Unit direction.
    #[must_use]
    pub fn direction(&self) -> &Vector2 {
        &self.direction
    }

    /// Point at `distance` along the ray.
    #[must_use]
    pub fn point_at(&self, distance: f64) -> Point2 {
        self.origin + self.direction * distance
    }

    /// Signed distance of the projection of `p` onto the ray.
    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        (p - self.origin).dot(&self.direction)
    }
}

/// A single ray/segment crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayIntersection {
    /// Distance from the ray origin, always positive.
    pub distance: f64,
    pub point: Point2,
    /// Unit normal of the segment at the hit, facing the ray origin.
    pub normal: Vector2,
    /// +1 when the segment crosses the ray right-to-left, -1 otherwise.
    pub wind: i32,
    /// Segment parameter of the hit, in `[0, 1)`.
    pub t: f64,
}

impl RayIntersection {
    #[must_use]
    pub fn new(distance: f64, point: Point2, normal: Vector2, wind: i32, t: f64) -> Self {
        Self {
            distance,
            point,
            normal,
            wind,
            t,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let ray = Ray2::new(Point2::new(1.0, 1.0), Vector2::new(3.0, 4.0)).unwrap();
        assert!((ray.direction().norm() - 1.0).abs() < 1e-12);
        let p = ray.point_at(5.0);
        assert!((p.x - 4.0).abs() < 1e-12);
        assert!((p.y - 5.0).abs() < 1e-12);
        assert!((ray.distance_to(&p) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zero_direction_fails() {
        assert!(Ray2::new(Point2::origin(), Vector2::zeros()).is_err());
    }
}
