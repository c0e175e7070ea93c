use crate::error::Result;
use crate::geometry::{Bounds2, Ray2, RayIntersection};
use crate::math::intersect_2d::clip_segment_to_box_2d;
use crate::math::roots::solve_linear_roots_real;
use crate::math::transform_2d::transform_point;
use crate::math::{blend, cross, perpendicular, unit_or_zero, Matrix3, Point2, Vector2};
use crate::render::{svg::svg_point, PathSink};

use super::{ray_frame_coefficients, ray_hit, Curve, Segment, POINT_EPSILON};

/// A straight line segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    start: Point2,
    end: Point2,
    tangent: Vector2,
    bounds: Bounds2,
}

impl Line {
    /// Creates a line. A zero-length line is constructible but invalid.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            tangent: unit_or_zero(end - start),
            bounds: Bounds2::from_points(&start, &end),
        }
    }

    /// The line with both endpoints moved by `distance` along the left normal.
    fn offset(&self, distance: f64) -> Self {
        let shift = -perpendicular(self.tangent) * distance;
        Self::new(self.start + shift, self.end + shift)
    }
}

impl Curve for Line {
    fn start(&self) -> Point2 {
        self.start
    }

    fn end(&self) -> Point2 {
        self.end
    }

    fn position_at(&self, t: f64) -> Point2 {
        blend(&self.start, &self.end, t)
    }

    fn tangent_at(&self, _t: f64) -> Vector2 {
        self.end - self.start
    }

    fn curvature_at(&self, _t: f64) -> f64 {
        0.0
    }

    fn start_tangent(&self) -> Vector2 {
        self.tangent
    }

    fn end_tangent(&self) -> Vector2 {
        self.tangent
    }

    fn bounds(&self) -> Bounds2 {
        self.bounds
    }

    fn is_invalid(&self) -> bool {
        (self.end - self.start).norm() < POINT_EPSILON
    }

    fn subdivided(&self, t: f64) -> (Self, Self) {
        let middle = self.position_at(t);
        (Self::new(self.start, middle), Self::new(middle, self.end))
    }

    fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    fn transformed(&self, matrix: &Matrix3) -> Segment {
        Self::new(
            transform_point(matrix, &self.start),
            transform_point(matrix, &self.end),
        )
        .into()
    }

    fn nondegenerate_segments(&self) -> Vec<Segment> {
        if self.is_invalid() {
            Vec::new()
        } else {
            vec![self.clone().into()]
        }
    }

    fn stroke_left(&self, line_width: f64) -> Vec<Segment> {
        vec![self.offset(line_width / 2.0).into()]
    }

    fn stroke_right(&self, line_width: f64) -> Vec<Segment> {
        vec![self.offset(-line_width / 2.0).reversed().into()]
    }

    fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection> {
        let coefficients = ray_frame_coefficients(ray, &[self.start.coords, self.end - self.start]);
        let tangent = self.end - self.start;
        solve_linear_roots_real(coefficients[1], coefficients[0])
            .into_iter()
            .filter_map(|t| ray_hit(ray, self.position_at(t), &tangent, t))
            .collect()
    }

    fn signed_area_fragment(&self) -> f64 {
        0.5 * cross(&self.start.coords, &self.end.coords)
    }

    fn svg_path_fragment(&self) -> String {
        format!("L {}", svg_point(&self.end))
    }

    fn write_to_context(&self, sink: &mut dyn PathSink) {
        sink.line_to(&self.end);
    }

    fn intersects_bounds(&self, bounds: &Bounds2) -> Result<bool> {
        if bounds.is_empty() {
            return Ok(false);
        }
        Ok(clip_segment_to_box_2d(&self.start, &self.end, &bounds.min(), &bounds.max()).is_some())
    }

    fn arc_length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line() -> Line {
        Line::new(Point2::new(1.0, 1.0), Point2::new(5.0, 4.0))
    }

    #[test]
    fn position_and_tangents() {
        let line = line();
        let mid = line.position_at(0.5);
        assert!((mid - Point2::new(3.0, 2.5)).norm() < 1e-12);
        assert!((line.start_tangent() - Vector2::new(0.8, 0.6)).norm() < 1e-12);
        assert!(line.curvature_at(0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_length_is_invalid() {
        let p = Point2::new(2.0, 2.0);
        let line = Line::new(p, p);
        assert!(line.is_invalid());
        assert!(line.nondegenerate_segments().is_empty());
        assert_eq!(self::line().nondegenerate_segments().len(), 1);
    }

    #[test]
    fn stroke_left_is_parallel_at_half_width() {
        let line = Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let left = line.stroke_left(2.0);
        let right = line.stroke_right(2.0);
        assert_eq!(left.len(), 1);
        // Left of +x travel is +y for the (y, -x) perpendicular convention.
        assert!((left[0].start() - Point2::new(0.0, 1.0)).norm() < 1e-12);
        assert!((left[0].end() - Point2::new(10.0, 1.0)).norm() < 1e-12);
        assert!((right[0].start() - Point2::new(10.0, -1.0)).norm() < 1e-12);
        assert!((right[0].end() - Point2::new(0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn ray_hits_are_half_open() {
        let line = Line::new(Point2::new(2.0, 0.0), Point2::new(2.0, 2.0));
        let at_start = Ray2::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        let at_end = Ray2::new(Point2::new(0.0, 2.0), Vector2::new(1.0, 0.0)).unwrap();
        assert_eq!(line.intersection(&at_start).len(), 1);
        assert!(line.intersection(&at_end).is_empty());
    }

    #[test]
    fn ray_behind_origin_is_ignored() {
        let line = Line::new(Point2::new(-2.0, -1.0), Point2::new(-2.0, 1.0));
        let ray = Ray2::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        assert!(line.intersection(&ray).is_empty());
    }

    #[test]
    fn parallel_ray_misses() {
        let line = Line::new(Point2::new(0.0, 1.0), Point2::new(5.0, 1.0));
        let ray = Ray2::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        assert!(line.intersection(&ray).is_empty());
    }

    #[test]
    fn bounds_intersection() {
        let line = line();
        assert!(line
            .intersects_bounds(&Bounds2::new(2.0, 0.0, 3.0, 10.0))
            .unwrap());
        assert!(!line
            .intersects_bounds(&Bounds2::new(6.0, 0.0, 7.0, 10.0))
            .unwrap());
        assert!(!line.intersects_bounds(&Bounds2::EMPTY).unwrap());
    }

    #[test]
    fn svg_fragment() {
        assert_eq!(line().svg_path_fragment(), "L 5 4");
    }
}
