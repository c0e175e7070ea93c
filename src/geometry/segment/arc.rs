use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{OperationError, Result};
use crate::geometry::{Bounds2, Ray2, RayIntersection};
use crate::math::arc_2d::{
    actual_end_angle, arc_contains_angle, arc_point_at, arc_t_at_angle, arc_tangent_at,
};
use crate::math::intersect_2d::ray_circle_intersect_2d;
use crate::math::{polar, Matrix3, Point2, Vector2};
use crate::render::{svg::svg_number, svg::svg_point, PathSink};

use super::elliptical_arc::transformed_ellipse;
use super::{ray_hit, reversed_segments, sampled_offset, Curve, Segment};

/// Sweeps within this of a full turn are written as two SVG arcs, since a
/// single SVG arc cannot return to its own start point.
const SVG_FULL_TURN_EPSILON: f64 = 0.01;

/// A circular arc with canvas `arc()` angle semantics.
///
/// A non-anticlockwise arc sweeps toward increasing angles. Requested sweeps
/// of a full turn or more are clamped to exactly one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    center: Point2,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
    actual_end_angle: f64,
    start_tangent: Vector2,
    end_tangent: Vector2,
    bounds: Bounds2,
}

impl Arc {
    /// Creates an arc. A non-positive radius or zero sweep gives an invalid
    /// arc.
    ///
    /// Sweeps beyond a full turn are clamped to one turn, as canvas `arc()`
    /// does, rather than rejected.
    #[must_use]
    pub fn new(
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> Self {
        let actual_end_angle = actual_end_angle(start_angle, end_angle, anticlockwise);
        let sweep = actual_end_angle - start_angle;
        let (tx, ty) = arc_tangent_at(start_angle, sweep, 0.0);
        let (ex, ey) = arc_tangent_at(start_angle, sweep, 1.0);
        let mut arc = Self {
            center,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
            actual_end_angle,
            start_tangent: Vector2::new(tx, ty),
            end_tangent: Vector2::new(ex, ey),
            bounds: Bounds2::EMPTY,
        };
        arc.bounds = arc.compute_bounds();
        arc
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// The end angle as requested at construction.
    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    #[must_use]
    pub fn anticlockwise(&self) -> bool {
        self.anticlockwise
    }

    /// The end angle after canvas normalization; `actual_end_angle -
    /// start_angle` is the signed sweep.
    #[must_use]
    pub fn actual_end_angle(&self) -> f64 {
        self.actual_end_angle
    }

    /// Signed sweep, negative when anticlockwise.
    #[must_use]
    pub fn angle_difference(&self) -> f64 {
        self.actual_end_angle - self.start_angle
    }

    /// Absolute angle at parameter `t`.
    #[must_use]
    pub fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + self.angle_difference() * t
    }

    /// Parameter of an absolute angle, measured along the sweep direction.
    #[must_use]
    pub fn t_at_angle(&self, angle: f64) -> f64 {
        arc_t_at_angle(self.start_angle, self.angle_difference(), angle)
    }

    /// Whether the arc passes through `angle`.
    #[must_use]
    pub fn contains_angle(&self, angle: f64) -> bool {
        arc_contains_angle(self.start_angle, self.angle_difference(), angle)
    }

    fn compute_bounds(&self) -> Bounds2 {
        let mut bounds = Bounds2::from_points(&self.start(), &self.end());
        for angle in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
            if self.contains_angle(angle) {
                bounds = bounds.with_point(&(self.center + polar(self.radius, angle)));
            }
        }
        bounds
    }

    fn arc_from_angles(&self, start_angle: f64, end_angle: f64) -> Self {
        Self::new(
            self.center,
            self.radius,
            start_angle,
            end_angle,
            self.anticlockwise,
        )
    }

    /// One SVG arc command from the current point to the point at `angle`.
    fn svg_arc_command(&self, sweep: f64, angle: f64) -> String {
        let large_arc = u8::from(sweep.abs() > PI);
        let sweep_flag = u8::from(sweep > 0.0);
        let radius = svg_number(self.radius);
        format!(
            "A {radius} {radius} 0 {large_arc} {sweep_flag} {}",
            svg_point(&(self.center + polar(self.radius, angle)))
        )
    }

    /// Parameters in `[0, 1)` where `ray` meets the circle in front of its
    /// origin, paired with the hit points.
    pub(crate) fn ray_circle_ts(&self, ray: &Ray2) -> Vec<(f64, Point2)> {
        ray_circle_intersect_2d(ray.origin(), ray.direction(), &self.center, self.radius)
            .into_iter()
            .filter(|distance| *distance > 0.0)
            .filter_map(|distance| {
                let point = ray.point_at(distance);
                let offset = point - self.center;
                let angle = offset.y.atan2(offset.x);
                self.contains_angle(angle)
                    .then(|| (self.t_at_angle(angle), point))
            })
            .filter(|(t, _)| (0.0..1.0).contains(t))
            .collect()
    }
}

impl Curve for Arc {
    fn start(&self) -> Point2 {
        self.position_at(0.0)
    }

    fn end(&self) -> Point2 {
        self.position_at(1.0)
    }

    fn position_at(&self, t: f64) -> Point2 {
        let (x, y) = arc_point_at(
            self.center.x,
            self.center.y,
            self.radius,
            self.start_angle,
            self.angle_difference(),
            t,
        );
        Point2::new(x, y)
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        let angle = self.angle_at(t);
        Vector2::new(-angle.sin(), angle.cos()) * (self.radius * self.angle_difference())
    }

    fn curvature_at(&self, _t: f64) -> f64 {
        if self.angle_difference() >= 0.0 {
            1.0 / self.radius
        } else {
            -1.0 / self.radius
        }
    }

    fn start_tangent(&self) -> Vector2 {
        self.start_tangent
    }

    fn end_tangent(&self) -> Vector2 {
        self.end_tangent
    }

    fn bounds(&self) -> Bounds2 {
        self.bounds
    }

    fn is_invalid(&self) -> bool {
        self.radius <= 0.0 || self.start_angle == self.actual_end_angle
    }

    fn subdivided(&self, t: f64) -> (Self, Self) {
        let middle = self.angle_at(t);
        (
            self.arc_from_angles(self.start_angle, middle),
            self.arc_from_angles(middle, self.actual_end_angle),
        )
    }

    fn reversed(&self) -> Self {
        Self::new(
            self.center,
            self.radius,
            self.actual_end_angle,
            self.start_angle,
            !self.anticlockwise,
        )
    }

    fn transformed(&self, matrix: &Matrix3) -> Segment {
        transformed_ellipse(
            matrix,
            &self.center,
            self.radius,
            self.radius,
            0.0,
            self.start_angle,
            self.angle_difference(),
        )
    }

    fn nondegenerate_segments(&self) -> Vec<Segment> {
        if self.is_invalid() {
            Vec::new()
        } else {
            vec![self.clone().into()]
        }
    }

    fn stroke_left(&self, line_width: f64) -> Vec<Segment> {
        sampled_offset(self, line_width / 2.0)
    }

    fn stroke_right(&self, line_width: f64) -> Vec<Segment> {
        reversed_segments(&sampled_offset(self, -line_width / 2.0))
    }

    fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection> {
        self.ray_circle_ts(ray)
            .into_iter()
            .filter_map(|(t, point)| ray_hit(ray, point, &self.tangent_at(t), t))
            .collect()
    }

    fn signed_area_fragment(&self) -> f64 {
        let (start, end) = (self.start_angle, self.actual_end_angle);
        0.5 * (self.radius * self.radius * (end - start)
            + self.radius
                * (self.center.x * (end.sin() - start.sin())
                    - self.center.y * (end.cos() - start.cos())))
    }

    fn svg_path_fragment(&self) -> String {
        let sweep = self.angle_difference();
        if sweep.abs() > TAU - SVG_FULL_TURN_EPSILON {
            let middle = self.angle_at(0.5);
            format!(
                "{} {}",
                self.svg_arc_command(sweep / 2.0, middle),
                self.svg_arc_command(sweep / 2.0, self.actual_end_angle)
            )
        } else {
            self.svg_arc_command(sweep, self.actual_end_angle)
        }
    }

    fn write_to_context(&self, sink: &mut dyn PathSink) {
        sink.arc(
            &self.center,
            self.radius,
            self.start_angle,
            self.actual_end_angle,
            self.anticlockwise,
        );
    }

    fn intersects_bounds(&self, _bounds: &Bounds2) -> Result<bool> {
        Err(OperationError::Unimplemented("Arc::intersects_bounds").into())
    }

    fn arc_length(&self) -> f64 {
        self.radius * self.angle_difference().abs()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::transform_2d::{rotation, scaling, translation};

    #[test]
    fn full_circle_bounds() {
        let arc = Arc::new(Point2::new(1.0, 2.0), 3.0, 0.0, TAU, false);
        assert!(arc
            .bounds()
            .equals_epsilon(&Bounds2::new(-2.0, -1.0, 4.0, 5.0), 1e-12));
        assert!((arc.angle_difference() - TAU).abs() < 1e-12);
    }

    #[test]
    fn anticlockwise_quarter_goes_the_long_way() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2, true);
        assert!((arc.angle_difference() + 1.5 * PI).abs() < 1e-12);
        // Passes through angle π (and -π/2), not through π/4.
        let b = arc.bounds();
        assert!((b.min_x() + 1.0).abs() < 1e-12);
        assert!((b.min_y() + 1.0).abs() < 1e-12);
        assert!(!arc.contains_angle(PI / 4.0));
    }

    #[test]
    fn over_full_sweep_is_clamped() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, 3.0 * PI, false);
        assert!(!arc.is_invalid());
        assert!((arc.angle_difference() - TAU).abs() < 1e-12);
        assert!((arc.end() - arc.start()).norm() < 1e-12);

        let arc = Arc::new(Point2::origin(), 1.0, 0.0, -5.0 * PI, true);
        assert!((arc.angle_difference() + TAU).abs() < 1e-12);
    }

    #[test]
    fn equal_angles_are_invalid() {
        let arc = Arc::new(Point2::origin(), 1.0, 1.0, 1.0, false);
        assert!(arc.is_invalid());
        assert!(arc.nondegenerate_segments().is_empty());
        assert!(Arc::new(Point2::origin(), 0.0, 0.0, 1.0, false).is_invalid());
    }

    #[test]
    fn tangent_direction_follows_sweep() {
        let increasing = Arc::new(Point2::origin(), 1.0, 0.0, PI, false);
        assert!((increasing.start_tangent() - Vector2::new(0.0, 1.0)).norm() < 1e-12);
        let decreasing = Arc::new(Point2::origin(), 1.0, 0.0, -PI, true);
        assert!((decreasing.start_tangent() - Vector2::new(0.0, -1.0)).norm() < 1e-12);
        assert!(increasing.curvature_at(0.3) > 0.0);
        assert!(decreasing.curvature_at(0.3) < 0.0);
    }

    #[test]
    fn ray_through_circle_from_outside() {
        let arc = Arc::new(Point2::origin(), 5.0, 0.0, TAU, false);
        let ray = Ray2::new(Point2::new(-10.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        let mut hits = arc.intersection(&ray);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        assert_eq!(hits.len(), 2);
        assert!((hits[0].distance - 5.0).abs() < 1e-12);
        assert!((hits[1].distance - 15.0).abs() < 1e-12);
        assert!((hits[0].point - Point2::new(-5.0, 0.0)).norm() < 1e-12);
        assert!((hits[1].point - Point2::new(5.0, 0.0)).norm() < 1e-12);
        // Entering and leaving a closed loop cancel.
        assert_eq!(hits[0].wind + hits[1].wind, 0);
        assert!((hits[0].normal - Vector2::new(-1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn ray_from_inside_hits_once_with_orientation_sign() {
        let ccw = Arc::new(Point2::origin(), 2.0, 0.0, TAU, false);
        let cw = Arc::new(Point2::origin(), 2.0, 0.0, -TAU, true);
        for direction in [Vector2::new(1.0, 0.3), Vector2::new(-0.2, -1.0)] {
            let ray = Ray2::new(Point2::new(0.1, 0.2), direction).unwrap();
            assert_eq!(ccw.winding_intersection(&ray), 1);
            assert_eq!(cw.winding_intersection(&ray), -1);
        }
    }

    #[test]
    fn svg_for_full_circle_uses_two_arcs() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, TAU, false);
        let fragment = arc.svg_path_fragment();
        assert_eq!(fragment.matches('A').count(), 2, "{fragment}");
        let half = Arc::new(Point2::origin(), 2.0, 0.0, FRAC_PI_2, false);
        assert!(half.svg_path_fragment().starts_with("A 2 2 0 0 1 "));
        let back = Arc::new(Point2::origin(), 2.0, PI, 0.0, true);
        assert_eq!(back.svg_path_fragment(), "A 2 2 0 0 0 2 0");
    }

    #[test]
    fn similarity_transform_keeps_circle() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2, false);
        let matrix = translation(3.0, 1.0) * rotation(FRAC_PI_2) * scaling(2.0, 2.0);
        let transformed = arc.transformed(&matrix);
        let Segment::Arc(circle) = &transformed else {
            panic!("expected an arc, got {transformed:?}");
        };
        assert!((circle.radius() - 2.0).abs() < 1e-9);
        for &t in &[0.0, 0.5, 1.0] {
            let expected =
                crate::math::transform_2d::transform_point(&matrix, &arc.position_at(t));
            assert!((transformed.position_at(t) - expected).norm() < 1e-9);
        }
    }

    #[test]
    fn stretch_turns_arc_into_ellipse() {
        let arc = Arc::new(Point2::new(1.0, 1.0), 1.0, 0.3, 2.0, false);
        let matrix = scaling(3.0, 1.0);
        let transformed = arc.transformed(&matrix);
        assert!(matches!(transformed, Segment::EllipticalArc(_)));
        for &t in &[0.0, 0.4, 1.0] {
            let expected =
                crate::math::transform_2d::transform_point(&matrix, &arc.position_at(t));
            assert!((transformed.position_at(t) - expected).norm() < 1e-9, "t={t}");
        }
    }

    #[test]
    fn mirror_flips_direction() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, 1.0, false);
        let transformed = arc.transformed(&scaling(1.0, -1.0));
        let Segment::Arc(mirrored) = &transformed else {
            panic!("expected an arc, got {transformed:?}");
        };
        assert!(mirrored.anticlockwise());
        assert!((transformed.end() - Point2::new(1.0_f64.cos(), -1.0_f64.sin())).norm() < 1e-9);
    }
}
