use tracing::trace;

use crate::error::{OperationError, Result};
use crate::geometry::{Bounds2, Ray2, RayIntersection};
use crate::math::roots::{solve_cubic_roots_real, solve_quadratic_roots_real};
use crate::math::transform_2d::transform_point;
use crate::math::{
    are_points_collinear, blend, cross, perpendicular, points_equal_eps, unit_or_zero, Matrix3,
    Point2, Vector2,
};
use crate::render::{svg::svg_point, PathSink};

use super::{
    bisected, ray_frame_coefficients, ray_hit, reversed_segments, Curve, Line, Quadratic, Segment,
    OFFSET_BISECTION_DEPTH,
};

/// Parameters this close to an end use the closed-form end curvature.
const END_CURVATURE_EPSILON: f64 = 1e-7;

/// Handles shorter than this are treated as collapsed onto their endpoint.
const COLLAPSED_HANDLE_EPSILON: f64 = 1e-12;

/// Tangent magnitude below which a critical parameter is a cusp.
const CUSP_TANGENT_EPSILON: f64 = 1e-7;

/// Tolerance for recognizing a cubic that is exactly a degree-elevated
/// quadratic.
const DEGREE_REDUCTION_EPSILON: f64 = 1e-9;

/// A cubic Bezier segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Cubic {
    start: Point2,
    control1: Point2,
    control2: Point2,
    end: Point2,
    start_tangent: Vector2,
    end_tangent: Vector2,
    bounds: Bounds2,
    cusp_t: Option<f64>,
}

impl Cubic {
    #[must_use]
    pub fn new(start: Point2, control1: Point2, control2: Point2, end: Point2) -> Self {
        let start_tangent = if start != control1 {
            control1 - start
        } else if start != control2 {
            control2 - start
        } else {
            end - start
        };
        let end_tangent = if end != control2 {
            end - control2
        } else if end != control1 {
            end - control1
        } else {
            end - start
        };
        let mut cubic = Self {
            start,
            control1,
            control2,
            end,
            start_tangent: unit_or_zero(start_tangent),
            end_tangent: unit_or_zero(end_tangent),
            bounds: Bounds2::from_points(&start, &end),
            cusp_t: None,
        };
        cubic.bounds = cubic.compute_bounds();
        cubic.cusp_t = cubic.compute_cusp_t();
        cubic
    }

    #[must_use]
    pub fn control1(&self) -> Point2 {
        self.control1
    }

    #[must_use]
    pub fn control2(&self) -> Point2 {
        self.control2
    }

    /// Power-basis coefficients, constant term first.
    fn polynomial(&self) -> [Vector2; 4] {
        let (s, c1, c2, e) = (
            self.start.coords,
            self.control1.coords,
            self.control2.coords,
            self.end.coords,
        );
        [
            s,
            (c1 - s) * 3.0,
            (s - c1 * 2.0 + c2) * 3.0,
            -s + c1 * 3.0 - c2 * 3.0 + e,
        ]
    }

    /// Parameters in `(0, 1)` where the derivative along one axis vanishes.
    fn axis_critical_ts(s: f64, c1: f64, c2: f64, e: f64) -> Vec<f64> {
        let a = -s + 3.0 * c1 - 3.0 * c2 + e;
        let b = 2.0 * (s - 2.0 * c1 + c2);
        let c = c1 - s;
        solve_quadratic_roots_real(a, b, c)
            .into_iter()
            .filter(|t| *t > 0.0 && *t < 1.0)
            .collect()
    }

    fn compute_bounds(&self) -> Bounds2 {
        let mut ts = Self::axis_critical_ts(self.start.x, self.control1.x, self.control2.x, self.end.x);
        ts.extend(Self::axis_critical_ts(
            self.start.y,
            self.control1.y,
            self.control2.y,
            self.end.y,
        ));
        ts.iter().fold(
            Bounds2::from_points(&self.start, &self.end),
            |bounds, &t| bounds.with_point(&self.position_at(t)),
        )
    }

    /// Locates a cusp with Hain's closed form: where the control polygon
    /// folds back, the derivative's components share a root.
    fn compute_cusp_t(&self) -> Option<f64> {
        let (s, c1, c2, e) = (
            self.start.coords,
            self.control1.coords,
            self.control2.coords,
            self.end.coords,
        );
        let a = -s + c1 * 3.0 - c2 * 3.0 + e;
        let b = s * 3.0 - c1 * 6.0 + c2 * 3.0;
        let c = (c1 - s) * 3.0;
        let denominator = perpendicular(a).dot(&b);
        if denominator == 0.0 {
            return None;
        }
        let t = -0.5 * perpendicular(a).dot(&c) / denominator;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        (self.tangent_at(t).norm() < CUSP_TANGENT_EPSILON).then_some(t)
    }

    /// Parameter of the cusp, if the cubic has one.
    #[must_use]
    pub fn cusp_t(&self) -> Option<f64> {
        self.cusp_t
    }

    #[must_use]
    pub fn has_cusp(&self) -> bool {
        self.cusp_t.is_some()
    }

    /// The two quadratics that replace the cubic on either side of its cusp,
    /// giving joins at the cusp well-defined tangents.
    #[must_use]
    pub fn cusp_quadratics(&self) -> Option<(Quadratic, Quadratic)> {
        let t = self.cusp_t?;
        let (head, tail) = self.subdivided(t);
        let cusp = head.end;
        trace!(t, "replacing cubic cusp with quadratics");
        Some((
            Quadratic::new(self.start, head.control1, cusp),
            Quadratic::new(cusp, tail.control2, self.end),
        ))
    }

    /// Control points translated along representative left normals by
    /// `distance`.
    fn approximate_offset(&self, distance: f64) -> Self {
        let start_direction = if self.start == self.control1 {
            self.control2 - self.start
        } else {
            self.control1 - self.start
        };
        let end_direction = if self.end == self.control2 {
            self.end - self.control1
        } else {
            self.end - self.control2
        };
        let shift = |direction: Vector2| -perpendicular(unit_or_zero(direction)) * distance;
        Self::new(
            self.start + shift(start_direction),
            self.control1 + shift(self.control2 - self.start),
            self.control2 + shift(self.end - self.control1),
            self.end + shift(end_direction),
        )
    }

    fn offset_pieces(&self, distance: f64) -> Vec<Segment> {
        bisected(self, OFFSET_BISECTION_DEPTH)
            .iter()
            .map(|piece| piece.approximate_offset(distance).into())
            .collect()
    }

    /// Lines through the extrema of a cubic whose points all lie on one line.
    fn collinear_lines(&self) -> Vec<Segment> {
        let direction = [self.end, self.control1, self.control2]
            .iter()
            .map(|p| p - self.start)
            .find(|d| d.norm_squared() > 0.0)
            .unwrap_or_else(Vector2::zeros);
        let project = |p: &Point2| (p - self.start).dot(&direction);
        let mut ts = Self::axis_critical_ts(
            0.0,
            project(&self.control1),
            project(&self.control2),
            project(&self.end),
        );
        ts.sort_by(f64::total_cmp);

        let mut points = vec![self.start];
        points.extend(ts.iter().map(|&t| self.position_at(t)));
        points.push(self.end);
        points
            .windows(2)
            .map(|pair| Line::new(pair[0], pair[1]))
            .filter(|line| !line.is_invalid())
            .map(Segment::from)
            .collect()
    }
}

impl Curve for Cubic {
    fn start(&self) -> Point2 {
        self.start
    }

    fn end(&self) -> Point2 {
        self.end
    }

    fn position_at(&self, t: f64) -> Point2 {
        let mt = 1.0 - t;
        Point2::from(
            self.start.coords * (mt * mt * mt)
                + self.control1.coords * (3.0 * mt * mt * t)
                + self.control2.coords * (3.0 * mt * t * t)
                + self.end.coords * (t * t * t),
        )
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        let mt = 1.0 - t;
        (self.control1 - self.start) * (3.0 * mt * mt)
            + (self.control2 - self.control1) * (6.0 * mt * t)
            + (self.end - self.control2) * (3.0 * t * t)
    }

    fn curvature_at(&self, t: f64) -> f64 {
        if (t - 0.5).abs() > 0.5 - END_CURVATURE_EPSILON {
            let (p0, p1, p2, p3, sign) = if t < 0.5 {
                (self.start, self.control1, self.control2, self.end, 1.0)
            } else {
                (self.end, self.control2, self.control1, self.start, -1.0)
            };
            sign * end_curvature(p0, p1, p2, p3)
        } else {
            self.subdivided(t).0.curvature_at(1.0)
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
        self.start == self.control1 && self.control1 == self.control2 && self.control2 == self.end
    }

    fn subdivided(&self, t: f64) -> (Self, Self) {
        let ab = blend(&self.start, &self.control1, t);
        let bc = blend(&self.control1, &self.control2, t);
        let cd = blend(&self.control2, &self.end, t);
        let abc = blend(&ab, &bc, t);
        let bcd = blend(&bc, &cd, t);
        let middle = blend(&abc, &bcd, t);
        (
            Self::new(self.start, ab, abc, middle),
            Self::new(middle, bcd, cd, self.end),
        )
    }

    fn reversed(&self) -> Self {
        Self::new(self.end, self.control2, self.control1, self.start)
    }

    fn transformed(&self, matrix: &Matrix3) -> Segment {
        Self::new(
            transform_point(matrix, &self.start),
            transform_point(matrix, &self.control1),
            transform_point(matrix, &self.control2),
            transform_point(matrix, &self.end),
        )
        .into()
    }

    fn nondegenerate_segments(&self) -> Vec<Segment> {
        if self.is_invalid() {
            return Vec::new();
        }
        let quadratic_control1 = Point2::from((self.control1.coords * 3.0 - self.start.coords) / 2.0);
        let quadratic_control2 = Point2::from((self.control2.coords * 3.0 - self.end.coords) / 2.0);
        if points_equal_eps(&quadratic_control1, &quadratic_control2, DEGREE_REDUCTION_EPSILON) {
            return Quadratic::new(self.start, quadratic_control1, self.end).nondegenerate_segments();
        }
        if are_points_collinear(&self.start, &self.control1, &self.end, 0.0)
            && are_points_collinear(&self.start, &self.control2, &self.end, 0.0)
            && are_points_collinear(&self.control1, &self.control2, &self.end, 0.0)
        {
            return self.collinear_lines();
        }
        vec![self.clone().into()]
    }

    fn stroke_left(&self, line_width: f64) -> Vec<Segment> {
        self.offset_pieces(line_width / 2.0)
    }

    fn stroke_right(&self, line_width: f64) -> Vec<Segment> {
        reversed_segments(&self.offset_pieces(-line_width / 2.0))
    }

    fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection> {
        let f = ray_frame_coefficients(ray, &self.polynomial());
        solve_cubic_roots_real(f[3], f[2], f[1], f[0])
            .into_iter()
            .filter_map(|t| ray_hit(ray, self.position_at(t), &self.tangent_at(t), t))
            .collect()
    }

    fn signed_area_fragment(&self) -> f64 {
        let (p0, p1, p2, p3) = (
            self.start.coords,
            self.control1.coords,
            self.control2.coords,
            self.end.coords,
        );
        (6.0 * cross(&p0, &p1)
            + 3.0 * cross(&p0, &p2)
            + cross(&p0, &p3)
            + 3.0 * cross(&p1, &p2)
            + 3.0 * cross(&p1, &p3)
            + 6.0 * cross(&p2, &p3))
            / 20.0
    }

    fn svg_path_fragment(&self) -> String {
        format!(
            "C {} {} {}",
            svg_point(&self.control1),
            svg_point(&self.control2),
            svg_point(&self.end)
        )
    }

    fn write_to_context(&self, sink: &mut dyn PathSink) {
        sink.bezier_curve_to(&self.control1, &self.control2, &self.end);
    }

    fn intersects_bounds(&self, _bounds: &Bounds2) -> Result<bool> {
        Err(OperationError::Unimplemented("Cubic::intersects_bounds").into())
    }
}

/// Curvature at `p0` of the cubic `p0, p1, p2, p3`.
///
/// When the handle `p1` collapses onto `p0` the end is measured as the
/// quadratic `p0, p2, p3` instead. With both handles collapsed the end is
/// straight.
fn end_curvature(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> f64 {
    let a = (p1 - p0).norm();
    if a > COLLAPSED_HANDLE_EPSILON {
        let h = cross(&(p1 - p0), &(p2 - p0)) / a;
        return h * 2.0 / (3.0 * a * a);
    }
    let a = (p2 - p0).norm();
    if a > COLLAPSED_HANDLE_EPSILON {
        let h = cross(&(p2 - p0), &(p3 - p0)) / a;
        return h / (2.0 * a * a);
    }
    0.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cusp_cubic() -> Cubic {
        // Symmetric control polygon that folds back on itself.
        Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(2.0, 0.0),
        )
    }

    #[test]
    fn detects_cusp_at_midpoint() {
        let cubic = cusp_cubic();
        let t = cubic.cusp_t().unwrap();
        assert!((t - 0.5).abs() < 1e-12, "t={t}");
        assert!(cubic.tangent_at(t).norm() < 1e-9);
    }

    #[test]
    fn smooth_cubic_has_no_cusp() {
        let cubic = Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        );
        assert!(!cubic.has_cusp());
        assert!(cubic.cusp_quadratics().is_none());
    }

    #[test]
    fn cusp_quadratics_meet_at_cusp() {
        let cubic = cusp_cubic();
        let (head, tail) = cubic.cusp_quadratics().unwrap();
        let cusp = cubic.position_at(0.5);
        assert_eq!(head.start(), cubic.start());
        assert!((head.end() - cusp).norm() < 1e-12);
        assert!((tail.start() - cusp).norm() < 1e-12);
        assert_eq!(tail.end(), cubic.end());
        assert!(head.end_tangent().norm() > 0.5);
        assert!(tail.start_tangent().norm() > 0.5);
    }

    #[test]
    fn elevated_quadratic_reduces() {
        let quadratic = Quadratic::new(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(6.0, 0.0),
        );
        let segments = quadratic.degree_elevated().nondegenerate_segments();
        assert_eq!(segments.len(), 1);
        match &segments[0] {
            Segment::Quadratic(reduced) => {
                assert!((reduced.control() - Point2::new(3.0, 3.0)).norm() < 1e-12);
            }
            other => panic!("expected a quadratic, got {other:?}"),
        }
    }

    #[test]
    fn collinear_cubic_becomes_lines_through_extrema() {
        let cubic = Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(-1.0, 0.0),
            Point2::new(1.0, 0.0),
        );
        let segments = cubic.nondegenerate_segments();
        assert!(segments.len() >= 2, "segments={segments:?}");
        assert!(segments.iter().all(|s| matches!(s, Segment::Line(_))));
        assert_eq!(segments.first().unwrap().start(), cubic.start());
        assert_eq!(segments.last().unwrap().end(), cubic.end());
        let bounds = segments
            .iter()
            .fold(Bounds2::EMPTY, |b, s| b.union(&s.bounds()));
        assert!(bounds.equals_epsilon(&cubic.bounds(), 1e-9));
    }

    #[test]
    fn all_equal_is_dropped() {
        let p = Point2::new(1.0, 1.0);
        assert!(Cubic::new(p, p, p, p).nondegenerate_segments().is_empty());
    }

    #[test]
    fn curvature_matches_derivative_formula() {
        // Quarter circle approximation, turning toward increasing angle.
        let k = 0.552_284_749_831;
        let cubic = Cubic::new(
            Point2::new(1.0, 0.0),
            Point2::new(1.0, k),
            Point2::new(k, 1.0),
            Point2::new(0.0, 1.0),
        );
        let second_derivative = |t: f64| {
            ((cubic.control2() - cubic.control1() * 2.0 + cubic.start().coords) * (1.0 - t)
                + (cubic.end() - cubic.control2() * 2.0 + cubic.control1().coords) * t)
                * 6.0
        };
        for &t in &[0.0, 0.25, 0.5, 0.75, 1.0] {
            let d1 = cubic.tangent_at(t);
            let expected = cross(&d1, &second_derivative(t)) / d1.norm().powi(3);
            let curvature = cubic.curvature_at(t);
            assert!((curvature - expected).abs() < 1e-6, "t={t}: {curvature} vs {expected}");
            assert!((curvature - 1.0).abs() < 0.05, "t={t}: {curvature}");
        }
    }

    #[test]
    fn curvature_with_collapsed_handle_is_finite() {
        // Smooth curve commands after a line put control1 on the start.
        let (a, b, c) = (
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
        );
        let expected = -(2.0_f64.sqrt()) / 4.0;

        let head = Cubic::new(a, a, b, c);
        let at_start = head.curvature_at(0.0);
        assert!(at_start.is_finite());
        assert!((at_start - expected).abs() < 1e-12, "{at_start}");
        assert!((at_start - Quadratic::new(a, b, c).curvature_at(0.0)).abs() < 1e-12);

        let tail = Cubic::new(a, b, c, c);
        let at_end = tail.curvature_at(1.0);
        assert!(at_end.is_finite());
        assert!((at_end - expected).abs() < 1e-12, "{at_end}");

        // Both handles on the start leave a straight end.
        assert!(Cubic::new(a, a, a, c).curvature_at(0.0).abs() < 1e-12);
    }

    #[test]
    fn ray_crosses_s_curve_three_times() {
        let cubic = Cubic::new(
            Point2::new(0.0, -1.0),
            Point2::new(0.0, 3.0),
            Point2::new(3.0, -3.0),
            Point2::new(3.0, 1.0),
        );
        let ray = Ray2::new(Point2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        let hits = cubic.intersection(&ray);
        assert_eq!(hits.len(), 3, "hits={hits:?}");
        assert_eq!(hits.iter().map(|h| h.wind).sum::<i32>(), 1);
    }
}
