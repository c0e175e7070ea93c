use crate::error::{OperationError, Result};
use crate::geometry::{Bounds2, Ray2, RayIntersection};
use crate::math::roots::solve_quadratic_roots_real;
use crate::math::transform_2d::transform_point;
use crate::math::{
    are_points_collinear, blend, cross, perpendicular, unit_or_zero, Matrix3, Point2, Vector2,
};
use crate::render::{svg::svg_point, PathSink};

use super::{
    bisected, ray_frame_coefficients, ray_hit, reversed_segments, Curve, Line, Segment,
    OFFSET_BISECTION_DEPTH,
};

/// Parameters this close to an end use the closed-form end curvature.
const END_CURVATURE_EPSILON: f64 = 1e-7;

/// Control points closer than this to an end are treated as sitting on it.
const COLLAPSED_CONTROL_EPSILON: f64 = 1e-12;

/// A quadratic Bezier segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadratic {
    start: Point2,
    control: Point2,
    end: Point2,
    start_tangent: Vector2,
    end_tangent: Vector2,
    bounds: Bounds2,
}

impl Quadratic {
    #[must_use]
    pub fn new(start: Point2, control: Point2, end: Point2) -> Self {
        let start_tangent = if start == control {
            end - start
        } else {
            control - start
        };
        let end_tangent = if end == control {
            end - start
        } else {
            end - control
        };
        let mut quadratic = Self {
            start,
            control,
            end,
            start_tangent: unit_or_zero(start_tangent),
            end_tangent: unit_or_zero(end_tangent),
            bounds: Bounds2::from_points(&start, &end),
        };
        quadratic.bounds = quadratic.compute_bounds();
        quadratic
    }

    #[must_use]
    pub fn control(&self) -> Point2 {
        self.control
    }

    /// Elevates to an equivalent cubic.
    #[must_use]
    pub fn degree_elevated(&self) -> super::Cubic {
        let control1 = self.start + (self.control - self.start) * (2.0 / 3.0);
        let control2 = self.end + (self.control - self.end) * (2.0 / 3.0);
        super::Cubic::new(self.start, control1, control2, self.end)
    }

    /// Parameter where the derivative along one axis vanishes, given the
    /// three coordinates on that axis.
    fn axis_critical_t(s: f64, c: f64, e: f64) -> Option<f64> {
        let denominator = s - 2.0 * c + e;
        if denominator == 0.0 {
            return None;
        }
        let t = (s - c) / denominator;
        (t > 0.0 && t < 1.0).then_some(t)
    }

    fn compute_bounds(&self) -> Bounds2 {
        let mut bounds = Bounds2::from_points(&self.start, &self.end);
        for t in [
            Self::axis_critical_t(self.start.x, self.control.x, self.end.x),
            Self::axis_critical_t(self.start.y, self.control.y, self.end.y),
        ]
        .into_iter()
        .flatten()
        {
            bounds = bounds.with_point(&self.position_at(t));
        }
        bounds
    }

    /// Control points translated along representative left normals by
    /// `distance`. Accurate for short, gently curving pieces.
    fn approximate_offset(&self, distance: f64) -> Self {
        let start_direction = if self.start == self.control {
            self.end - self.start
        } else {
            self.control - self.start
        };
        let end_direction = if self.end == self.control {
            self.end - self.start
        } else {
            self.end - self.control
        };
        let shift = |direction: Vector2| -perpendicular(unit_or_zero(direction)) * distance;
        Self::new(
            self.start + shift(start_direction),
            self.control + shift(self.end - self.start),
            self.end + shift(end_direction),
        )
    }

    fn offset_pieces(&self, distance: f64) -> Vec<Segment> {
        bisected(self, OFFSET_BISECTION_DEPTH)
            .iter()
            .map(|piece| piece.approximate_offset(distance).into())
            .collect()
    }

    /// Power-basis coefficients, constant term first.
    fn polynomial(&self) -> [Vector2; 3] {
        [
            self.start.coords,
            (self.control - self.start) * 2.0,
            self.start.coords - self.control.coords * 2.0 + self.end.coords,
        ]
    }
}

impl Curve for Quadratic {
    fn start(&self) -> Point2 {
        self.start
    }

    fn end(&self) -> Point2 {
        self.end
    }

    fn position_at(&self, t: f64) -> Point2 {
        let mt = 1.0 - t;
        Point2::from(
            self.start.coords * (mt * mt)
                + self.control.coords * (2.0 * mt * t)
                + self.end.coords * (t * t),
        )
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        (self.control - self.start) * (2.0 * (1.0 - t)) + (self.end - self.control) * (2.0 * t)
    }

    fn curvature_at(&self, t: f64) -> f64 {
        if (t - 0.5).abs() > 0.5 - END_CURVATURE_EPSILON {
            let (p0, p1, p2) = if t < 0.5 {
                (self.start, self.control, self.end)
            } else {
                (self.end, self.control, self.start)
            };
            let a = (p1 - p0).norm();
            if a <= COLLAPSED_CONTROL_EPSILON {
                // The control sits on the end, so the curve is straight there.
                return 0.0;
            }
            let h = cross(&(p1 - p0), &(p2 - p0)) / a;
            let sign = if t < 0.5 { 1.0 } else { -1.0 };
            sign * h / (2.0 * a * a)
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
        self.start == self.control && self.control == self.end
    }

    fn subdivided(&self, t: f64) -> (Self, Self) {
        let left_control = blend(&self.start, &self.control, t);
        let right_control = blend(&self.control, &self.end, t);
        let middle = blend(&left_control, &right_control, t);
        (
            Self::new(self.start, left_control, middle),
            Self::new(middle, right_control, self.end),
        )
    }

    fn reversed(&self) -> Self {
        Self::new(self.end, self.control, self.start)
    }

    fn transformed(&self, matrix: &Matrix3) -> Segment {
        Self::new(
            transform_point(matrix, &self.start),
            transform_point(matrix, &self.control),
            transform_point(matrix, &self.end),
        )
        .into()
    }

    fn nondegenerate_segments(&self) -> Vec<Segment> {
        let (start, control, end) = (self.start, self.control, self.end);
        let lines = |points: &[Point2]| -> Vec<Segment> {
            points
                .windows(2)
                .map(|pair| Line::new(pair[0], pair[1]))
                .filter(|line| !line.is_invalid())
                .map(Segment::from)
                .collect()
        };

        if start == control && control == end {
            return Vec::new();
        }
        if start == end {
            // Out and back along the same direction.
            return lines(&[start, self.position_at(0.5), end]);
        }
        if are_points_collinear(&start, &control, &end, 0.0) {
            if start == control || end == control {
                return lines(&[start, end]);
            }
            let delta = end - start;
            let k = (control - start).dot(&delta) / delta.norm_squared();
            if (0.0..=1.0).contains(&k) {
                return lines(&[start, end]);
            }
            // The control projects outside the chord: split at the extremum.
            let extremum = self.position_at(k / (2.0 * k - 1.0));
            return lines(&[start, extremum, end]);
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
        solve_quadratic_roots_real(f[2], f[1], f[0])
            .into_iter()
            .filter_map(|t| ray_hit(ray, self.position_at(t), &self.tangent_at(t), t))
            .collect()
    }

    fn signed_area_fragment(&self) -> f64 {
        let (p0, p1, p2) = (self.start.coords, self.control.coords, self.end.coords);
        (2.0 * cross(&p0, &p1) + 2.0 * cross(&p1, &p2) + cross(&p0, &p2)) / 6.0
    }

    fn svg_path_fragment(&self) -> String {
        format!("Q {} {}", svg_point(&self.control), svg_point(&self.end))
    }

    fn write_to_context(&self, sink: &mut dyn PathSink) {
        sink.quadratic_curve_to(&self.control, &self.end);
    }

    fn intersects_bounds(&self, _bounds: &Bounds2) -> Result<bool> {
        Err(OperationError::Unimplemented("Quadratic::intersects_bounds").into())
    }
}
