use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::{Bounds2, Ray2, RayIntersection};
use crate::math::arc_2d::{actual_end_angle, arc_contains_angle, arc_t_at_angle};
use crate::math::transform_2d::{
    linear_determinant, rotation, scaling, transform_point, transform_vector, translation,
};
use crate::math::{cross, unit_or_zero, Matrix3, Point2, Vector2, TOLERANCE};
use crate::render::{svg::svg_number, svg::svg_point, PathSink};

use super::{ray_hit, reversed_segments, sampled_offset, Arc, Curve, Segment};

/// Sweeps within this of a full turn are written as two SVG arcs.
const SVG_FULL_TURN_EPSILON: f64 = 0.01;

/// An arc of a rotated ellipse with canvas `ellipse()` angle semantics.
///
/// Angles are parametric: the point at angle `a` is
/// `center + R(rotation) * (radius_x * cos(a), radius_y * sin(a))`.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArc {
    center: Point2,
    radius_x: f64,
    radius_y: f64,
    rotation: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
    actual_end_angle: f64,
    unit_transform: Matrix3,
    start_tangent: Vector2,
    end_tangent: Vector2,
    bounds: Bounds2,
}

impl EllipticalArc {
    /// Creates an elliptical arc.
    ///
    /// A non-positive radius or zero sweep gives an invalid arc. Sweeps
    /// beyond a full turn are clamped to one turn rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidEllipse`] if `radius_x < radius_y`.
    /// Rotate by a quarter turn and swap the radii to describe such an
    /// ellipse.
    pub fn new(
        center: Point2,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> Result<Self> {
        if radius_x < radius_y {
            return Err(GeometryError::InvalidEllipse { radius_x, radius_y }.into());
        }
        Ok(Self::from_parts(
            center,
            radius_x,
            radius_y,
            rotation,
            start_angle,
            end_angle,
            anticlockwise,
        ))
    }

    pub(crate) fn from_parts(
        center: Point2,
        radius_x: f64,
        radius_y: f64,
        rotation_angle: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> Self {
        let actual_end_angle = actual_end_angle(start_angle, end_angle, anticlockwise);
        let unit_transform = translation(center.x, center.y)
            * rotation(rotation_angle)
            * scaling(radius_x, radius_y);
        let mut arc = Self {
            center,
            radius_x,
            radius_y,
            rotation: rotation_angle,
            start_angle,
            end_angle,
            anticlockwise,
            actual_end_angle,
            unit_transform,
            start_tangent: Vector2::zeros(),
            end_tangent: Vector2::zeros(),
            bounds: Bounds2::EMPTY,
        };
        arc.start_tangent = unit_or_zero(arc.tangent_at(0.0));
        arc.end_tangent = unit_or_zero(arc.tangent_at(1.0));
        arc.bounds = arc.compute_bounds();
        arc
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[must_use]
    pub fn radius_x(&self) -> f64 {
        self.radius_x
    }

    #[must_use]
    pub fn radius_y(&self) -> f64 {
        self.radius_y
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    #[must_use]
    pub fn anticlockwise(&self) -> bool {
        self.anticlockwise
    }

    #[must_use]
    pub fn actual_end_angle(&self) -> f64 {
        self.actual_end_angle
    }

    /// Signed sweep, negative when anticlockwise.
    #[must_use]
    pub fn angle_difference(&self) -> f64 {
        self.actual_end_angle - self.start_angle
    }

    #[must_use]
    pub fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + self.angle_difference() * t
    }

    #[must_use]
    pub fn t_at_angle(&self, angle: f64) -> f64 {
        arc_t_at_angle(self.start_angle, self.angle_difference(), angle)
    }

    #[must_use]
    pub fn contains_angle(&self, angle: f64) -> bool {
        arc_contains_angle(self.start_angle, self.angle_difference(), angle)
    }

    /// Maps the unit circle onto this ellipse.
    #[must_use]
    pub fn unit_transform(&self) -> &Matrix3 {
        &self.unit_transform
    }

    fn inverse_unit_transform(&self) -> Matrix3 {
        scaling(1.0 / self.radius_x, 1.0 / self.radius_y)
            * rotation(-self.rotation)
            * translation(-self.center.x, -self.center.y)
    }

    fn point_at_angle(&self, angle: f64) -> Point2 {
        transform_point(&self.unit_transform, &Point2::new(angle.cos(), angle.sin()))
    }

    fn compute_bounds(&self) -> Bounds2 {
        let (sin, cos) = self.rotation.sin_cos();
        let x_critical = (-self.radius_y * sin).atan2(self.radius_x * cos);
        let y_critical = (self.radius_y * cos).atan2(self.radius_x * sin);
        let mut bounds = Bounds2::from_points(&self.start(), &self.end());
        for angle in [x_critical, x_critical + PI, y_critical, y_critical + PI] {
            if self.contains_angle(angle) {
                bounds = bounds.with_point(&self.point_at_angle(angle));
            }
        }
        bounds
    }

    fn arc_from_angles(&self, start_angle: f64, end_angle: f64) -> Self {
        Self::from_parts(
            self.center,
            self.radius_x,
            self.radius_y,
            self.rotation,
            start_angle,
            end_angle,
            self.anticlockwise,
        )
    }

    fn svg_arc_command(&self, sweep: f64, angle: f64) -> String {
        let large_arc = u8::from(sweep.abs() > PI);
        let sweep_flag = u8::from(sweep > 0.0);
        format!(
            "A {} {} {} {large_arc} {sweep_flag} {}",
            svg_number(self.radius_x),
            svg_number(self.radius_y),
            svg_number(self.rotation.to_degrees()),
            svg_point(&self.point_at_angle(angle))
        )
    }
}

impl Curve for EllipticalArc {
    fn start(&self) -> Point2 {
        self.position_at(0.0)
    }

    fn end(&self) -> Point2 {
        self.position_at(1.0)
    }

    fn position_at(&self, t: f64) -> Point2 {
        self.point_at_angle(self.angle_at(t))
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        let angle = self.angle_at(t);
        transform_vector(
            &self.unit_transform,
            &Vector2::new(-angle.sin(), angle.cos()),
        ) * self.angle_difference()
    }

    fn curvature_at(&self, t: f64) -> f64 {
        let (sin, cos) = self.angle_at(t).sin_cos();
        let a = self.radius_x * sin;
        let b = self.radius_y * cos;
        let sign = if self.angle_difference() >= 0.0 {
            1.0
        } else {
            -1.0
        };
        sign * self.radius_x * self.radius_y / (a * a + b * b).powf(1.5)
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
        self.radius_x <= 0.0 || self.radius_y <= 0.0 || self.start_angle == self.actual_end_angle
    }

    fn subdivided(&self, t: f64) -> (Self, Self) {
        let middle = self.angle_at(t);
        (
            self.arc_from_angles(self.start_angle, middle),
            self.arc_from_angles(middle, self.actual_end_angle),
        )
    }

    fn reversed(&self) -> Self {
        Self::from_parts(
            self.center,
            self.radius_x,
            self.radius_y,
            self.rotation,
            self.actual_end_angle,
            self.start_angle,
            !self.anticlockwise,
        )
    }

    fn transformed(&self, matrix: &Matrix3) -> Segment {
        transformed_ellipse(
            matrix,
            &self.center,
            self.radius_x,
            self.radius_y,
            self.rotation,
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
        if self.is_invalid() {
            return Vec::new();
        }
        // Intersect against the unit circle in the ellipse's own frame, then
        // measure the hits back in world space.
        let inverse = self.inverse_unit_transform();
        let Ok(local_ray) = Ray2::new(
            transform_point(&inverse, ray.origin()),
            transform_vector(&inverse, ray.direction()),
        ) else {
            return Vec::new();
        };
        let unit_arc = Arc::new(
            Point2::origin(),
            1.0,
            self.start_angle,
            self.actual_end_angle,
            self.anticlockwise,
        );
        unit_arc
            .ray_circle_ts(&local_ray)
            .into_iter()
            .filter_map(|(t, _)| ray_hit(ray, self.position_at(t), &self.tangent_at(t), t))
            .collect()
    }

    fn signed_area_fragment(&self) -> f64 {
        let (start, end) = (self.start_angle, self.actual_end_angle);
        let chord = transform_vector(
            &self.unit_transform,
            &Vector2::new(end.cos() - start.cos(), end.sin() - start.sin()),
        );
        0.5 * (self.radius_x * self.radius_y * (end - start) + cross(&self.center.coords, &chord))
    }

    fn svg_path_fragment(&self) -> String {
        let sweep = self.angle_difference();
        if sweep.abs() > TAU - SVG_FULL_TURN_EPSILON {
            format!(
                "{} {}",
                self.svg_arc_command(sweep / 2.0, self.angle_at(0.5)),
                self.svg_arc_command(sweep / 2.0, self.actual_end_angle)
            )
        } else {
            self.svg_arc_command(sweep, self.actual_end_angle)
        }
    }

    fn write_to_context(&self, sink: &mut dyn PathSink) {
        sink.ellipse(
            &self.center,
            self.radius_x,
            self.radius_y,
            self.rotation,
            self.start_angle,
            self.actual_end_angle,
            self.anticlockwise,
        );
    }

    fn intersects_bounds(&self, _bounds: &Bounds2) -> Result<bool> {
        Err(OperationError::Unimplemented("EllipticalArc::intersects_bounds").into())
    }
}

/// Maps an elliptical (or circular) arc through an affine transform.
///
/// The image of an ellipse under an affine map is an ellipse whose axes are
/// the singular directions of the combined linear part. The sweep magnitude
/// is preserved and its sign flips under reflections. Equal radii produce an
/// [`Arc`].
pub(crate) fn transformed_ellipse(
    matrix: &Matrix3,
    center: &Point2,
    radius_x: f64,
    radius_y: f64,
    rotation_angle: f64,
    start_angle: f64,
    sweep: f64,
) -> Segment {
    let (sin, cos) = rotation_angle.sin_cos();
    let column_x = transform_vector(matrix, &Vector2::new(cos * radius_x, sin * radius_x));
    let column_y = transform_vector(matrix, &Vector2::new(-sin * radius_y, cos * radius_y));

    // Eigen-decomposition of L * L^T for the new axes.
    let p = column_x.x * column_x.x + column_y.x * column_y.x;
    let q = column_x.x * column_x.y + column_y.x * column_y.y;
    let r = column_x.y * column_x.y + column_y.y * column_y.y;
    let mean = 0.5 * (p + r);
    let spread = (0.25 * (p - r) * (p - r) + q * q).sqrt();
    let major = (mean + spread).max(0.0).sqrt();
    let minor = (mean - spread).max(0.0).sqrt();

    let new_center = transform_point(matrix, center);
    let (start_sin, start_cos) = start_angle.sin_cos();
    let start_offset = column_x * start_cos + column_y * start_sin;
    let sweep = if linear_determinant(matrix) < 0.0 {
        -sweep
    } else {
        sweep
    };
    let anticlockwise = sweep < 0.0;

    if major - minor <= TOLERANCE * major.max(1.0) {
        let start = start_offset.y.atan2(start_offset.x);
        return Arc::new(new_center, major, start, start + sweep, anticlockwise).into();
    }

    let axis_angle = 0.5 * (2.0 * q).atan2(p - r);
    let (axis_sin, axis_cos) = axis_angle.sin_cos();
    let local_x = axis_cos * start_offset.x + axis_sin * start_offset.y;
    let local_y = -axis_sin * start_offset.x + axis_cos * start_offset.y;
    let start = if minor > 0.0 {
        (local_y / minor).atan2(local_x / major)
    } else {
        0.0
    };
    EllipticalArc::from_parts(
        new_center,
        major,
        minor,
        axis_angle,
        start,
        start + sweep,
        anticlockwise,
    )
    .into()
}
