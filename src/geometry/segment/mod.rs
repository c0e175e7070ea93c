//! Parametric path segments.
//!
//! Each variant is an immutable value that caches its unit end tangents and
//! bounds at construction. Degenerate segments are still constructible; they
//! report [`Curve::is_invalid`] and are filtered out by the path builders.

mod arc;
mod cubic;
mod elliptical_arc;
mod line;
mod quadratic;

pub use arc::Arc;
pub use cubic::Cubic;
pub use elliptical_arc::EllipticalArc;
pub use line::Line;
pub use quadratic::Quadratic;

use crate::error::Result;
use crate::geometry::{Bounds2, Ray2, RayIntersection};
use crate::math::{cross, perpendicular, unit_or_zero, Matrix3, Point2, Vector2};
use crate::render::PathSink;

/// Bisection depth used when offsetting Bezier segments (32 pieces).
pub const OFFSET_BISECTION_DEPTH: usize = 5;

/// Number of straight lines approximating an offset arc.
pub const ARC_OFFSET_PIECES: usize = 32;

/// Two endpoints closer than this make a segment zero-length.
pub const POINT_EPSILON: f64 = 1e-10;

/// Maximum recursion depth for adaptive arc length.
const ARC_LENGTH_MAX_LEVELS: u32 = 15;

/// Absolute chord error below which arc length recursion stops.
const ARC_LENGTH_DISTANCE_EPSILON: f64 = 1e-10;

/// Relative chord error below which arc length recursion stops.
const ARC_LENGTH_CURVE_EPSILON: f64 = 1e-8;

/// Parametric curve contract shared by every segment variant.
///
/// The parameter `t` runs over `[0, 1]` from [`Curve::start`] to
/// [`Curve::end`].
pub trait Curve {
    fn start(&self) -> Point2;

    fn end(&self) -> Point2;

    /// Point on the curve at `t`.
    fn position_at(&self, t: f64) -> Point2;

    /// Derivative of [`Curve::position_at`] with respect to `t`; not normalized.
    fn tangent_at(&self, t: f64) -> Vector2;

    /// Signed curvature at `t`, positive when the direction of travel turns
    /// toward increasing polar angle.
    fn curvature_at(&self, t: f64) -> f64;

    /// Unit tangent at the start, in the direction of travel.
    fn start_tangent(&self) -> Vector2;

    /// Unit tangent at the end, in the direction of travel.
    fn end_tangent(&self) -> Vector2;

    /// Tight axis-aligned bounds of the whole curve.
    fn bounds(&self) -> Bounds2;

    /// Whether the segment is degenerate and should not be drawn.
    fn is_invalid(&self) -> bool;

    /// Splits at `t` into two segments of the same kind covering `[0, t]`
    /// and `[t, 1]`.
    fn subdivided(&self, t: f64) -> (Self, Self)
    where
        Self: Sized;

    /// The same curve traversed from end to start.
    #[must_use]
    fn reversed(&self) -> Self
    where
        Self: Sized;

    /// The curve under an affine transform.
    fn transformed(&self, matrix: &Matrix3) -> Segment;

    /// Drawable replacements for this segment: empty when degenerate,
    /// simpler segments when the geometry reduces, otherwise the segment
    /// itself.
    fn nondegenerate_segments(&self) -> Vec<Segment>;

    /// The curve offset by half of `line_width` to the left of travel.
    fn stroke_left(&self, line_width: f64) -> Vec<Segment>;

    /// The curve offset by half of `line_width` to the right of travel,
    /// walking from end to start.
    fn stroke_right(&self, line_width: f64) -> Vec<Segment>;

    /// Crossings with `ray`, in no particular order.
    fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection>;

    /// Contribution of this segment to a closed path's signed area.
    fn signed_area_fragment(&self) -> f64;

    /// SVG path data for this segment, without the leading move.
    fn svg_path_fragment(&self) -> String;

    /// Emits this segment as drawing calls, assuming the sink's current
    /// point is already at [`Curve::start`].
    fn write_to_context(&self, sink: &mut dyn PathSink);

    /// Whether any part of the segment lies inside `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OperationError::Unimplemented`] for variants
    /// without an exact test.
    fn intersects_bounds(&self, bounds: &Bounds2) -> Result<bool>;

    /// Sum of the winding contributions of every crossing with `ray`.
    fn winding_intersection(&self, ray: &Ray2) -> i32 {
        self.intersection(ray).iter().map(|hit| hit.wind).sum()
    }

    /// Length of the curve.
    fn arc_length(&self) -> f64 {
        adaptive_arc_length(
            self,
            0.0,
            1.0,
            &self.start(),
            &self.end(),
            ARC_LENGTH_MAX_LEVELS,
        )
    }

    /// Splits at every parameter in `ts`, which must be sorted ascending.
    /// Parameters outside `(0, 1)` are ignored.
    fn subdivisions(&self, ts: &[f64]) -> Vec<Self>
    where
        Self: Sized + Clone,
    {
        let mut pieces = Vec::with_capacity(ts.len() + 1);
        let mut remaining = self.clone();
        let mut last_t = 0.0;
        for &t in ts {
            if t <= last_t || t >= 1.0 {
                continue;
            }
            let (head, tail) = remaining.subdivided((t - last_t) / (1.0 - last_t));
            pieces.push(head);
            remaining = tail;
            last_t = t;
        }
        pieces.push(remaining);
        pieces
    }
}

/// A path segment of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line(Line),
    Quadratic(Quadratic),
    Cubic(Cubic),
    Arc(Arc),
    EllipticalArc(EllipticalArc),
}

macro_rules! dispatch {
    ($segment:expr, $inner:ident => $body:expr) => {
        match $segment {
            Segment::Line($inner) => $body,
            Segment::Quadratic($inner) => $body,
            Segment::Cubic($inner) => $body,
            Segment::Arc($inner) => $body,
            Segment::EllipticalArc($inner) => $body,
        }
    };
}

fn into_pair<T: Into<Segment>>((head, tail): (T, T)) -> (Segment, Segment) {
    (head.into(), tail.into())
}

impl Curve for Segment {
    fn start(&self) -> Point2 {
        dispatch!(self, s => s.start())
    }

    fn end(&self) -> Point2 {
        dispatch!(self, s => s.end())
    }

    fn position_at(&self, t: f64) -> Point2 {
        dispatch!(self, s => s.position_at(t))
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        dispatch!(self, s => s.tangent_at(t))
    }

    fn curvature_at(&self, t: f64) -> f64 {
        dispatch!(self, s => s.curvature_at(t))
    }

    fn start_tangent(&self) -> Vector2 {
        dispatch!(self, s => s.start_tangent())
    }

    fn end_tangent(&self) -> Vector2 {
        dispatch!(self, s => s.end_tangent())
    }

    fn bounds(&self) -> Bounds2 {
        dispatch!(self, s => s.bounds())
    }

    fn is_invalid(&self) -> bool {
        dispatch!(self, s => s.is_invalid())
    }

    fn subdivided(&self, t: f64) -> (Self, Self) {
        dispatch!(self, s => into_pair(s.subdivided(t)))
    }

    fn reversed(&self) -> Self {
        dispatch!(self, s => s.reversed().into())
    }

    fn transformed(&self, matrix: &Matrix3) -> Segment {
        dispatch!(self, s => s.transformed(matrix))
    }

    fn nondegenerate_segments(&self) -> Vec<Segment> {
        dispatch!(self, s => s.nondegenerate_segments())
    }

    fn stroke_left(&self, line_width: f64) -> Vec<Segment> {
        dispatch!(self, s => s.stroke_left(line_width))
    }

    fn stroke_right(&self, line_width: f64) -> Vec<Segment> {
        dispatch!(self, s => s.stroke_right(line_width))
    }

    fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection> {
        dispatch!(self, s => s.intersection(ray))
    }

    fn signed_area_fragment(&self) -> f64 {
        dispatch!(self, s => s.signed_area_fragment())
    }

    fn svg_path_fragment(&self) -> String {
        dispatch!(self, s => s.svg_path_fragment())
    }

    fn write_to_context(&self, sink: &mut dyn PathSink) {
        dispatch!(self, s => s.write_to_context(sink));
    }

    fn intersects_bounds(&self, bounds: &Bounds2) -> Result<bool> {
        dispatch!(self, s => s.intersects_bounds(bounds))
    }

    fn arc_length(&self) -> f64 {
        dispatch!(self, s => s.arc_length())
    }
}

impl From<Line> for Segment {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Quadratic> for Segment {
    fn from(quadratic: Quadratic) -> Self {
        Self::Quadratic(quadratic)
    }
}

impl From<Cubic> for Segment {
    fn from(cubic: Cubic) -> Self {
        Self::Cubic(cubic)
    }
}

impl From<Arc> for Segment {
    fn from(arc: Arc) -> Self {
        Self::Arc(arc)
    }
}

impl From<EllipticalArc> for Segment {
    fn from(arc: EllipticalArc) -> Self {
        Self::EllipticalArc(arc)
    }
}

/// Builds the crossing record for a candidate root `t`, applying the
/// half-open parameter interval and discarding hits behind the origin.
pub(crate) fn ray_hit(
    ray: &Ray2,
    point: Point2,
    tangent: &Vector2,
    t: f64,
) -> Option<RayIntersection> {
    if !(0.0..1.0).contains(&t) {
        return None;
    }
    let distance = ray.distance_to(&point);
    if distance <= 0.0 {
        return None;
    }
    let wind = if cross(ray.direction(), tangent) > 0.0 {
        1
    } else {
        -1
    };
    let mut normal = unit_or_zero(perpendicular(*tangent));
    if normal.dot(ray.direction()) > 0.0 {
        normal = -normal;
    }
    Some(RayIntersection::new(distance, point, normal, wind, t))
}

/// Signed distance from the ray's line for a power-basis polynomial curve
/// `sum(coefficients[k] * t^k)`, returned as scalar coefficients in the same
/// order (constant term first).
pub(crate) fn ray_frame_coefficients(ray: &Ray2, coefficients: &[Vector2]) -> Vec<f64> {
    let direction = ray.direction();
    coefficients
        .iter()
        .enumerate()
        .map(|(k, c)| {
            if k == 0 {
                cross(direction, &(c - ray.origin().coords))
            } else {
                cross(direction, c)
            }
        })
        .collect()
}

/// Splits `curve` in half `depth` times.
pub(crate) fn bisected<C: Curve + Clone>(curve: &C, depth: usize) -> Vec<C> {
    let mut pieces = vec![curve.clone()];
    for _ in 0..depth {
        pieces = pieces
            .iter()
            .flat_map(|piece| {
                let (head, tail) = piece.subdivided(0.5);
                [head, tail]
            })
            .collect();
    }
    pieces
}

/// Offsets a curve by sampling it uniformly and joining the offset samples
/// with lines. `distance` is measured along the left normal
/// `-perpendicular(tangent)`; the result walks in the direction of travel.
pub(crate) fn sampled_offset<C: Curve + ?Sized>(curve: &C, distance: f64) -> Vec<Segment> {
    #[allow(clippy::cast_precision_loss)]
    let points: Vec<Point2> = (0..=ARC_OFFSET_PIECES)
        .map(|i| {
            let t = i as f64 / ARC_OFFSET_PIECES as f64;
            let normal = -perpendicular(unit_or_zero(curve.tangent_at(t)));
            curve.position_at(t) + normal * distance
        })
        .collect();
    points
        .windows(2)
        .map(|pair| Line::new(pair[0], pair[1]))
        .filter(|line| !line.is_invalid())
        .map(Segment::from)
        .collect()
}

/// Reverses a list of offset pieces so they walk the opposite way.
pub(crate) fn reversed_segments(segments: &[Segment]) -> Vec<Segment> {
    segments.iter().rev().map(Curve::reversed).collect()
}

fn adaptive_arc_length<C: Curve + ?Sized>(
    curve: &C,
    t0: f64,
    t1: f64,
    p0: &Point2,
    p1: &Point2,
    levels: u32,
) -> f64 {
    let t_mid = 0.5 * (t0 + t1);
    let mid = curve.position_at(t_mid);
    let chord = (p1 - p0).norm();
    let split = (mid - p0).norm() + (p1 - mid).norm();
    let error = split - chord;
    if levels == 0
        || error <= ARC_LENGTH_DISTANCE_EPSILON
        || error <= ARC_LENGTH_CURVE_EPSILON * split
    {
        return split;
    }
    adaptive_arc_length(curve, t0, t_mid, p0, &mid, levels - 1)
        + adaptive_arc_length(curve, t_mid, t1, &mid, p1, levels - 1)
}
