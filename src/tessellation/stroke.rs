use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, trace};

use crate::geometry::{Arc, Curve, Line, Segment, Shape, Subpath};
use crate::math::intersect_2d::line_line_point_2d;
use crate::math::{angle_between, angle_of, perpendicular, unit_or_zero, Point2, Vector2};

use super::line_styles::{LineCap, LineJoin, LineStyles};

/// Miter joins are replaced by bevels when the corner folds back this close
/// to a full reversal.
const MITER_REVERSAL_EPSILON: f64 = 1e-5;

/// Builds the fillable outline of a stroked [`Shape`].
///
/// Each subpath is walked twice: forward along its left side, then backward
/// along its right side. Open subpaths become one closed loop with caps at
/// both ends. Closed subpaths become two closed rings, one per side, with no
/// caps. Self-overlapping strokes are not resolved.
#[derive(Debug)]
pub struct TessellateStroke<'a> {
    shape: &'a Shape,
    styles: &'a LineStyles,
}

impl<'a> TessellateStroke<'a> {
    /// Creates a new stroke operation.
    #[must_use]
    pub fn new(shape: &'a Shape, styles: &'a LineStyles) -> Self {
        Self { shape, styles }
    }

    /// Executes the stroke, producing the outline shape.
    #[must_use]
    pub fn execute(&self) -> Shape {
        let subpaths: Vec<Subpath> = self
            .shape
            .subpaths()
            .iter()
            .flat_map(|subpath| self.stroke_subpath(subpath))
            .collect();
        debug!(
            input_subpaths = self.shape.subpaths().len(),
            output_subpaths = subpaths.len(),
            line_width = self.styles.line_width(),
            "stroked shape"
        );
        Shape::from_subpaths(subpaths)
    }

    fn stroke_subpath(&self, subpath: &Subpath) -> Vec<Subpath> {
        let segments = without_cusps(subpath.segments());
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Vec::new();
        };
        let width = self.styles.line_width();

        let mut left = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                let previous = &segments[i - 1];
                left.extend(self.left_join(
                    &segment.start(),
                    &previous.end_tangent(),
                    &segment.start_tangent(),
                ));
            }
            left.extend(segment.stroke_left(width));
        }

        let mut right = Vec::new();
        for (j, segment) in segments.iter().enumerate().rev() {
            if j + 1 < segments.len() {
                let next = &segments[j + 1];
                right.extend(self.right_join(
                    &segment.end(),
                    &segment.end_tangent(),
                    &next.start_tangent(),
                ));
            }
            right.extend(segment.stroke_right(width));
        }

        if !subpath.is_closed() {
            left.extend(self.cap(&last.end(), &last.end_tangent()));
            left.extend(right);
            left.extend(self.cap(&first.start(), &-first.start_tangent()));
            return vec![Subpath::from_segments(left, true)];
        }

        match subpath.closing_segment() {
            None => {
                left.extend(self.left_join(
                    &last.end(),
                    &last.end_tangent(),
                    &first.start_tangent(),
                ));
                right.extend(self.right_join(
                    &last.end(),
                    &last.end_tangent(),
                    &first.start_tangent(),
                ));
            }
            Some(closing) => {
                left.extend(self.left_join(
                    &closing.start(),
                    &last.end_tangent(),
                    &closing.start_tangent(),
                ));
                left.extend(closing.stroke_left(width));
                left.extend(self.left_join(
                    &closing.end(),
                    &closing.end_tangent(),
                    &first.start_tangent(),
                ));

                right.extend(self.right_join(
                    &closing.end(),
                    &closing.end_tangent(),
                    &first.start_tangent(),
                ));
                right.extend(closing.stroke_right(width));
                right.extend(self.right_join(
                    &closing.start(),
                    &last.end_tangent(),
                    &closing.start_tangent(),
                ));
            }
        }
        vec![
            Subpath::from_segments(left, true),
            Subpath::from_segments(right, true),
        ]
    }

    /// Join on the left side, walking forward from `from` to `to`.
    fn left_join(&self, center: &Point2, from: &Vector2, to: &Vector2) -> Vec<Segment> {
        let (from, to) = (unit_or_zero(*from), unit_or_zero(*to));
        let half_width = self.styles.half_width();
        let from_point = center - perpendicular(from) * half_width;
        let to_point = center - perpendicular(to) * half_width;

        if perpendicular(from).dot(&to) > 0.0 {
            match self.styles.line_join() {
                LineJoin::Round => {
                    return vec![Arc::new(
                        *center,
                        half_width,
                        angle_of(&from) + FRAC_PI_2,
                        angle_of(&to) + FRAC_PI_2,
                        true,
                    )
                    .into()];
                }
                LineJoin::Miter => {
                    if let Some(tip) = self.miter_tip(&from_point, &from, &to_point, &to) {
                        return vec![
                            Line::new(from_point, tip).into(),
                            Line::new(tip, to_point).into(),
                        ];
                    }
                }
                LineJoin::Bevel => {}
            }
        }
        connecting_line(from_point, to_point)
    }

    /// Join on the right side. The right side is walked backward, so the
    /// result runs from the `to` offset to the `from` offset.
    fn right_join(&self, center: &Point2, from: &Vector2, to: &Vector2) -> Vec<Segment> {
        let (from, to) = (unit_or_zero(*from), unit_or_zero(*to));
        let half_width = self.styles.half_width();
        let from_point = center + perpendicular(from) * half_width;
        let to_point = center + perpendicular(to) * half_width;

        if perpendicular(from).dot(&to) < 0.0 {
            match self.styles.line_join() {
                LineJoin::Round => {
                    return vec![Arc::new(
                        *center,
                        half_width,
                        angle_of(&to) - FRAC_PI_2,
                        angle_of(&from) - FRAC_PI_2,
                        true,
                    )
                    .into()];
                }
                LineJoin::Miter => {
                    if let Some(tip) = self.miter_tip(&from_point, &from, &to_point, &to) {
                        return vec![
                            Line::new(to_point, tip).into(),
                            Line::new(tip, from_point).into(),
                        ];
                    }
                }
                LineJoin::Bevel => {}
            }
        }
        connecting_line(to_point, from_point)
    }

    /// Tip of a miter join, or `None` when the miter limit forces a bevel.
    fn miter_tip(
        &self,
        from_point: &Point2,
        from: &Vector2,
        to_point: &Point2,
        to: &Vector2,
    ) -> Option<Point2> {
        let theta = angle_between(from, &-to);
        if 1.0 / (theta / 2.0).sin() > self.styles.miter_limit()
            || theta >= PI - MITER_REVERSAL_EPSILON
        {
            return None;
        }
        line_line_point_2d(from_point, from, to_point, to)
    }

    /// Cap at an open end, running from the left offset to the right offset
    /// of `tangent`, which points out of the stroke.
    fn cap(&self, center: &Point2, tangent: &Vector2) -> Vec<Segment> {
        let tangent = unit_or_zero(*tangent);
        let half_width = self.styles.half_width();
        let to_left = -perpendicular(tangent) * half_width;
        let to_right = perpendicular(tangent) * half_width;
        let from_point = center + to_left;
        let to_point = center + to_right;

        match self.styles.line_cap() {
            LineCap::Butt => vec![Line::new(from_point, to_point).into()],
            LineCap::Round => {
                let angle = angle_of(&tangent);
                vec![Arc::new(*center, half_width, angle + FRAC_PI_2, angle - FRAC_PI_2, true).into()]
            }
            LineCap::Square => {
                let to_front = tangent * half_width;
                let front_left = from_point + to_front;
                let front_right = to_point + to_front;
                vec![
                    Line::new(from_point, front_left).into(),
                    Line::new(front_left, front_right).into(),
                    Line::new(front_right, to_point).into(),
                ]
            }
        }
    }
}

/// A bevel or concave-side connection, omitted when the points coincide.
fn connecting_line(from: Point2, to: Point2) -> Vec<Segment> {
    if from == to {
        Vec::new()
    } else {
        vec![Line::new(from, to).into()]
    }
}

/// Replaces cusped cubics with their two quadratics.
fn without_cusps(segments: &[Segment]) -> Vec<Segment> {
    segments
        .iter()
        .flat_map(|segment| match segment {
            Segment::Cubic(cubic) => match cubic.cusp_quadratics() {
                Some((head, tail)) => {
                    trace!(?cubic, "splitting cusped cubic into quadratics");
                    vec![head.into(), tail.into()]
                }
                None => vec![segment.clone()],
            },
            _ => vec![segment.clone()],
        })
        .filter(|segment: &Segment| !segment.is_invalid())
        .collect()
}
