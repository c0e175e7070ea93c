use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::{Arc, Cubic, Curve, EllipticalArc, Line, Quadratic, Segment, Subpath};
use crate::math::{polar, Point2, Vector2};

use super::Shape;

/// Path construction, mirroring the canvas / SVG path drawing calls.
///
/// Every call appends to the last subpath, starting one when needed, and
/// clears the cached bounds.
impl Shape {
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.move_to_point(Point2::new(x, y))
    }

    pub fn move_to_relative(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.move_to_point(self.relative_point(dx, dy))
    }

    pub fn move_to_point(&mut self, point: Point2) -> &mut Self {
        let mut subpath = Subpath::new();
        subpath.add_point(point);
        self.add_subpath(subpath)
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.line_to_point(Point2::new(x, y))
    }

    pub fn line_to_relative(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.line_to_point(self.relative_point(dx, dy))
    }

    pub fn line_to_point(&mut self, point: Point2) -> &mut Self {
        self.invalidate();
        let subpath = self.current_subpath_mut();
        if let Some(start) = subpath.last_point() {
            subpath.add_segment(Line::new(start, point).into());
        }
        subpath.add_point(point);
        self
    }

    pub fn horizontal_line_to(&mut self, x: f64) -> &mut Self {
        let y = self.last_point().map_or(0.0, |point| point.y);
        self.line_to(x, y)
    }

    pub fn horizontal_line_to_relative(&mut self, dx: f64) -> &mut Self {
        self.line_to_relative(dx, 0.0)
    }

    pub fn vertical_line_to(&mut self, y: f64) -> &mut Self {
        let x = self.last_point().map_or(0.0, |point| point.x);
        self.line_to(x, y)
    }

    pub fn vertical_line_to_relative(&mut self, dy: f64) -> &mut Self {
        self.line_to_relative(0.0, dy)
    }

    pub fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) -> &mut Self {
        self.quadratic_curve_to_point(Point2::new(cpx, cpy), Point2::new(x, y))
    }

    pub fn quadratic_curve_to_relative(
        &mut self,
        cpx: f64,
        cpy: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        let control = self.relative_point(cpx, cpy);
        let end = self.relative_point(x, y);
        self.quadratic_curve_to_point(control, end)
    }

    pub fn smooth_quadratic_curve_to(&mut self, x: f64, y: f64) -> &mut Self {
        let control = self.smooth_quadratic_control_point();
        self.quadratic_curve_to_point(control, Point2::new(x, y))
    }

    pub fn smooth_quadratic_curve_to_relative(&mut self, x: f64, y: f64) -> &mut Self {
        let control = self.smooth_quadratic_control_point();
        let end = self.relative_point(x, y);
        self.quadratic_curve_to_point(control, end)
    }

    pub fn quadratic_curve_to_point(&mut self, control: Point2, end: Point2) -> &mut Self {
        self.invalidate();
        self.ensure(control);
        let subpath = self.current_subpath_mut();
        if let Some(start) = subpath.last_point() {
            for segment in Quadratic::new(start, control, end).nondegenerate_segments() {
                subpath.add_segment(segment);
            }
        }
        subpath.add_point(end);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cubic_curve_to(
        &mut self,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        self.cubic_curve_to_point(
            Point2::new(cp1x, cp1y),
            Point2::new(cp2x, cp2y),
            Point2::new(x, y),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cubic_curve_to_relative(
        &mut self,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        let control1 = self.relative_point(cp1x, cp1y);
        let control2 = self.relative_point(cp2x, cp2y);
        let end = self.relative_point(x, y);
        self.cubic_curve_to_point(control1, control2, end)
    }

    pub fn smooth_cubic_curve_to(&mut self, cp2x: f64, cp2y: f64, x: f64, y: f64) -> &mut Self {
        let control1 = self.smooth_cubic_control_point();
        self.cubic_curve_to_point(control1, Point2::new(cp2x, cp2y), Point2::new(x, y))
    }

    pub fn smooth_cubic_curve_to_relative(
        &mut self,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        let control1 = self.smooth_cubic_control_point();
        let control2 = self.relative_point(cp2x, cp2y);
        let end = self.relative_point(x, y);
        self.cubic_curve_to_point(control1, control2, end)
    }

    pub fn cubic_curve_to_point(
        &mut self,
        control1: Point2,
        control2: Point2,
        end: Point2,
    ) -> &mut Self {
        self.invalidate();
        self.ensure(control1);
        let subpath = self.current_subpath_mut();
        if let Some(start) = subpath.last_point() {
            for segment in Cubic::new(start, control1, control2, end).nondegenerate_segments() {
                subpath.add_segment(segment);
            }
        }
        subpath.add_point(end);
        self
    }

    /// Canvas `arc()`: a line joins the current point to the arc start.
    pub fn arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> &mut Self {
        let arc = Arc::new(
            Point2::new(cx, cy),
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        );
        self.append_with_lead_in(arc.into())
    }

    /// Canvas `ellipse()`.
    ///
    /// Equal radii produce a circular [`Arc`]. When `radius_y > radius_x` the
    /// radii are swapped and the ellipse rotated a quarter turn, so the
    /// stored [`EllipticalArc`] always has its major axis along `radius_x`.
    #[allow(clippy::too_many_arguments)]
    pub fn elliptical_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> &mut Self {
        let center = Point2::new(cx, cy);
        #[allow(clippy::float_cmp)]
        let segment: Segment = if radius_x == radius_y {
            Arc::new(
                center,
                radius_x,
                start_angle + rotation,
                end_angle + rotation,
                anticlockwise,
            )
            .into()
        } else if radius_x < radius_y {
            EllipticalArc::from_parts(
                center,
                radius_y,
                radius_x,
                rotation + FRAC_PI_2,
                start_angle - FRAC_PI_2,
                end_angle - FRAC_PI_2,
                anticlockwise,
            )
            .into()
        } else {
            EllipticalArc::from_parts(
                center,
                radius_x,
                radius_y,
                rotation,
                start_angle,
                end_angle,
                anticlockwise,
            )
            .into()
        };
        self.append_with_lead_in(segment)
    }

    /// Marks the current subpath closed and starts a new one at its first
    /// point.
    pub fn close(&mut self) -> &mut Self {
        let Some(first) = self.subpaths.last().and_then(Subpath::first_point) else {
            return self;
        };
        self.invalidate();
        if let Some(last) = self.subpaths.last_mut() {
            last.close();
        }
        self.move_to_point(first)
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.move_to(x, y)
            .line_to(x + width, y)
            .line_to(x + width, y + height)
            .line_to(x, y + height)
            .close()
    }

    /// Rectangle with elliptical corners of radii `arc_width` x `arc_height`.
    pub fn round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) -> &mut Self {
        if arc_width <= 0.0 || arc_height <= 0.0 {
            return self.rect(x, y, width, height);
        }
        let (right, bottom) = (x + width, y + height);
        self.move_to(x + arc_width, y)
            .line_to(right - arc_width, y)
            .elliptical_arc(
                right - arc_width,
                y + arc_height,
                arc_width,
                arc_height,
                0.0,
                -FRAC_PI_2,
                0.0,
                false,
            )
            .line_to(right, bottom - arc_height)
            .elliptical_arc(
                right - arc_width,
                bottom - arc_height,
                arc_width,
                arc_height,
                0.0,
                0.0,
                FRAC_PI_2,
                false,
            )
            .line_to(x + arc_width, bottom)
            .elliptical_arc(
                x + arc_width,
                bottom - arc_height,
                arc_width,
                arc_height,
                0.0,
                FRAC_PI_2,
                PI,
                false,
            )
            .line_to(x, y + arc_height)
            .elliptical_arc(
                x + arc_width,
                y + arc_height,
                arc_width,
                arc_height,
                0.0,
                PI,
                PI + FRAC_PI_2,
                false,
            )
            .close()
    }

    /// Closed polygon through `vertices`; does nothing for an empty slice.
    pub fn add_polygon(&mut self, vertices: &[Point2]) -> &mut Self {
        let Some((first, rest)) = vertices.split_first() else {
            return self;
        };
        self.move_to_point(*first);
        for vertex in rest {
            self.line_to_point(*vertex);
        }
        self.close()
    }

    pub fn add_circle(&mut self, cx: f64, cy: f64, radius: f64) -> &mut Self {
        self.move_to(cx + radius, cy)
            .arc(cx, cy, radius, 0.0, TAU, false)
            .close()
    }

    pub fn add_ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
    ) -> &mut Self {
        let start = Point2::new(cx, cy) + polar(radius_x, rotation);
        self.move_to_point(start)
            .elliptical_arc(cx, cy, radius_x, radius_y, rotation, 0.0, TAU, false)
            .close()
    }

    /// Smooth interpolating curve through `positions`, one cubic per span.
    ///
    /// `tension` of 0 gives a Catmull-Rom spline; values toward 1 tighten
    /// the curve toward straight lines. Open splines reuse the end points as
    /// their own missing neighbours. The curve is joined to the current point
    /// by a line when they differ.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] unless
    /// `-1 < tension < 1`.
    pub fn cardinal_spline(
        &mut self,
        positions: &[Point2],
        tension: f64,
        closed: bool,
    ) -> Result<&mut Self> {
        if !(tension > -1.0 && tension < 1.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "tension",
                value: tension,
                min: -1.0,
                max: 1.0,
            }
            .into());
        }
        let n = positions.len();
        if n < 2 {
            return Ok(self);
        }
        let factor = (1.0 - tension) / 6.0;
        let spans = if closed { n } else { n - 1 };
        for i in 0..spans {
            let (before, after, after_after) = if closed {
                ((i + n - 1) % n, (i + 1) % n, (i + 2) % n)
            } else {
                (i.saturating_sub(1), i + 1, (i + 2).min(n - 1))
            };
            let current = positions[i];
            let next = positions[after];
            let control1 = current + (next - positions[before]) * factor;
            let control2 = next + (current - positions[after_after]) * factor;
            if i == 0 {
                match self.last_point() {
                    Some(point) if point == current => {}
                    Some(_) => {
                        self.line_to_point(current);
                    }
                    None => {
                        self.move_to_point(current);
                    }
                }
            }
            self.cubic_curve_to_point(control1, control2, next);
        }
        if closed {
            self.close();
        }
        Ok(self)
    }

    fn relative_point(&self, dx: f64, dy: f64) -> Point2 {
        self.last_point().unwrap_or_else(Point2::origin) + Vector2::new(dx, dy)
    }

    /// Starts the current subpath at `point` when it has no points yet.
    fn ensure(&mut self, point: Point2) {
        let subpath = self.current_subpath_mut();
        if subpath.last_point().is_none() {
            subpath.add_point(point);
        }
    }

    fn smooth_quadratic_control_point(&self) -> Point2 {
        let last = self.last_point().unwrap_or_else(Point2::origin);
        match self.last_segment() {
            Some(Segment::Quadratic(quadratic)) => last + (last - quadratic.control()),
            _ => last,
        }
    }

    fn smooth_cubic_control_point(&self) -> Point2 {
        let last = self.last_point().unwrap_or_else(Point2::origin);
        match self.last_segment() {
            Some(Segment::Cubic(cubic)) => last + (last - cubic.control2()),
            _ => last,
        }
    }

    fn append_with_lead_in(&mut self, segment: Segment) -> &mut Self {
        self.invalidate();
        let (start, end) = (segment.start(), segment.end());
        let subpath = self.current_subpath_mut();
        match subpath.last_point() {
            Some(last) if last == start => {}
            Some(last) => {
                subpath.add_segment(Line::new(last, start).into());
                subpath.add_point(start);
            }
            None => {
                subpath.add_point(start);
            }
        }
        subpath.add_segment(segment);
        subpath.add_point(end);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Bounds2;

    #[test]
    fn line_to_without_move_starts_subpath() {
        let mut shape = Shape::new();
        shape.line_to(1.0, 2.0).line_to(3.0, 2.0);
        assert_eq!(shape.subpaths().len(), 1);
        assert_eq!(shape.subpaths()[0].segments().len(), 1);
        assert!((shape.subpaths()[0].segments()[0].start() - Point2::new(1.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn relative_commands_follow_the_current_point() {
        let mut shape = Shape::new();
        shape
            .move_to(1.0, 1.0)
            .line_to_relative(2.0, 0.0)
            .vertical_line_to_relative(3.0)
            .horizontal_line_to(0.0)
            .vertical_line_to(1.0);
        let points = shape.subpaths()[0].points();
        let expected = [(1.0, 1.0), (3.0, 1.0), (3.0, 4.0), (0.0, 4.0), (0.0, 1.0)];
        assert_eq!(points.len(), expected.len());
        for (point, (x, y)) in points.iter().zip(expected) {
            assert!((point - Point2::new(x, y)).norm() < 1e-12);
        }
    }

    #[test]
    fn close_reopens_at_first_point() {
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(10.0, 10.0).close();
        assert_eq!(shape.subpaths().len(), 2);
        assert!(shape.subpaths()[0].is_closed());
        assert!(shape.subpaths()[0].has_closing_segment());
        assert_eq!(shape.last_point(), Some(Point2::origin()));
    }

    #[test]
    fn degenerate_curves_are_reduced() {
        let mut shape = Shape::new();
        shape
            .move_to(0.0, 0.0)
            .quadratic_curve_to(0.0, 0.0, 4.0, 0.0)
            .cubic_curve_to(4.0, 0.0, 4.0, 0.0, 4.0, 0.0);
        let segments = shape.subpaths()[0].segments();
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], Segment::Line(_)));
    }

    #[test]
    fn smooth_quadratic_reflects_previous_control() {
        let mut shape = Shape::new();
        shape
            .move_to(0.0, 0.0)
            .quadratic_curve_to(1.0, 1.0, 2.0, 0.0)
            .smooth_quadratic_curve_to(4.0, 0.0);
        match shape.last_segment() {
            Some(Segment::Quadratic(quadratic)) => {
                assert!((quadratic.control() - Point2::new(3.0, -1.0)).norm() < 1e-12);
            }
            other => panic!("expected quadratic, got {other:?}"),
        }
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let mut shape = Shape::new();
        shape
            .move_to(0.0, 0.0)
            .cubic_curve_to(0.0, 1.0, 1.0, 2.0, 2.0, 2.0)
            .smooth_cubic_curve_to_relative(1.0, -2.0, 2.0, -2.0);
        match shape.last_segment() {
            Some(Segment::Cubic(cubic)) => {
                assert!((cubic.control1() - Point2::new(3.0, 2.0)).norm() < 1e-12);
                assert!((cubic.control2() - Point2::new(3.0, 0.0)).norm() < 1e-12);
                assert!((cubic.end() - Point2::new(4.0, 0.0)).norm() < 1e-12);
            }
            other => panic!("expected cubic, got {other:?}"),
        }
    }

    #[test]
    fn arc_adds_lead_in_line() {
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0).arc(5.0, 0.0, 1.0, 0.0, PI, false);
        let segments = shape.subpaths()[0].segments();
        assert_eq!(segments.len(), 2);
        assert!(matches!(segments[0], Segment::Line(_)));
        assert!((segments[0].end() - Point2::new(6.0, 0.0)).norm() < 1e-12);
        assert!(matches!(segments[1], Segment::Arc(_)));
    }

    #[test]
    fn tall_ellipse_is_normalized() {
        let mut shape = Shape::new();
        shape.elliptical_arc(0.0, 0.0, 1.0, 3.0, 0.0, 0.0, PI, false);
        let segment = shape.last_segment().unwrap().clone();
        match &segment {
            Segment::EllipticalArc(arc) => {
                assert!((arc.radius_x() - 3.0).abs() < 1e-12);
                assert!((arc.radius_y() - 1.0).abs() < 1e-12);
            }
            other => panic!("expected elliptical arc, got {other:?}"),
        }
        assert!((segment.start() - Point2::new(1.0, 0.0)).norm() < 1e-12);
        assert!((segment.position_at(0.5) - Point2::new(0.0, 3.0)).norm() < 1e-12);
        assert!((segment.end() - Point2::new(-1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn round_rect_keeps_its_box() {
        let mut shape = Shape::new();
        shape.round_rect(0.0, 0.0, 10.0, 6.0, 2.0, 1.0);
        assert!(shape
            .bounds()
            .equals_epsilon(&Bounds2::new(0.0, 0.0, 10.0, 6.0), 1e-9));
        assert!(shape.contains_point(&Point2::new(5.0, 3.0)));
        assert!(!shape.contains_point(&Point2::new(0.1, 0.1)));
    }

    #[test]
    fn cardinal_spline_interpolates_positions() {
        let positions = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(3.0, 1.0),
            Point2::new(4.0, 3.0),
        ];
        let mut shape = Shape::new();
        shape.cardinal_spline(&positions, 0.0, false).unwrap();
        let segments = shape.subpaths()[0].segments();
        assert_eq!(segments.len(), 3);
        for (segment, pair) in segments.iter().zip(positions.windows(2)) {
            assert!((segment.start() - pair[0]).norm() < 1e-12);
            assert!((segment.end() - pair[1]).norm() < 1e-12);
        }
        // Catmull-Rom tangent at an interior point is half the neighbour chord.
        let expected = (positions[2] - positions[0]) / 2.0;
        assert!((segments[1].tangent_at(0.0) - expected).norm() < 1e-12);
    }

    #[test]
    fn closed_cardinal_spline_closes() {
        let positions = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 2.0),
        ];
        let mut shape = Shape::new();
        shape.cardinal_spline(&positions, 0.5, true).unwrap();
        assert_eq!(shape.subpaths()[0].segments().len(), 3);
        assert!(shape.subpaths()[0].is_closed());
        assert!(shape.contains_point(&Point2::new(1.0, 0.7)));
    }

    #[test]
    fn cardinal_spline_rejects_tension_out_of_range() {
        let positions = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(Shape::new().cardinal_spline(&positions, 1.0, false).is_err());
        assert!(Shape::new().cardinal_spline(&positions, -1.5, false).is_err());
    }
}
