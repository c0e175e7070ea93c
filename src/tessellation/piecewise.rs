use std::fmt;
use std::sync::Arc as SharedFn;

use tracing::debug;

use crate::error::{Result, TessellationError};
use crate::geometry::{Arc, Curve, Line, Segment, Shape, Subpath};
use crate::math::{midpoint, polar, Point2};

/// Non-linear map applied to points before the flatness test.
pub type PointMap = SharedFn<dyn Fn(&Point2) -> Point2 + Send + Sync>;

/// Closed-form alternative to bisection that a segment may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactMethod {
    /// `x` is an angle and `y` a radius. Constant-angle lines stay lines and
    /// constant-radius lines become arcs about the origin.
    PolarToCartesian,
}

/// Controls adaptive subdivision of curves into lines.
///
/// A piece stops subdividing once `max_levels` is exhausted, or once
/// `min_levels` is exhausted and every configured flatness criterion holds.
#[derive(Clone)]
pub struct PiecewiseLinearOptions {
    min_levels: u32,
    max_levels: u32,
    distance_epsilon: Option<f64>,
    curve_epsilon: Option<f64>,
    point_map: Option<PointMap>,
    method: Option<ExactMethod>,
}

impl Default for PiecewiseLinearOptions {
    fn default() -> Self {
        Self {
            min_levels: 0,
            max_levels: 7,
            distance_epsilon: Some(0.16),
            curve_epsilon: None,
            point_map: None,
            method: None,
        }
    }
}

impl fmt::Debug for PiecewiseLinearOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseLinearOptions")
            .field("min_levels", &self.min_levels)
            .field("max_levels", &self.max_levels)
            .field("distance_epsilon", &self.distance_epsilon)
            .field("curve_epsilon", &self.curve_epsilon)
            .field("point_map", &self.point_map.is_some())
            .field("method", &self.method)
            .finish()
    }
}

impl PiecewiseLinearOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the forced and maximum subdivision depths.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_levels > max_levels`.
    pub fn with_levels(mut self, min_levels: u32, max_levels: u32) -> Result<Self> {
        if min_levels > max_levels {
            return Err(TessellationError::InvalidParameters(format!(
                "min_levels ({min_levels}) exceeds max_levels ({max_levels})"
            ))
            .into());
        }
        self.min_levels = min_levels;
        self.max_levels = max_levels;
        Ok(self)
    }

    /// Bound on the squared distance between a piece's mapped midpoint and
    /// its chord midpoint. `None` disables the test.
    ///
    /// # Errors
    ///
    /// Returns an error if the epsilon is not positive.
    pub fn with_distance_epsilon(mut self, epsilon: Option<f64>) -> Result<Self> {
        self.distance_epsilon = positive_epsilon("distance_epsilon", epsilon)?;
        Ok(self)
    }

    /// Bound on the squared midpoint deviation relative to the squared chord
    /// length. `None` disables the test.
    ///
    /// # Errors
    ///
    /// Returns an error if the epsilon is not positive.
    pub fn with_curve_epsilon(mut self, epsilon: Option<f64>) -> Result<Self> {
        self.curve_epsilon = positive_epsilon("curve_epsilon", epsilon)?;
        Ok(self)
    }

    /// Enables the relative flatness test with its default bound when none
    /// has been set.
    #[must_use]
    pub fn with_curvature(mut self) -> Self {
        self.curve_epsilon.get_or_insert(0.002);
        self
    }

    #[must_use]
    pub fn with_point_map(mut self, point_map: PointMap) -> Self {
        self.point_map = Some(point_map);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: ExactMethod) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub(crate) fn without_point_map(mut self) -> Self {
        self.point_map = None;
        self.method = None;
        self
    }

    #[must_use]
    pub(crate) fn polar_to_cartesian(self) -> Self {
        self.with_point_map(SharedFn::new(|point: &Point2| {
            Point2::from(polar(point.y, point.x))
        }))
        .with_method(ExactMethod::PolarToCartesian)
    }

    #[must_use]
    pub fn min_levels(&self) -> u32 {
        self.min_levels
    }

    #[must_use]
    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    #[must_use]
    pub fn distance_epsilon(&self) -> Option<f64> {
        self.distance_epsilon
    }

    #[must_use]
    pub fn curve_epsilon(&self) -> Option<f64> {
        self.curve_epsilon
    }

    fn map(&self, point: &Point2) -> Point2 {
        match &self.point_map {
            Some(map) => map(point),
            None => *point,
        }
    }

    fn is_sufficiently_flat(&self, start: &Point2, middle: &Point2, end: &Point2) -> bool {
        let deviation = (midpoint(start, end) - middle).norm_squared();
        if self.distance_epsilon.is_some_and(|epsilon| deviation > epsilon) {
            return false;
        }
        if let Some(epsilon) = self.curve_epsilon {
            let chord = (end - start).norm_squared();
            if chord == 0.0 || deviation / chord > epsilon {
                return false;
            }
        }
        true
    }
}

fn positive_epsilon(name: &str, epsilon: Option<f64>) -> Result<Option<f64>> {
    match epsilon {
        Some(value) if !(value > 0.0) => Err(TessellationError::InvalidParameters(format!(
            "{name} must be positive, got {value}"
        ))
        .into()),
        _ => Ok(epsilon),
    }
}

/// Replaces every segment of a [`Shape`] with lines, optionally mapping the
/// geometry through a non-linear [`PointMap`].
#[derive(Debug)]
pub struct TessellatePiecewise<'a> {
    shape: &'a Shape,
    options: &'a PiecewiseLinearOptions,
}

impl<'a> TessellatePiecewise<'a> {
    /// Creates a new piecewise tessellation operation.
    #[must_use]
    pub fn new(shape: &'a Shape, options: &'a PiecewiseLinearOptions) -> Self {
        Self { shape, options }
    }

    /// Executes the tessellation.
    #[must_use]
    pub fn execute(&self) -> Shape {
        let mut input_segments = 0;
        let mut output_segments = 0;
        let subpaths: Vec<Subpath> = self
            .shape
            .subpaths()
            .iter()
            .map(|subpath| {
                let source = subpath.stroke_segments();
                let segments: Vec<Segment> = source
                    .iter()
                    .flat_map(|segment| self.segment_pieces(segment))
                    .collect();
                input_segments += source.len();
                output_segments += segments.len();
                Subpath::from_segments(segments, subpath.is_closed())
            })
            .collect();
        debug!(input_segments, output_segments, "piecewise linear tessellation");
        Shape::from_subpaths(subpaths)
    }

    fn segment_pieces(&self, segment: &Segment) -> Vec<Segment> {
        if let Some(method) = self.options.method {
            if let Some(exact) = exact_segments(segment, method) {
                return exact;
            }
        }
        if let (Segment::Line(_), None) = (segment, &self.options.point_map) {
            return vec![segment.clone()];
        }
        let mut pieces = Vec::new();
        let start = self.options.map(&segment.start());
        let end = self.options.map(&segment.end());
        self.subdivide(
            segment,
            self.options.min_levels,
            self.options.max_levels,
            start,
            end,
            &mut pieces,
        );
        pieces
    }

    fn subdivide(
        &self,
        segment: &Segment,
        min_levels: u32,
        max_levels: u32,
        start: Point2,
        end: Point2,
        pieces: &mut Vec<Segment>,
    ) {
        let middle = self.options.map(&segment.position_at(0.5));
        if max_levels == 0
            || (min_levels == 0 && self.options.is_sufficiently_flat(&start, &middle, &end))
        {
            pieces.push(Line::new(start, end).into());
            return;
        }
        let (head, tail) = segment.subdivided(0.5);
        let min_levels = min_levels.saturating_sub(1);
        self.subdivide(&head, min_levels, max_levels - 1, start, middle, pieces);
        self.subdivide(&tail, min_levels, max_levels - 1, middle, end, pieces);
    }
}

/// Closed-form replacement for `segment` under `method`, when one exists.
#[allow(clippy::float_cmp)]
fn exact_segments(segment: &Segment, method: ExactMethod) -> Option<Vec<Segment>> {
    match (method, segment) {
        (ExactMethod::PolarToCartesian, Segment::Line(line)) => {
            let (start, end) = (line.start(), line.end());
            if start.x == end.x {
                Some(vec![Line::new(
                    Point2::from(polar(start.y, start.x)),
                    Point2::from(polar(end.y, end.x)),
                )
                .into()])
            } else if start.y == end.y {
                Some(vec![Arc::new(
                    Point2::origin(),
                    start.y,
                    start.x,
                    end.x,
                    start.x > end.x,
                )
                .into()])
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn all_lines(shape: &Shape) -> bool {
        shape
            .segments()
            .all(|segment| matches!(segment, Segment::Line(_)))
    }

    #[test]
    fn defaults() {
        let options = PiecewiseLinearOptions::default();
        assert_eq!(options.min_levels(), 0);
        assert_eq!(options.max_levels(), 7);
        assert_eq!(options.distance_epsilon(), Some(0.16));
        assert_eq!(options.curve_epsilon(), None);
        assert_eq!(options.with_curvature().curve_epsilon(), Some(0.002));
    }

    #[test]
    fn invalid_options_are_rejected() {
        assert!(PiecewiseLinearOptions::new().with_levels(3, 2).is_err());
        assert!(PiecewiseLinearOptions::new()
            .with_distance_epsilon(Some(0.0))
            .is_err());
        assert!(PiecewiseLinearOptions::new()
            .with_curve_epsilon(Some(-1.0))
            .is_err());
    }

    #[test]
    fn circle_flattens_within_tolerance() {
        let circle = Shape::circle(0.0, 0.0, 5.0);
        let flat = circle.to_piecewise_linear(&PiecewiseLinearOptions::default());
        assert!(all_lines(&flat));
        assert!(flat.segments().count() >= 8);
        for segment in flat.segments() {
            assert_abs_diff_eq!(segment.start().coords.norm(), 5.0, epsilon = 1e-9);
            // Sag of each chord stays within sqrt(0.16).
            assert!(segment.position_at(0.5).coords.norm() > 5.0 - 0.4);
        }
        assert!(flat.contains_point(&Point2::origin()));
    }

    #[test]
    fn level_limits() {
        let mut curve = Shape::new();
        curve
            .move_to(0.0, 0.0)
            .cubic_curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0);

        let coarse = PiecewiseLinearOptions::new().with_levels(0, 0).unwrap();
        let flat = curve.to_piecewise_linear(&coarse);
        assert_eq!(flat.segments().count(), 1);

        let forced = PiecewiseLinearOptions::new()
            .with_levels(3, 7)
            .unwrap()
            .with_distance_epsilon(None)
            .unwrap();
        assert_eq!(curve.to_piecewise_linear(&forced).segments().count(), 8);
    }

    #[test]
    fn lines_pass_through_without_a_map() {
        let square = Shape::rectangle(0.0, 0.0, 2.0, 2.0);
        let flat = square.to_piecewise_linear(&PiecewiseLinearOptions::default());
        // Three drawn sides plus the materialized closing side.
        assert_eq!(flat.segments().count(), 4);
        assert_abs_diff_eq!(flat.area(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn point_map_bends_lines() {
        let line = Shape::line_segment(Point2::new(-2.0, 0.0), Point2::new(2.0, 0.0));
        let options = PiecewiseLinearOptions::new()
            .with_point_map(SharedFn::new(|p: &Point2| Point2::new(p.x, p.x * p.x)));
        let bent = line.nonlinear_transformed(&options);
        assert!(bent.segments().count() > 1);
        for segment in bent.segments() {
            let p = segment.start();
            assert_abs_diff_eq!(p.y, p.x * p.x, epsilon = 1e-12);
        }
        // The same options without the map leave the line alone.
        assert_eq!(line.to_piecewise_linear(&options).segments().count(), 1);
    }

    #[test]
    fn polar_rectangle_becomes_annular_sector() {
        let polar_rectangle = Shape::rectangle(0.0, 1.0, FRAC_PI_2, 1.0);
        let sector = polar_rectangle.polar_to_cartesian(&PiecewiseLinearOptions::default());
        let arcs = sector
            .segments()
            .filter(|segment| matches!(segment, Segment::Arc(_)))
            .count();
        assert_eq!(arcs, 2);
        assert_abs_diff_eq!(sector.area(), 0.75 * PI, epsilon = 1e-9);
        assert!(sector.contains_point(&Point2::from(polar(1.5, FRAC_PI_4))));
        assert!(!sector.contains_point(&Point2::new(0.5, 0.5)));
    }
}
