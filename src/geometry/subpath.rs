use tracing::trace;

use crate::geometry::{Bounds2, Curve, Line, Ray2, RayIntersection, Segment};
use crate::math::transform_2d::transform_point;
use crate::math::{points_equal_eps, Matrix3, Point2};
use crate::render::{svg::svg_point, PathSink};

/// Endpoints closer than this are treated as the same vertex when deciding
/// whether a closed subpath needs an implicit closing line.
pub const CLOSING_EPSILON: f64 = 1e-9;

/// One contiguous run of segments within a [`Shape`](crate::geometry::Shape).
///
/// Holds the points added by drawing calls alongside the drawable segments.
/// Degenerate segments are dropped on insertion, so every stored segment has
/// well-defined tangents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subpath {
    points: Vec<Point2>,
    segments: Vec<Segment>,
    closed: bool,
}

impl Subpath {
    /// Creates an empty, open subpath.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a subpath from a chain of segments, recording their endpoints
    /// as the point list.
    #[must_use]
    pub fn from_segments(segments: Vec<Segment>, closed: bool) -> Self {
        let mut subpath = Self::new();
        if let Some(first) = segments.first() {
            subpath.add_point(first.start());
        }
        for segment in segments {
            subpath.add_point(segment.end());
            subpath.add_segment(segment);
        }
        if closed {
            subpath.close();
        }
        subpath
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn first_point(&self) -> Option<Point2> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn last_point(&self) -> Option<Point2> {
        self.points.last().copied()
    }

    #[must_use]
    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn add_point(&mut self, point: Point2) -> &mut Self {
        self.points.push(point);
        self
    }

    /// Appends a segment. Invalid segments are silently dropped.
    pub fn add_segment(&mut self, segment: Segment) -> &mut Self {
        if segment.is_invalid() {
            trace!(?segment, "dropping degenerate segment");
            return self;
        }
        debug_assert!(
            is_finite_point(&segment.start()) && is_finite_point(&segment.end()),
            "segment endpoints must be finite"
        );
        debug_assert!(
            segment.start_tangent().iter().all(|v| v.is_finite())
                && segment.end_tangent().iter().all(|v| v.is_finite()),
            "segment tangents must be finite"
        );
        debug_assert!(segment.bounds().is_finite(), "segment bounds must be finite");
        self.segments.push(segment);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    /// Whether the subpath has at least one segment to draw.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        !self.segments.is_empty()
    }

    fn ends_differ(&self) -> bool {
        match (self.first_point(), self.last_point()) {
            (Some(first), Some(last)) => !points_equal_eps(&first, &last, CLOSING_EPSILON),
            _ => false,
        }
    }

    /// Whether the subpath is closed but its last point is not its first.
    #[must_use]
    pub fn has_closing_segment(&self) -> bool {
        self.closed && self.ends_differ()
    }

    /// The implicit line from the last point back to the first.
    #[must_use]
    pub fn closing_segment(&self) -> Option<Line> {
        if !self.has_closing_segment() {
            return None;
        }
        let (first, last) = (self.first_point()?, self.last_point()?);
        Some(Line::new(last, first))
    }

    /// The stored segments plus the closing line of a closed subpath. These
    /// are what get stroked, hit-tested and wound.
    #[must_use]
    pub fn stroke_segments(&self) -> Vec<Segment> {
        let mut segments = self.segments.clone();
        if let Some(closing) = self.closing_segment() {
            segments.push(closing.into());
        }
        segments
    }

    /// The stored segments closed back to the first point whether or not the
    /// subpath is closed. Only used for area.
    #[must_use]
    pub fn fill_segments(&self) -> Vec<Segment> {
        let mut segments = self.segments.clone();
        if self.is_drawable() && self.ends_differ() {
            if let (Some(first), Some(last)) = (self.first_point(), self.last_point()) {
                segments.push(Line::new(last, first).into());
            }
        }
        segments
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        let bounds = self
            .segments
            .iter()
            .fold(Bounds2::EMPTY, |acc, segment| acc.union(&segment.bounds()));
        match self.closing_segment() {
            Some(closing) => bounds.union(&closing.bounds()),
            None => bounds,
        }
    }

    /// Hits of every stroke segment, unsorted.
    #[must_use]
    pub fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection> {
        self.stroke_segments()
            .iter()
            .flat_map(|segment| segment.intersection(ray))
            .collect()
    }

    /// Summed winding contribution of the segments and, when closed, the
    /// closing segment. An open subpath is not implicitly closed.
    #[must_use]
    pub fn winding_intersection(&self, ray: &Ray2) -> i32 {
        self.stroke_segments()
            .iter()
            .map(|segment| segment.winding_intersection(ray))
            .sum()
    }

    #[must_use]
    pub fn transformed(&self, matrix: &Matrix3) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|point| transform_point(matrix, point))
                .collect(),
            segments: self
                .segments
                .iter()
                .map(|segment| segment.transformed(matrix))
                .filter(|segment| !segment.is_invalid())
                .collect(),
            closed: self.closed,
        }
    }

    /// The same subpath walked from its last point to its first.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
            segments: self.segments.iter().rev().map(Curve::reversed).collect(),
            closed: self.closed,
        }
    }

    /// Signed enclosed area, positive when the fill winds toward increasing
    /// angles.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.fill_segments()
            .iter()
            .map(Curve::signed_area_fragment)
            .sum()
    }

    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.stroke_segments().iter().map(Curve::arc_length).sum()
    }

    pub fn write_to_context(&self, sink: &mut dyn PathSink) {
        let Some(first) = self.segments.first() else {
            return;
        };
        sink.move_to(&first.start());
        for segment in &self.segments {
            segment.write_to_context(sink);
        }
        if self.closed {
            sink.close_path();
        }
    }

    /// SVG path data for this subpath, empty when nothing is drawable.
    #[must_use]
    pub fn svg_path(&self) -> String {
        let Some(first) = self.segments.first() else {
            return String::new();
        };
        let mut path = format!("M {} ", svg_point(&first.start()));
        for segment in &self.segments {
            path.push_str(&segment.svg_path_fragment());
            path.push(' ');
        }
        if self.closed {
            path.push_str("Z ");
        }
        path
    }
}

fn is_finite_point(point: &Point2) -> bool {
    point.x.is_finite() && point.y.is_finite()
}
