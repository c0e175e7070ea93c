use tracing::{debug, trace};

use super::line_styles::validate_dash;
use crate::error::Result;
use crate::geometry::{Curve, Segment, Shape, Subpath};

/// Samples used to approximate arc length along a curved segment.
const LENGTH_SAMPLES: usize = 64;

/// Cuts the subpaths of a [`Shape`] into the "on" intervals of a dash
/// pattern.
///
/// Odd-length patterns repeat twice, as on a canvas. The offset is taken
/// modulo the pattern length, so negative offsets shift the pattern forward.
/// Each dash becomes an open subpath; on a closed subpath a dash running
/// through the start point is joined into one piece.
#[derive(Debug)]
pub struct TessellateDash<'a> {
    shape: &'a Shape,
    line_dash: &'a [f64],
    line_dash_offset: f64,
}

impl<'a> TessellateDash<'a> {
    /// Creates a new dash operation.
    #[must_use]
    pub fn new(shape: &'a Shape, line_dash: &'a [f64], line_dash_offset: f64) -> Self {
        Self {
            shape,
            line_dash,
            line_dash_offset,
        }
    }

    /// Executes the dash operation.
    ///
    /// An empty or all-zero pattern returns the shape unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a dash length is negative or not finite, or if
    /// the offset is not finite.
    pub fn execute(&self) -> Result<Shape> {
        validate_dash(self.line_dash, self.line_dash_offset)?;
        let pattern: Vec<f64> = if self.line_dash.len() % 2 == 1 {
            self.line_dash.repeat(2)
        } else {
            self.line_dash.to_vec()
        };
        let period: f64 = pattern.iter().sum();
        if period <= 0.0 {
            return Ok(self.shape.clone());
        }

        let mut subpaths = Vec::new();
        for subpath in self.shape.subpaths().iter().filter(|s| s.is_drawable()) {
            let state = DashState::new(&pattern, self.line_dash_offset.rem_euclid(period));
            let dashes = dash_subpath(subpath, state);
            trace!(dashes = dashes.len(), closed = subpath.is_closed(), "dashed subpath");
            subpaths.extend(dashes);
        }
        debug!(
            input_subpaths = self.shape.subpaths().len(),
            output_subpaths = subpaths.len(),
            "dash completed"
        );
        Ok(Shape::from_subpaths(subpaths))
    }
}

/// Position within the dash pattern.
struct DashState<'a> {
    pattern: &'a [f64],
    index: usize,
    remaining: f64,
    on: bool,
}

impl<'a> DashState<'a> {
    fn new(pattern: &'a [f64], mut offset: f64) -> Self {
        let mut state = Self {
            pattern,
            index: 0,
            remaining: pattern[0],
            on: true,
        };
        while offset > state.remaining {
            offset -= state.remaining;
            state.advance();
        }
        state.remaining -= offset;
        state
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.pattern.len();
        self.remaining = self.pattern[self.index];
        self.on = !self.on;
    }
}

/// Cumulative arc length at increasing parameters of one segment.
struct LengthTable {
    ts: Vec<f64>,
    lengths: Vec<f64>,
}

impl LengthTable {
    #[allow(clippy::cast_precision_loss)]
    fn new(segment: &Segment) -> Self {
        if let Segment::Line(_) = segment {
            return Self {
                ts: vec![0.0, 1.0],
                lengths: vec![0.0, segment.arc_length()],
            };
        }
        let mut ts = Vec::with_capacity(LENGTH_SAMPLES + 1);
        let mut lengths = Vec::with_capacity(LENGTH_SAMPLES + 1);
        let mut previous = segment.start();
        let mut length = 0.0;
        for i in 0..=LENGTH_SAMPLES {
            let t = i as f64 / LENGTH_SAMPLES as f64;
            let position = segment.position_at(t);
            length += (position - previous).norm();
            previous = position;
            ts.push(t);
            lengths.push(length);
        }
        Self { ts, lengths }
    }

    fn total(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    fn t_at(&self, length: f64) -> f64 {
        let i = self.lengths.partition_point(|l| *l < length);
        if i == 0 {
            return 0.0;
        }
        if i >= self.lengths.len() {
            return 1.0;
        }
        let (l0, l1) = (self.lengths[i - 1], self.lengths[i]);
        let (t0, t1) = (self.ts[i - 1], self.ts[i]);
        if l1 <= l0 {
            t0
        } else {
            t0 + (t1 - t0) * (length - l0) / (l1 - l0)
        }
    }
}

/// Parameters where the pattern toggles inside `segment`, and whether the
/// segment starts inside a dash. Advances `state` past the segment.
fn segment_cuts(segment: &Segment, state: &mut DashState<'_>) -> (Vec<f64>, bool) {
    let table = LengthTable::new(segment);
    let length = table.total();
    let mut starts_on = state.on;
    let mut cuts: Vec<f64> = Vec::new();
    let mut walked = 0.0;
    loop {
        let step = state.remaining;
        if walked + step >= length {
            state.remaining -= length - walked;
            break;
        }
        walked += step;
        state.advance();
        let t = table.t_at(walked);
        if cuts.is_empty() && t <= 0.0 {
            starts_on = state.on;
        } else if cuts.last().is_some_and(|last| t - last <= f64::EPSILON) {
            // Two toggles at one parameter cancel.
            cuts.pop();
        } else {
            cuts.push(t);
        }
    }
    (cuts, starts_on)
}

fn dash_subpath(subpath: &Subpath, mut state: DashState<'_>) -> Vec<Subpath> {
    let mut dashes: Vec<Vec<Segment>> = Vec::new();
    let mut current: Option<Vec<Segment>> = None;
    let mut starts_on = None;
    let mut ever_off = false;

    for segment in subpath.stroke_segments() {
        let (cuts, mut on) = segment_cuts(&segment, &mut state);
        starts_on.get_or_insert(on);
        for piece in segment.subdivisions(&cuts) {
            if on {
                current.get_or_insert_with(Vec::new).push(piece);
            } else {
                ever_off = true;
                if let Some(dash) = current.take() {
                    dashes.push(dash);
                }
            }
            on = !on;
        }
    }

    if subpath.is_closed() && !ever_off {
        if let Some(whole) = current {
            return vec![Subpath::from_segments(whole, true)];
        }
    }
    if let Some(mut last) = current {
        if subpath.is_closed() && starts_on == Some(true) && !dashes.is_empty() {
            last.append(&mut dashes[0]);
            dashes[0] = last;
        } else {
            dashes.push(last);
        }
    }
    dashes
        .into_iter()
        .map(|segments| Subpath::from_segments(segments, false))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn line() -> Shape {
        Shape::line_segment(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0))
    }

    fn spans(shape: &Shape) -> Vec<(f64, f64)> {
        shape
            .subpaths()
            .iter()
            .map(|subpath| {
                let bounds = subpath.bounds();
                (bounds.min_x(), bounds.max_x())
            })
            .collect()
    }

    fn assert_spans(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(a.0, e.0, epsilon = 1e-9);
            assert_abs_diff_eq!(a.1, e.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn dashes_a_line() {
        let dashed = line().dashed(&[2.0, 1.0], 0.0).unwrap();
        assert_spans(
            &spans(&dashed),
            &[(0.0, 2.0), (3.0, 5.0), (6.0, 8.0), (9.0, 10.0)],
        );
        assert!(dashed.subpaths().iter().all(|s| !s.is_closed()));
    }

    #[test]
    fn offset_shifts_the_pattern() {
        let dashed = line().dashed(&[2.0, 1.0], 1.0).unwrap();
        assert_spans(
            &spans(&dashed),
            &[(0.0, 1.0), (2.0, 4.0), (5.0, 7.0), (8.0, 10.0)],
        );

        let dashed = line().dashed(&[2.0, 1.0], -1.0).unwrap();
        assert_spans(&spans(&dashed), &[(1.0, 3.0), (4.0, 6.0), (7.0, 9.0)]);
    }

    #[test]
    fn odd_pattern_repeats() {
        let dashed = line().dashed(&[1.0], 0.0).unwrap();
        assert_eq!(dashed.subpaths().len(), 5);
    }

    #[test]
    fn zero_length_gaps_are_skipped() {
        let dashed = line().dashed(&[5.0, 0.0], 0.0).unwrap();
        assert_spans(&spans(&dashed), &[(0.0, 10.0)]);
    }

    #[test]
    fn empty_pattern_is_identity() {
        let shape = line();
        let dashed = shape.dashed(&[], 0.0).unwrap();
        assert_eq!(dashed.subpaths(), shape.subpaths());
        let dashed = shape.dashed(&[0.0, 0.0], 3.0).unwrap();
        assert_eq!(dashed.subpaths(), shape.subpaths());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(line().dashed(&[1.0, -1.0], 0.0).is_err());
        assert!(line().dashed(&[1.0, f64::NAN], 0.0).is_err());
        assert!(line().dashed(&[1.0, 1.0], f64::NAN).is_err());
    }

    #[test]
    fn closed_subpath_joins_across_start() {
        let square = Shape::rectangle(0.0, 0.0, 4.0, 4.0);
        let dashed = square.dashed(&[6.0, 2.0], 4.0).unwrap();
        assert_eq!(dashed.subpaths().len(), 2);
        assert_abs_diff_eq!(dashed.arc_length(), 12.0, epsilon = 1e-9);
        let joined = &dashed.subpaths()[0];
        assert_eq!(joined.segments().len(), 2);
        assert_eq!(joined.first_point(), Some(Point2::new(0.0, 4.0)));
        assert_eq!(joined.last_point(), Some(Point2::new(2.0, 0.0)));
    }

    #[test]
    fn closed_subpath_never_off_stays_closed() {
        let square = Shape::rectangle(0.0, 0.0, 4.0, 4.0);
        let dashed = square.dashed(&[100.0, 1.0], 0.0).unwrap();
        assert_eq!(dashed.subpaths().len(), 1);
        assert!(dashed.subpaths()[0].is_closed());
        assert_abs_diff_eq!(dashed.area(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn dashes_follow_curves() {
        let circle = Shape::circle(0.0, 0.0, 1.0);
        let dashed = circle.dashed(&[FRAC_PI_2, FRAC_PI_2], 0.0).unwrap();
        assert_eq!(dashed.subpaths().len(), 2);
        for subpath in dashed.subpaths() {
            assert_abs_diff_eq!(subpath.arc_length(), FRAC_PI_2, epsilon = 1e-2);
            for segment in subpath.segments() {
                assert_abs_diff_eq!(segment.start().coords.norm(), 1.0, epsilon = 1e-9);
            }
        }
        assert_abs_diff_eq!(dashed.arc_length(), PI, epsilon = 2e-2);
    }
}
