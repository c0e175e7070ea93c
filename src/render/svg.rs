use crate::math::Point2;

/// Formats a number for SVG path data.
///
/// Plain decimal notation with the shortest representation that
/// round-trips; never an exponent. Negative zero is written as `0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn svg_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    format!("{value}")
}

/// Formats a point as `x y`.
#[must_use]
pub fn svg_point(point: &Point2) -> String {
    format!("{} {}", svg_number(point.x), svg_number(point.y))
}
