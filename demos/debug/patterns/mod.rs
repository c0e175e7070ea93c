mod curves;
mod dashes;
mod polar;
mod stroke_joins;

use kite::geometry::Shape;

/// All available pattern names.
pub const PATTERNS: &[&str] = &["stroke_joins", "dashes", "curves", "polar"];

/// One shape of a pattern and how to paint it.
pub struct Layer {
    pub shape: Shape,
    pub fill: bool,
    pub color: &'static str,
}

impl Layer {
    pub fn outline(shape: Shape) -> Self {
        Self {
            shape,
            fill: false,
            color: "#202020",
        }
    }

    pub fn filled(shape: Shape, color: &'static str) -> Self {
        Self {
            shape,
            fill: true,
            color,
        }
    }
}

/// Layers for the named pattern, or `None` if no pattern has that name.
pub fn build(name: &str) -> Option<Vec<Layer>> {
    match name {
        "stroke_joins" => Some(stroke_joins::build()),
        "dashes" => Some(dashes::build()),
        "curves" => Some(curves::build()),
        "polar" => Some(polar::build()),
        _ => None,
    }
}
