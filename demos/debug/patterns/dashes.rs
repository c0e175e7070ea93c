//! Dash patterns over lines, a rounded rectangle and a circle.

use kite::geometry::Shape;
use kite::math::Point2;

use super::Layer;

pub fn build() -> Vec<Layer> {
    let shapes = [
        Shape::line_segment(Point2::new(0.0, 0.0), Point2::new(12.0, 0.0)),
        Shape::round_rectangle(0.0, 2.0, 12.0, 6.0, 2.0, 2.0),
        Shape::circle(18.0, 5.0, 3.0),
    ];
    let patterns: [(&[f64], f64); 3] = [
        (&[2.0, 1.0][..], 0.0),
        (&[3.0, 1.0, 0.5, 1.0][..], 1.5),
        (&[1.0][..], 0.0),
    ];
    let mut layers = Vec::new();
    for (shape, (dash, offset)) in shapes.into_iter().zip(patterns) {
        match shape.dashed(dash, offset) {
            Ok(dashed) => layers.push(Layer::outline(dashed)),
            Err(err) => tracing::warn!(%err, "dash failed"),
        }
    }
    layers
}
