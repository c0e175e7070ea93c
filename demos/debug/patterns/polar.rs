//! A grid of rectangles in (angle, radius) space mapped to cartesian space.

use std::f64::consts::FRAC_PI_4;

use kite::geometry::Shape;
use kite::tessellation::PiecewiseLinearOptions;

use super::Layer;

pub fn build() -> Vec<Layer> {
    let options = PiecewiseLinearOptions::default().with_curvature();
    let mut layers = Vec::new();
    for ring in 0..3 {
        for sector in 0..8 {
            if (ring + sector) % 2 == 1 {
                continue;
            }
            let cell = Shape::rectangle(
                f64::from(sector) * FRAC_PI_4,
                2.0 + f64::from(ring) * 2.0,
                FRAC_PI_4,
                2.0,
            );
            layers.push(Layer::filled(cell.polar_to_cartesian(&options), "#40a060"));
        }
    }
    layers
}
