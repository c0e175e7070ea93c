//! Curve builders: smooth Beziers, elliptical arcs and a cardinal spline,
//! each drawn next to its piecewise-linear approximation.

use kite::geometry::Shape;
use kite::math::Point2;
use kite::tessellation::PiecewiseLinearOptions;

use super::Layer;

pub fn build() -> Vec<Layer> {
    let mut beziers = Shape::new();
    beziers
        .move_to(0.0, 0.0)
        .cubic_curve_to(1.0, 4.0, 3.0, 4.0, 4.0, 0.0)
        .smooth_cubic_curve_to(7.0, -4.0, 8.0, 0.0)
        .quadratic_curve_to(9.0, 3.0, 10.0, 0.0)
        .smooth_quadratic_curve_to(12.0, 0.0);

    let mut ellipse = Shape::new();
    ellipse
        .move_to(0.0, 8.0)
        .elliptical_arc(4.0, 8.0, 4.0, 2.0, 0.5, std::f64::consts::PI, 0.0, true);

    let points = [
        Point2::new(0.0, 12.0),
        Point2::new(3.0, 15.0),
        Point2::new(6.0, 12.0),
        Point2::new(9.0, 15.0),
        Point2::new(12.0, 12.0),
    ];
    let mut spline = Shape::new();
    if let Err(err) = spline.cardinal_spline(&points, 0.0, false) {
        tracing::warn!(%err, "spline failed");
    }

    let options = PiecewiseLinearOptions::default();
    let mut layers = Vec::new();
    for shape in [beziers, ellipse, spline] {
        let flat = shape.to_piecewise_linear(&options);
        layers.push(Layer::outline(shape));
        layers.push(Layer::filled(flat, "#c06030"));
    }
    layers
}
