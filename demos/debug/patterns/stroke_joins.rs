//! Stroke outlines of one zigzag for every join and cap combination.
//!
//! Rows: miter / round / bevel joins. Columns: butt / round / square caps.

use kite::geometry::Shape;
use kite::tessellation::{LineCap, LineJoin, LineStyles};

use super::Layer;

const WIDTH: f64 = 0.8;
const SPACING: f64 = 8.0;

pub fn build() -> Vec<Layer> {
    let joins = [LineJoin::Miter, LineJoin::Round, LineJoin::Bevel];
    let caps = [LineCap::Butt, LineCap::Round, LineCap::Square];
    let mut layers = Vec::new();
    for (row, join) in joins.into_iter().enumerate() {
        for (column, cap) in caps.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let (x, y) = (column as f64 * SPACING, row as f64 * SPACING);
            let mut zigzag = Shape::new();
            zigzag
                .move_to(x, y)
                .line_to(x + 2.0, y + 4.0)
                .line_to(x + 4.0, y)
                .quadratic_curve_to(x + 6.0, y, x + 6.0, y + 4.0);
            let Ok(styles) = LineStyles::new(WIDTH) else {
                continue;
            };
            let styles = styles.with_join(join).with_cap(cap);
            layers.push(Layer::filled(zigzag.stroked(&styles), "#3070c0"));
            layers.push(Layer::outline(zigzag));
        }
    }
    layers
}
