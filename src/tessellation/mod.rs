//! Operations that turn a [`Shape`](crate::geometry::Shape) into another
//! shape: stroke outlines, dash patterns and piecewise-linear approximations.

mod dash;
mod line_styles;
mod piecewise;
mod stroke;

pub use dash::TessellateDash;
pub use line_styles::{LineCap, LineJoin, LineStyles};
pub use piecewise::{ExactMethod, PiecewiseLinearOptions, PointMap, TessellatePiecewise};
pub use stroke::TessellateStroke;
