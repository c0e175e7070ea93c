pub mod bounds;
pub mod ray;
pub mod segment;
pub mod shape;
pub mod subpath;

pub use bounds::Bounds2;
pub use ray::{Ray2, RayIntersection};
pub use segment::{Arc, Cubic, Curve, EllipticalArc, Line, Quadratic, Segment};
pub use shape::{CornerRadii, Shape};
pub use subpath::Subpath;
