pub mod error;
pub mod geometry;
pub mod math;
pub mod render;
pub mod tessellation;

pub use error::{KiteError, Result};
