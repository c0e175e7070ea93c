use thiserror::Error;

/// Top-level error type for the kite geometry kernel.
#[derive(Debug, Error)]
pub enum KiteError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("transform is not invertible (zero determinant)")]
    SingularTransform,

    #[error("elliptical arc requires radius_x >= radius_y, got radius_x = {radius_x}, radius_y = {radius_y}")]
    InvalidEllipse { radius_x: f64, radius_y: f64 },
}

/// Errors related to path operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),
}

/// Errors related to stroking, dashing and tessellation parameters.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience type alias for results using [`KiteError`].
pub type Result<T> = std::result::Result<T, KiteError>;
