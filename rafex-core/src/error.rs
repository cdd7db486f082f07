use thiserror::Error;

use crate::shape::ShapeHandle;

/// Rejections raised while resolving a trial configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown colour `{0}`")]
    UnknownColor(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("unknown render mode `{0}` (expected `rod` or `dots`)")]
    UnknownRenderMode(String),
    #[error("`{field}` must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("`{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("key `{0}` is bound to more than one action")]
    DuplicateKey(crate::key::Key),
}

/// Failures of a render surface.
#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("no canvas has been created")]
    NoCanvas,
    #[error("cannot allocate a {width}x{height} canvas")]
    CanvasAllocation { width: u32, height: u32 },
    #[error("unknown shape handle {0:?}")]
    UnknownShape(ShapeHandle),
    #[error("patch does not apply to shape {0:?}")]
    PatchMismatch(ShapeHandle),
}
