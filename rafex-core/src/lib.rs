pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod key;
pub mod phase;
pub mod scoring;
pub mod shape;
pub mod surface;
pub mod trial;

pub use color::Color;
pub use config::{KeyBindings, RenderMode, TrialConfig};
pub use error::{ConfigError, SurfaceError};
pub use geometry::{Layout, Point};
pub use key::Key;
pub use phase::{Phase, TrialPhase};
pub use shape::{Shape, ShapeHandle, ShapePatch};
pub use surface::{Scene, Surface};
pub use trial::{TrialResult, TrialState};
