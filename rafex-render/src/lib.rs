pub mod raster;
pub mod surface;
pub mod text;
pub use surface::SkiaSurface;
