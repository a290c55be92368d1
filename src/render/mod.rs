//! Rasterisation: projection, density accumulation and colouring

/// Hit counting strategies
pub mod density;
/// Raster component and its sink trait
pub mod image;
/// Colour ramps
pub mod palette;
/// Model-to-raster projection
pub mod projector;
