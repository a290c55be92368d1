//! Iterated function system fractals drawn with the chaos game
//!
//! A skeleton of contracting transforms is iterated from a random orbit; every
//! visited point is projected into a density raster whose hit counts are
//! mapped to intensities. Skeletons can be randomized, edited, blended into
//! animations and stored as JSON.

#![forbid(unsafe_code)]

/// Generation passes and animations
pub mod engine;
/// Command line, configuration, errors and file formats
pub mod io;
/// Prefix expressions and point formulas
pub mod math;
/// Density rasters, projection and colouring
pub mod render;
/// Transforms, skeletons and their interpolation
pub mod system;

pub use io::error::{IfsError, Result};
