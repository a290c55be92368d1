//! Generation passes driving skeletons into rasters

/// Animation frame sequences
pub mod animation;
/// Resumable point generation
pub mod generator;
