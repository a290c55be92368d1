//! Iterated function systems: transforms, skeletons and their interpolation

/// Axis-aligned bounding box of orbit samples
pub mod bounds;
/// Interactive editing gestures on a transform
pub mod editing;
/// Blending and animation plans
pub mod interpolation;
/// Generation mode shared by all transforms of a run
pub mod mode;
/// Weighted transform collection driving the chaos game
pub mod skeleton;
/// Six-coefficient parametric maps
pub mod transform;
