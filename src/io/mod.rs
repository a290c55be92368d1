//! Command line, configuration, errors and file formats

/// Command-line parsing and the command runner
pub mod cli;
/// Generation constants and defaults
pub mod configuration;
/// Crate error type
pub mod error;
/// PNG export
pub mod image;
/// Tracing subscriber setup
pub mod logging;
/// Skeleton documents and Fractint export
pub mod persistence;
/// Terminal progress bars
pub mod progress;
/// Animated GIF export
pub mod visualization;
