//! Expression parsing and evaluation for formula-driven transforms

/// Prefix-notation expression trees
pub mod expression;
/// Coordinate formula pairs over transform coefficients
pub mod formula;
