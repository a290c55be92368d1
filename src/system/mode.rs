//! Generation mode shared by every transform of a run

use crate::math::formula::FormulaPoint;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, SQRT_2};

/// How the six coefficients of a transform are interpreted
///
/// One mode is active for a whole generation pass; it is passed explicitly
/// to every transform and skeleton operation that depends on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    /// Affine map `(a·x + c·y + e, b·x + d·y + f)`
    #[default]
    Linear,
    /// `(a·cos x + c·sin y + e, b·sin x + d·cos y + f)`
    Sinusoidal,
    /// Inverse quadratic iteration: a random complex square root of an affine image
    Julia,
    /// User formulas over `x y a b c d e f`
    Formula(FormulaPoint),
}

/// Mode without its formula payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// See `Mode::Linear`
    #[default]
    Linear,
    /// See `Mode::Sinusoidal`
    Sinusoidal,
    /// See `Mode::Julia`
    Julia,
    /// See `Mode::Formula`
    Formula,
}

impl Mode {
    /// Discriminant of this mode
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Linear => ModeKind::Linear,
            Self::Sinusoidal => ModeKind::Sinusoidal,
            Self::Julia => ModeKind::Julia,
            Self::Formula(_) => ModeKind::Formula,
        }
    }

    /// Whether orbits may escape to infinity and need periodic reseeding
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Sinusoidal | Self::Formula(_))
    }

    /// Whether transform areas are meaningful as selection weights
    pub const fn uses_area_weights(&self) -> bool {
        !matches!(self, Self::Formula(_))
    }

    /// Radii `(vectors, center)` used when randomizing `transform_count` transforms
    pub fn random_radii(&self, transform_count: usize) -> (f64, f64) {
        match self {
            Self::Linear => {
                let vectors = if transform_count >= 2 {
                    1.0 / SQRT_2.powf(((transform_count - 1) as f64).sqrt() - 1.0)
                } else {
                    1.0
                };
                (vectors, 0.5)
            }
            Self::Sinusoidal => (1.8, FRAC_PI_2),
            Self::Julia | Self::Formula(_) => (1.8, 1.0),
        }
    }

    /// Edge of the square a reshaped transform becomes
    pub const fn square_edge(&self) -> f64 {
        match self {
            Self::Linear => 0.5,
            Self::Sinusoidal => FRAC_PI_2,
            Self::Julia | Self::Formula(_) => 1.0,
        }
    }

    /// The formula pair, in formula mode
    pub const fn formula(&self) -> Option<&FormulaPoint> {
        match self {
            Self::Formula(formula) => Some(formula),
            _ => None,
        }
    }
}
