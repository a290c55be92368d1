//! Conversion of pixel visits into intensity levels
//!
//! Two strategies share one contract: `plot` records a visit, `hit_count`
//! reads it back and `levels` produces the 8-bit intensity raster, 0 meaning
//! never visited and 255 the densest pixels. Levels are always expressed for a
//! black background; inversion for a white one happens at finalisation.

use crate::io::configuration::{APPROXIMATE_FIRST_HIT, DEFAULT_PROBA_HIT_MAX, PROBA_SCALE};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Largest hit count a pixel can reach; further visits are absorbed
pub const MAX_HIT: u32 = u32::MAX - 1;

/// Density strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DensityKind {
    /// Per-pixel hit counters mapped logarithmically
    #[default]
    Exact,
    /// Per-pixel byte levels advanced probabilistically
    Approximate,
}

/// Exact per-pixel hit counting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactDensity {
    hits: Array2<u32>,
    max_hit: u32,
}

impl ExactDensity {
    /// Zeroed counters for a `width × height` raster
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            hits: Array2::zeros((height, width)),
            max_hit: 0,
        }
    }

    /// Count a visit of pixel `(i, j)`; false if it lies outside the raster
    pub fn plot(&mut self, i: usize, j: usize) -> bool {
        let Some(hit) = self.hits.get_mut((j, i)) else {
            return false;
        };
        if *hit < MAX_HIT {
            *hit += 1;
            self.max_hit = self.max_hit.max(*hit);
        }
        true
    }

    /// Visits recorded at `(i, j)`, 0 outside the raster
    pub fn hit_count(&self, i: usize, j: usize) -> u32 {
        self.hits.get((j, i)).copied().unwrap_or(0)
    }

    /// Highest hit count of any pixel
    pub const fn max_hit(&self) -> u32 {
        self.max_hit
    }

    /// Reset every counter
    pub fn clear(&mut self) {
        self.hits.fill(0);
        self.max_hit = 0;
    }

    /// Geometric bin table: entry `c` is `(1 + max_hit)^(c/255)`
    pub fn level_table(&self) -> Vec<f64> {
        let base = 1.0 + f64::from(self.max_hit);
        (0..=255).map(|c| base.powf(f64::from(c) / 255.0)).collect()
    }

    /// Intensity of each pixel: the first bin reaching `1 + hit`
    ///
    /// Equivalent to `255·ln(1 + hit)/ln(1 + max_hit)` rounded up.
    pub fn levels(&self) -> Array2<u8> {
        let table = self.level_table();
        self.hits.mapv(|hit| level_of(&table, hit))
    }
}

fn level_of(table: &[f64], hit: u32) -> u8 {
    if hit == 0 {
        return 0;
    }
    let key = 1.0 + f64::from(hit);
    table.partition_point(|&bin| bin < key).min(255) as u8
}

/// Probabilistic intensity levels in constant memory per pixel
///
/// A pixel enters at the shared first-hit level. Each later visit moves it
/// up one level with probability `exp(−L·(level − first)/255)`; a pixel at
/// the ceiling `255 − first` instead lowers the first-hit level and every
/// stored level by one, widening the range for all pixels at once.
#[derive(Debug, Clone)]
pub struct ApproximateDensity {
    levels: Array2<u8>,
    first_hit: u8,
    log_proba_hit_max: f64,
    plot_probability: Vec<f64>,
    rng: StdRng,
}

impl ApproximateDensity {
    /// Empty raster whose promotion draws come from a generator seeded by `seed`
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        let mut density = Self {
            levels: Array2::zeros((height, width)),
            first_hit: APPROXIMATE_FIRST_HIT,
            log_proba_hit_max: 0.0,
            plot_probability: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        density.set_log_proba_hit_max(DEFAULT_PROBA_HIT_MAX.ln());
        density
    }

    /// Set `L`: reaching the top level takes about `exp(L)` visits
    pub fn set_log_proba_hit_max(&mut self, log_proba: f64) {
        self.log_proba_hit_max = log_proba;
        self.plot_probability = (0..=255)
            .map(|c| (log_proba * f64::from(c) / 255.0).exp())
            .collect();
    }

    /// Current `L`
    pub const fn log_proba_hit_max(&self) -> f64 {
        self.log_proba_hit_max
    }

    /// Set `L` as a fraction in [0, 1] of `ln(2³¹ − 1)`
    pub fn set_proba(&mut self, proba: f64) {
        self.set_log_proba_hit_max(proba * PROBA_SCALE.ln());
    }

    /// Current `L` as a fraction of `ln(2³¹ − 1)`
    pub fn proba(&self) -> f64 {
        self.log_proba_hit_max / PROBA_SCALE.ln()
    }

    /// Level given to a pixel on its first visit
    pub const fn first_hit(&self) -> u8 {
        self.first_hit
    }

    /// Record a visit of `(i, j)`; false if it lies outside the raster
    pub fn plot(&mut self, i: usize, j: usize) -> bool {
        let first = self.first_hit;
        let Some(level) = self.levels.get_mut((j, i)) else {
            return false;
        };
        if *level == 0 {
            *level = first;
            return true;
        }

        let above = usize::from(level.saturating_sub(first));
        let threshold = self.plot_probability.get(above).copied().unwrap_or(f64::INFINITY);
        if self.rng.random::<f64>() * threshold >= 1.0 {
            return true;
        }
        if *level < 255 - first {
            *level += 1;
        } else if first > 1 {
            self.first_hit -= 1;
            self.levels.mapv_inplace(|v| if v > 1 { v - 1 } else { v });
        }
        true
    }

    /// Stored level of `(i, j)`, 0 when never visited or outside the raster
    pub fn hit_count(&self, i: usize, j: usize) -> u32 {
        self.levels.get((j, i)).map_or(0, |&v| u32::from(v))
    }

    /// Estimated visits of `(i, j)`, used to weight colour averaging
    pub fn color_weight(&self, i: usize, j: usize) -> f64 {
        let level = self.levels.get((j, i)).copied().unwrap_or(0);
        1.0 + f64::from(level.abs_diff(self.first_hit))
    }

    /// Forget every visit and restore the first-hit level
    pub fn clear(&mut self) {
        self.levels.fill(0);
        self.first_hit = APPROXIMATE_FIRST_HIT;
    }

    /// Intensity of each pixel
    pub fn levels(&self) -> Array2<u8> {
        self.levels.clone()
    }
}

/// Density buffer of a raster, dispatched on the strategy
#[derive(Debug, Clone)]
pub enum Density {
    /// See `ExactDensity`
    Exact(ExactDensity),
    /// See `ApproximateDensity`
    Approximate(ApproximateDensity),
}

impl Density {
    /// Empty buffer of the requested kind
    pub fn new(kind: DensityKind, width: usize, height: usize, seed: u64) -> Self {
        match kind {
            DensityKind::Exact => Self::Exact(ExactDensity::new(width, height)),
            DensityKind::Approximate => {
                Self::Approximate(ApproximateDensity::new(width, height, seed))
            }
        }
    }

    /// Strategy of this buffer
    pub const fn kind(&self) -> DensityKind {
        match self {
            Self::Exact(_) => DensityKind::Exact,
            Self::Approximate(_) => DensityKind::Approximate,
        }
    }

    /// Record a visit of `(i, j)`; false if it lies outside the raster
    pub fn plot(&mut self, i: usize, j: usize) -> bool {
        match self {
            Self::Exact(density) => density.plot(i, j),
            Self::Approximate(density) => density.plot(i, j),
        }
    }

    /// Hits recorded at `(i, j)` as understood by the strategy
    pub fn hit_count(&self, i: usize, j: usize) -> u32 {
        match self {
            Self::Exact(density) => density.hit_count(i, j),
            Self::Approximate(density) => density.hit_count(i, j),
        }
    }

    /// Weight of the newest colour sample in the running average at `(i, j)`
    pub fn color_weight(&self, i: usize, j: usize) -> f64 {
        match self {
            Self::Exact(density) => f64::from(density.hit_count(i, j)),
            Self::Approximate(density) => density.color_weight(i, j),
        }
    }

    /// Forget every visit
    pub fn clear(&mut self) {
        match self {
            Self::Exact(density) => density.clear(),
            Self::Approximate(density) => density.clear(),
        }
    }

    /// Intensity levels for a black background
    pub fn levels(&self) -> Array2<u8> {
        match self {
            Self::Exact(density) => density.levels(),
            Self::Approximate(density) => density.levels(),
        }
    }
}
