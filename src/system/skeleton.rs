//! Weighted collection of transforms driving the chaos game
//!
//! A skeleton holds a frame transform, used only to position the view, and
//! between 1 and `MAX_TRANSFORMS` transforms whose random, area-weighted
//! application traces the attractor. Indices used for selection count the
//! frame as 0 and the transforms from 1.

use crate::io::configuration::{
    BURN_IN_DIVISOR, DEMO_DIMENSION_RANGE, DIMENSION_SEARCH_MAX, DIMENSION_TOLERANCE,
    DIVERGENCE_BOUND, DIVERGENCE_CHECK_STEPS, MAX_RANDOM_ATTEMPTS, MAX_TRANSFORMS,
    REFRAME_CHECK_INTERVAL, SETTLE_ITERATIONS,
};
use crate::io::error::{IfsError, Result, computation_error, invalid_parameter};
use crate::system::bounds::MinMax;
use crate::system::editing::Gesture;
use crate::system::mode::Mode;
use crate::system::transform::Transform;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, trace, warn};

/// Orbit state carried between generation calls
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitPoint {
    /// Model x coordinate
    pub x: f64,
    /// Model y coordinate
    pub y: f64,
    /// Running label in [0, 1] of the transforms visited, used for coloring
    pub color: f64,
}

impl OrbitPoint {
    /// Point at `(x, y)` with a zero color label
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, color: 0.0 }
    }

    /// Uniform point in [−1, 1]² keeping the color label
    pub fn reseeded<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        Self {
            x: rng.random::<f64>().mul_add(2.0, -1.0),
            y: rng.random::<f64>().mul_add(2.0, -1.0),
            color: self.color,
        }
    }

    /// Whether both coordinates are finite
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Built-in starting skeletons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Two half-scale rotations tracing the Heighway dragon
    #[default]
    Dragon,
    /// Two maps tracing a twin-dragon triangle
    Triangle,
}

/// Frame transform, transforms and their selection probabilities
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    frame: Transform,
    transforms: Vec<Transform>,
    probabilities: Vec<f64>,
    selected: usize,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl Skeleton {
    /// Built-in skeleton with an identity frame
    pub fn preset(preset: Preset) -> Self {
        let first = match preset {
            Preset::Dragon => Transform::new(0.5, 0.5, -0.5, 0.5, -0.25, 0.0),
            Preset::Triangle => Transform::new(0.5, 0.5, 0.5, -0.5, -0.25, 0.0),
        };
        let second = Transform::new(-0.5, 0.5, -0.5, -0.5, 0.25, 0.0);
        Self::with_transforms(Transform::IDENTITY, vec![first, second], 1)
    }

    /// `count` equal squares of area `1/count`
    ///
    /// Squares tile a grid when `count` is a perfect square, otherwise their
    /// centers sit on a circle of radius 0.5.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is 0 or above `MAX_TRANSFORMS`
    pub fn regular(count: usize) -> Result<Self> {
        check_count(count)?;
        let edge = (1.0 / count as f64).sqrt();
        let side = count.isqrt();
        let grid = side * side == count;

        let transforms = (0..count)
            .map(|i| {
                let (e, f) = if grid {
                    (
                        edge.mul_add(0.5 + (i % side) as f64, -0.5),
                        edge.mul_add(0.5 + (i / side) as f64, -0.5),
                    )
                } else {
                    let angle = 2.0 * PI * i as f64 / count as f64;
                    (0.5 * angle.cos(), 0.5 * angle.sin())
                };
                Transform::new(edge, 0.0, 0.0, edge, e, f)
            })
            .collect();
        Ok(Self::with_transforms(Transform::IDENTITY, transforms, 1))
    }

    /// Assemble a skeleton from stored parts
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `transforms` is empty or longer than `MAX_TRANSFORMS`
    /// - `selected` is past the last transform
    pub fn from_parts(
        frame: Transform,
        transforms: Vec<Transform>,
        selected: usize,
    ) -> Result<Self> {
        check_count(transforms.len())?;
        if selected > transforms.len() {
            return Err(invalid_parameter(
                "selected",
                &selected,
                &format!("must be at most {}", transforms.len()),
            ));
        }
        Ok(Self::with_transforms(frame, transforms, selected))
    }

    fn with_transforms(frame: Transform, transforms: Vec<Transform>, selected: usize) -> Self {
        let mut skeleton = Self {
            frame,
            probabilities: Vec::with_capacity(transforms.len()),
            transforms,
            selected,
        };
        skeleton.update_probabilities();
        skeleton
    }

    /// Transform that positions the view
    pub const fn frame(&self) -> &Transform {
        &self.frame
    }

    /// Replace the frame transform
    pub const fn set_frame(&mut self, frame: Transform) {
        self.frame = frame;
    }

    /// Transforms used by the chaos game, frame excluded
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Selection probability of each transform, summing to 1
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of transforms, frame excluded
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Always false; a skeleton keeps at least one transform
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Selected index, 0 for the frame
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Transform at `index`, 0 being the frame
    pub fn get(&self, index: usize) -> Option<&Transform> {
        if index == 0 {
            Some(&self.frame)
        } else {
            self.transforms.get(index - 1)
        }
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Transform> {
        if index == 0 {
            Some(&mut self.frame)
        } else {
            self.transforms.get_mut(index - 1)
        }
    }

    /// The selected transform
    pub fn selected_transform(&self) -> &Transform {
        self.get(self.selected).unwrap_or(&self.frame)
    }

    /// Select the transform at `index`, 0 being the frame
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is past the last transform
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index > self.len() {
            return Err(invalid_parameter(
                "selected",
                &index,
                &format!("must be at most {}", self.len()),
            ));
        }
        self.selected = index;
        Ok(())
    }

    /// Move the selection by `k`, cycling through frame and transforms
    pub fn shift_selected(&mut self, k: isize) {
        let slots = self.len() as isize + 1;
        self.selected = (self.selected as isize + k).rem_euclid(slots) as usize;
    }

    /// Select the transform with the largest area
    pub fn select_biggest(&mut self) {
        let mut biggest = 0.0;
        self.selected = 1;
        for (index, transform) in self.transforms.iter().enumerate() {
            if transform.surface() > biggest {
                biggest = transform.surface();
                self.selected = index + 1;
            }
        }
    }

    /// Total area of the transforms
    pub fn sum_surfaces(&self) -> f64 {
        self.transforms.iter().map(Transform::surface).sum()
    }

    /// Recompute probabilities proportional to area
    ///
    /// Falls back to uniform weights when every transform is degenerate.
    pub fn update_probabilities(&mut self) {
        let total = self.sum_surfaces();
        let count = self.transforms.len() as f64;
        self.probabilities.clear();
        if total > 0.0 && total.is_finite() {
            self.probabilities
                .extend(self.transforms.iter().map(|t| t.surface() / total));
        } else {
            self.probabilities
                .extend(self.transforms.iter().map(|_| 1.0 / count));
        }
        trace!(probabilities = ?self.probabilities, "updated probabilities");
    }

    /// One chaos game step
    ///
    /// Picks a transform by cumulative probability (uniformly in formula
    /// mode), applies it and folds the choice into the color label.
    pub fn next_point<R: Rng + ?Sized>(
        &self,
        mode: &Mode,
        point: OrbitPoint,
        rng: &mut R,
    ) -> OrbitPoint {
        let (index, color) = if mode.uses_area_weights() {
            let draw = rng.random::<f64>();
            let last = self.transforms.len().saturating_sub(1);
            let mut cumulative = 0.0;
            let mut index = 0;
            while index < last {
                let probability = self.probabilities.get(index).copied().unwrap_or(0.0);
                if cumulative + probability >= draw {
                    break;
                }
                cumulative += probability;
                index += 1;
            }
            let probability = self.probabilities.get(index).copied().unwrap_or(0.0);
            (index, point.color.mul_add(probability, cumulative))
        } else {
            let count = self.transforms.len();
            let index = rng.random_range(0..count.max(1));
            (index, (index as f64 + point.color) / count as f64)
        };

        let Some(transform) = self.transforms.get(index) else {
            return point;
        };
        let (x, y) = transform.next_point(mode, point.x, point.y, rng);
        OrbitPoint { x, y, color }
    }

    /// Apply `iterations` chaos game steps
    pub fn settle<R: Rng + ?Sized>(
        &self,
        mode: &Mode,
        mut point: OrbitPoint,
        iterations: usize,
        rng: &mut R,
    ) -> OrbitPoint {
        for _ in 0..iterations {
            point = self.next_point(mode, point, rng);
        }
        point
    }

    /// Bounding box of the attractor estimated from `sample_count` orbit points
    ///
    /// The orbit starts at the origin and skips `sample_count / 25` points of
    /// burn-in. In unbounded modes the box is checked every 1000 samples; an
    /// infinite bound discards it and restarts the orbit from a random seed.
    pub fn find_frame<R: Rng + ?Sized>(
        &self,
        mode: &Mode,
        sample_count: usize,
        rng: &mut R,
    ) -> MinMax {
        let burn_in = sample_count / BURN_IN_DIVISOR;
        let mut point = self.settle(mode, OrbitPoint::default(), burn_in, rng);
        let mut bounds = MinMax::new();
        let mut reseeds = 0_usize;

        for i in 0..sample_count {
            point = self.next_point(mode, point, rng);
            bounds.include_point(point.x, point.y);
            if mode.is_unbounded() && i % REFRAME_CHECK_INTERVAL == 0 && bounds.has_infinity() {
                bounds = MinMax::new();
                point = self.settle(mode, point.reseeded(rng), SETTLE_ITERATIONS, rng);
                reseeds += 1;
            }
        }

        if reseeds > 0 {
            warn!(reseeds, "orbit escaped to infinity while framing");
        }
        bounds.build();
        debug!(sample_count, bounds = ?bounds.bounds(), "estimated frame");
        bounds
    }

    /// Similarity dimension: root `d` of `Σ r_i^d = 1` with `r_i = sqrt(area_i)`
    pub fn dimension(&self) -> f64 {
        let ratios: Vec<f64> = self.transforms.iter().map(|t| t.surface().sqrt()).collect();
        let (mut low, mut high) = (0.0, DIMENSION_SEARCH_MAX);
        let mut d = 1.5;
        while high - low > DIMENSION_TOLERANCE {
            let sum: f64 = ratios.iter().map(|r| r.powf(d)).sum();
            if sum < 1.0 {
                high = d;
                d = f64::midpoint(low, d);
            } else {
                low = d;
                d = f64::midpoint(d, high);
            }
        }
        d
    }

    /// Randomize every transform, keeping their count and the frame
    ///
    /// Configurations whose orbit diverges from the origin are retried.
    ///
    /// # Errors
    ///
    /// Returns `IfsError::Computation` if no bounded configuration is found
    /// within `MAX_RANDOM_ATTEMPTS`
    pub fn randomize<R: Rng + ?Sized>(&mut self, mode: &Mode, rng: &mut R) -> Result<()> {
        let (vectors_radius, center_radius) = mode.random_radii(self.len());
        for attempt in 0..MAX_RANDOM_ATTEMPTS {
            for transform in &mut self.transforms {
                *transform = Transform::random(mode, vectors_radius, center_radius, rng);
            }
            self.update_probabilities();
            if self.stays_bounded(mode, rng) {
                debug!(attempt, transforms = self.len(), "random skeleton accepted");
                return Ok(());
            }
            warn!(attempt, "random skeleton diverged, retrying");
        }
        Err(computation_error(
            "randomize",
            &format!("every orbit diverged after {MAX_RANDOM_ATTEMPTS} attempts"),
        ))
    }

    fn stays_bounded<R: Rng + ?Sized>(&self, mode: &Mode, rng: &mut R) -> bool {
        let mut point = OrbitPoint::default();
        for _ in 0..=DIVERGENCE_CHECK_STEPS {
            // NaN fails the comparison and counts as divergent
            if !(point.x.abs() + point.y.abs() < DIVERGENCE_BOUND) {
                return false;
            }
            point = self.next_point(mode, point, rng);
        }
        point.x.abs() + point.y.abs() < DIVERGENCE_BOUND
    }

    /// Randomize one randomly chosen transform
    pub fn modify_for_demo<R: Rng + ?Sized>(&mut self, mode: &Mode, rng: &mut R) {
        let (vectors_radius, center_radius) = mode.random_radii(self.len());
        let index = rng.random_range(0..self.len());
        if let Some(transform) = self.transforms.get_mut(index) {
            *transform = Transform::random(mode, vectors_radius, center_radius, rng);
        }
        self.update_probabilities();
    }

    /// Replace the transforms by a small random set suited to demos
    ///
    /// Linear mode draws two transforms (three with probability 1/4) and
    /// retries until the dimension lies in `DEMO_DIMENSION_RANGE`; other modes
    /// draw one or two (two with probability 2/3).
    ///
    /// # Errors
    ///
    /// Returns `IfsError::Computation` if no acceptable configuration is found
    pub fn random_for_demo<R: Rng + ?Sized>(&mut self, mode: &Mode, rng: &mut R) -> Result<()> {
        let count = if matches!(mode, Mode::Linear) {
            2 + usize::from(rng.random_range(0..100) < 25)
        } else {
            1 + usize::from(rng.random_range(0..100) < 67)
        };
        self.transforms = vec![Transform::IDENTITY; count];
        self.selected = self.selected.min(count);

        if !matches!(mode, Mode::Linear) {
            return self.randomize(mode, rng);
        }
        let (low, high) = DEMO_DIMENSION_RANGE;
        for _ in 0..MAX_RANDOM_ATTEMPTS {
            self.randomize(mode, rng)?;
            let dimension = self.dimension();
            if (low..=high).contains(&dimension) {
                return Ok(());
            }
            warn!(dimension, "demo skeleton outside dimension range, retrying");
        }
        Err(computation_error(
            "random_for_demo",
            &format!("no dimension within [{low}, {high}] after {MAX_RANDOM_ATTEMPTS} attempts"),
        ))
    }

    /// Append a transform and select it
    ///
    /// # Errors
    ///
    /// Returns an error if the skeleton already holds `MAX_TRANSFORMS`
    pub fn add(&mut self, transform: Transform) -> Result<()> {
        check_count(self.len() + 1)?;
        self.transforms.push(transform);
        self.selected = self.len();
        self.update_probabilities();
        Ok(())
    }

    /// Remove the selected transform
    ///
    /// The last transform takes the removed slot; removing the last slot
    /// selects the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if only one transform remains or the frame is selected
    pub fn remove_selected(&mut self) -> Result<()> {
        if self.len() < 2 {
            return Err(invalid_parameter(
                "transforms",
                &self.len(),
                &"at least one transform must remain",
            ));
        }
        if self.selected == 0 {
            return Err(invalid_parameter("selected", &0, &"the frame cannot be removed"));
        }
        if self.selected < self.len() {
            self.transforms.swap_remove(self.selected - 1);
        } else {
            self.transforms.pop();
            self.selected -= 1;
        }
        self.update_probabilities();
        Ok(())
    }

    /// Rotate the selected transform by `alpha` radians
    pub fn rotate_selected(&mut self, alpha: f64) {
        if let Some(transform) = self.get_mut(self.selected) {
            transform.rotate(alpha);
        }
    }

    /// Reset the selected transform to a square sized for `mode`
    ///
    /// The frame is reset to identity instead.
    pub fn reshape_selected(&mut self, mode: &Mode) {
        if self.selected == 0 {
            self.frame = Transform::IDENTITY;
            return;
        }
        let edge = mode.square_edge();
        if let Some(transform) = self.get_mut(self.selected) {
            transform.make_square(edge);
        }
        self.update_probabilities();
    }

    /// Apply an editing gesture to the selected transform
    ///
    /// Vectors of non-frame transforms stay inside the unit disk in linear mode.
    pub fn apply_gesture(&mut self, gesture: Gesture, mx: f64, my: f64, mode: &Mode) {
        let norm_limited = self.selected != 0 && matches!(mode, Mode::Linear);
        if let Some(transform) = self.get_mut(self.selected) {
            transform.apply_gesture(gesture, mx, my, norm_limited);
        }
        if gesture.changes_geometry() {
            self.update_probabilities();
        }
    }

    /// Express this skeleton in the local frame of `other`'s selected transform
    ///
    /// Takes over `other`'s selection; the selected slot becomes identity.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The skeletons have different sizes
    /// - `other` has its frame selected
    /// - The selected transform of `other` is singular
    pub fn subframe(&mut self, other: &Self) -> Result<()> {
        if self.len() != other.len() {
            return Err(invalid_parameter(
                "transforms",
                &other.len(),
                &format!("subframe needs {} transforms", self.len()),
            ));
        }
        if other.selected == 0 {
            return Err(invalid_parameter("selected", &0, &"the frame cannot be zoomed into"));
        }
        let pivot = *other.selected_transform();
        let selected = other.selected;
        // Nothing is replaced unless every transform maps through the pivot
        let transforms = self
            .transforms
            .iter()
            .enumerate()
            .map(|(index, transform)| {
                if index + 1 == selected {
                    Ok(Transform::IDENTITY)
                } else {
                    transform.subframe(&pivot)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        self.transforms = transforms;
        self.selected = selected;
        self.update_probabilities();
        Ok(())
    }

    /// Coefficient-wise blend of two skeletons of equal size, frames included
    ///
    /// # Errors
    ///
    /// Returns an error if the skeletons have different sizes
    pub fn weighted_mix(s1: &Self, s2: &Self, rate: f64) -> Result<Self> {
        if s1.len() != s2.len() {
            return Err(invalid_parameter(
                "transforms",
                &s2.len(),
                &format!("blending needs {} transforms", s1.len()),
            ));
        }
        let transforms = s1
            .transforms
            .iter()
            .zip(&s2.transforms)
            .map(|(t1, t2)| Transform::weighted_mix(t1, t2, rate))
            .collect();
        Ok(Self::with_transforms(
            Transform::weighted_mix(&s1.frame, &s2.frame, rate),
            transforms,
            s1.selected,
        ))
    }
}

fn check_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_TRANSFORMS {
        return Err(IfsError::InvalidParameter {
            parameter: "transforms",
            value: count.to_string(),
            reason: format!("must be between 1 and {MAX_TRANSFORMS}"),
        });
    }
    Ok(())
}
