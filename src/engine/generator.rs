//! Resumable chaos game feeding a raster
//!
//! A generator owns the orbit state between calls: callers ask for "N more
//! points" or "points until a deadline" and may stop at any batch boundary,
//! leaving the raster valid and displayable.

use crate::io::configuration::{
    DEFAULT_FRAMING_POINTS, DEFAULT_POINTS, DEFAULT_SEED, MINIMAL_BUILT_POINTS,
    REFRAME_CHECK_INTERVAL, SETTLE_ITERATIONS,
};
use crate::io::error::{IfsError, Result};
use crate::render::image::RasterSink;
use crate::render::projector::{JuliaMemo, Projector};
use crate::system::mode::Mode;
use crate::system::skeleton::{OrbitPoint, Skeleton};
use crate::system::transform::{InverseTransform, Transform};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;
use tracing::debug;

/// Point budget and reproducibility settings of a still image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Orbit points plotted
    pub points: u64,
    /// Orbit points sampled to frame the attractor
    pub framing_points: usize,
    /// Seed of the orbit's random stream
    pub seed: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            framing_points: DEFAULT_FRAMING_POINTS,
            seed: DEFAULT_SEED,
        }
    }
}

/// One generation pass: a skeleton under a mode, drawn through a projector
#[derive(Debug, Clone)]
pub struct Generator {
    mode: Mode,
    skeleton: Skeleton,
    projector: Projector,
    view: Option<InverseTransform>,
    memo: Option<JuliaMemo>,
    orbit: OrbitPoint,
    rng: StdRng,
    generated: u64,
}

impl Generator {
    /// Generator starting from the origin
    ///
    /// In Julia mode a deferral memo is sized for `memo_frames` rasters
    /// sharing the memory budget.
    pub fn new(
        mode: Mode,
        skeleton: Skeleton,
        projector: Projector,
        memo_frames: usize,
        rng: StdRng,
    ) -> Self {
        let memo = matches!(mode, Mode::Julia).then(|| JuliaMemo::new(memo_frames));
        Self {
            mode,
            skeleton,
            projector,
            view: None,
            memo,
            orbit: OrbitPoint::default(),
            rng,
            generated: 0,
        }
    }

    /// Generator whose projector frames the attractor in a `width × height` raster
    ///
    /// # Errors
    ///
    /// Returns an error if the estimated frame cannot be projected
    pub fn framed(
        mode: Mode,
        skeleton: Skeleton,
        width: usize,
        height: usize,
        settings: &GenerationSettings,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let bounds = skeleton.find_frame(&mode, settings.framing_points, &mut rng);
        let projector = Projector::new(&bounds, width, height, skeleton.frame())?;
        Ok(Self::new(mode, skeleton, projector, 1, rng))
    }

    /// Generation mode
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Skeleton being iterated
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Current orbit state
    pub const fn orbit(&self) -> OrbitPoint {
        self.orbit
    }

    /// Points plotted since creation
    pub const fn generated(&self) -> u64 {
        self.generated
    }

    /// Deferral memo, in Julia mode
    pub const fn memo(&self) -> Option<&JuliaMemo> {
        self.memo.as_ref()
    }

    /// Swap the skeleton, keeping the orbit state
    pub fn set_skeleton(&mut self, skeleton: Skeleton) {
        self.skeleton = skeleton;
    }

    /// Swap the projector and restart the Julia memo for the new raster
    pub fn set_projector(&mut self, projector: Projector) {
        self.projector = projector;
        if let Some(memo) = self.memo.as_mut() {
            memo.reset();
        }
    }

    /// Map orbit points through the inverse of `view` before projecting
    ///
    /// The Julia memo is dropped: deferred points would be in the wrong frame.
    ///
    /// # Errors
    ///
    /// Returns `IfsError::SingularTransform` if `view` cannot be inverted
    pub fn set_view(&mut self, view: &Transform) -> Result<()> {
        self.view = Some(view.inverse().ok_or(IfsError::SingularTransform {
            operation: "set_view",
        })?);
        self.memo = None;
        Ok(())
    }

    /// Stop mapping orbit points through a view transform
    pub const fn clear_view(&mut self) {
        self.view = None;
    }

    /// Plot `count` more points into `sink`
    pub fn generate_points<S: RasterSink + ?Sized>(&mut self, sink: &mut S, count: u64) {
        self.settle();
        let plotted = self.run_batch(sink, count);
        debug!(count, plotted, total = self.generated, "generated points");
    }

    /// Plot batches of `MINIMAL_BUILT_POINTS` until `deadline` has passed
    ///
    /// At least one batch is drawn. Returns the number of points plotted.
    pub fn generate_until<S: RasterSink + ?Sized>(
        &mut self,
        sink: &mut S,
        deadline: Instant,
    ) -> u64 {
        self.settle();
        let batch = MINIMAL_BUILT_POINTS as u64;
        let mut plotted = 0;
        loop {
            plotted += self.run_batch(sink, batch);
            if Instant::now() >= deadline {
                break;
            }
        }
        debug!(plotted, total = self.generated, "generated points until deadline");
        plotted
    }

    fn settle(&mut self) {
        if !self.orbit.is_finite() {
            self.orbit = self.orbit.reseeded(&mut self.rng);
        }
        self.orbit = self
            .skeleton
            .settle(&self.mode, self.orbit, SETTLE_ITERATIONS, &mut self.rng);
    }

    fn reseed(&mut self) {
        let seed = self.orbit.reseeded(&mut self.rng);
        self.orbit = self
            .skeleton
            .settle(&self.mode, seed, SETTLE_ITERATIONS, &mut self.rng);
    }

    /// Advance the orbit `count` steps; returns how many points reached `sink`
    fn run_batch<S: RasterSink + ?Sized>(&mut self, sink: &mut S, count: u64) -> u64 {
        // Unbounded orbits depend on their seed, so they are restarted often
        let unbounded = self.mode.is_unbounded();
        if unbounded {
            self.reseed();
        }
        let mut plotted = 0;
        for k in 1..=count {
            self.orbit = self.skeleton.next_point(&self.mode, self.orbit, &mut self.rng);
            if !self.orbit.is_finite() {
                self.reseed();
                continue;
            }
            if self.plot(sink) {
                plotted += 1;
            }
            if unbounded && k % REFRAME_CHECK_INTERVAL as u64 == 0 {
                self.reseed();
            }
        }
        self.generated += plotted;
        plotted
    }

    fn plot<S: RasterSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let (x, y) = match &self.view {
            Some(view) => view.apply(self.orbit.x, self.orbit.y),
            None => (self.orbit.x, self.orbit.y),
        };
        let Some((i, j)) = self.projector.project(x, y) else {
            return false;
        };
        if let Some(memo) = self.memo.as_mut() {
            let (next_x, next_y) = memo.handle(self.orbit.x, self.orbit.y, sink.hit_count(i, j));
            self.orbit.x = next_x;
            self.orbit.y = next_y;
        }
        sink.plot(i, j);
        sink.set_color(i, j, self.orbit.color);
        true
    }
}
