//! Model-to-raster projection and the Julia-mode deferral stack

use crate::io::configuration::{
    FRAMING_CORRECTION, FRAMING_EPSILON, JULIA_HIT_THRESHOLD_MAX, JULIA_MEMO_SHARED_CAPACITY,
    JULIA_MEMO_SINGLE_CAPACITY,
};
use crate::io::error::{IfsError, Result, computation_error};
use crate::system::bounds::MinMax;
use crate::system::transform::{InverseTransform, Transform};
use tracing::debug;

/// Maps model coordinates to raster pixels
///
/// The built bounding box is scaled uniformly to fill 96% of the raster along
/// its limiting axis and centred. A non-identity frame transform is undone
/// before scaling, which is how a frame edit pans and zooms the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    scale: f64,
    center_x: i64,
    center_y: i64,
    view: Option<InverseTransform>,
}

impl Projector {
    /// Fit `bounds` into a `width × height` raster, viewed through `frame`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `bounds` is not built
    /// - `bounds` is empty or has an infinite side
    /// - `frame` differs from identity and is singular
    pub fn new(bounds: &MinMax, width: usize, height: usize, frame: &Transform) -> Result<Self> {
        let box_width = bounds.width()?;
        let box_height = bounds.height()?;
        let (center_x, center_y) = bounds.center()?;
        if !(box_width >= 0.0
            && box_height >= 0.0
            && box_width.is_finite()
            && box_height.is_finite())
        {
            return Err(computation_error(
                "projector",
                &format!("cannot frame a {box_width} × {box_height} box"),
            ));
        }

        let view = if frame.is_modified() {
            Some(frame.inverse().ok_or(IfsError::SingularTransform {
                operation: "projector",
            })?)
        } else {
            None
        };

        let (w, h) = (width as f64, height as f64);
        let scale = if box_width * h > box_height * w {
            FRAMING_CORRECTION * w / (box_width + FRAMING_EPSILON)
        } else {
            FRAMING_CORRECTION * h / (box_height + FRAMING_EPSILON)
        };
        // Half sizes use integer division, as pixel centres do
        let projector = Self {
            scale,
            center_x: center_x.mul_add(-scale, (width / 2) as f64) as i64,
            center_y: center_y.mul_add(scale, (height / 2) as f64) as i64,
            view,
        };
        debug!(
            scale,
            center_x = projector.center_x,
            center_y = projector.center_y,
            "built projector"
        );
        Ok(projector)
    }

    /// Pixels per model unit
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether points are mapped through an inverse frame transform first
    pub const fn has_view(&self) -> bool {
        self.view.is_some()
    }

    /// Pixel of model point `(x, y)`; `None` for non-finite points
    pub fn project(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let (x, y) = match &self.view {
            Some(inverse) => inverse.apply(x, y),
            None => (x, y),
        };
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        Some((
            x.mul_add(self.scale, self.center_x as f64) as i64,
            y.mul_add(-self.scale, self.center_y as f64) as i64,
        ))
    }
}

/// Bounded stack of deferred points for Julia-mode drawing
///
/// Inverse iteration revisits dense regions far more than sparse ones. When
/// the orbit lands on a pixel that already has enough hits, it jumps to the
/// most recently deferred point instead; otherwise the opposite root is
/// deferred for later exploration.
#[derive(Debug, Clone, PartialEq)]
pub struct JuliaMemo {
    deferred: Vec<(f64, f64)>,
    capacity: usize,
    threshold: u32,
}

impl JuliaMemo {
    /// Memo sized for `frames` rasters sharing one memory budget
    pub fn new(frames: usize) -> Self {
        let capacity = if frames <= 1 {
            JULIA_MEMO_SINGLE_CAPACITY
        } else {
            JULIA_MEMO_SHARED_CAPACITY / frames
        };
        Self {
            deferred: Vec::new(),
            capacity,
            threshold: 1,
        }
    }

    /// Maximum number of deferred points
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hits above which a pixel counts as explored
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Number of points currently deferred
    pub fn len(&self) -> usize {
        self.deferred.len()
    }

    /// Whether no point is deferred
    pub fn is_empty(&self) -> bool {
        self.deferred.is_empty()
    }

    /// Point the orbit continues from after landing on `(x, y)` with `hits` hits
    ///
    /// An explored pixel resumes from the newest deferred point, or raises the
    /// threshold when none is left. An unexplored one defers `(−x, −y)` while
    /// capacity allows.
    pub fn handle(&mut self, x: f64, y: f64, hits: u32) -> (f64, f64) {
        if hits >= self.threshold {
            if let Some(point) = self.deferred.pop() {
                return point;
            }
            if self.threshold < JULIA_HIT_THRESHOLD_MAX {
                self.threshold += 1;
            }
        } else if self.deferred.len() < self.capacity {
            self.deferred.push((-x, -y));
        }
        (x, y)
    }

    /// Drop deferred points and reset the threshold
    pub fn reset(&mut self) {
        self.deferred.clear();
        self.threshold = 1;
    }
}
