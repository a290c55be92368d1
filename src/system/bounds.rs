//! Axis-aligned bounding box of an orbit sample

use crate::io::error::{IfsError, Result};

/// Extents derived when a box is built
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extents {
    width: f64,
    height: f64,
    center_x: f64,
    center_y: f64,
}

/// Bounding box accumulated over orbit points
///
/// Points are added while the box is open; `build` freezes it and derives
/// width, height and center. Derived quantities fail before `build`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    extents: Option<Extents>,
}

impl Default for MinMax {
    fn default() -> Self {
        Self::new()
    }
}

impl MinMax {
    /// Empty open box
    pub const fn new() -> Self {
        Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
            extents: None,
        }
    }

    /// Grow the box to contain `(x, y)`; ignored once built
    pub fn include_point(&mut self, x: f64, y: f64) {
        if self.is_built() {
            return;
        }
        // NaN compares false and leaves the box unchanged
        if x > self.x_max {
            self.x_max = x;
        }
        if x < self.x_min {
            self.x_min = x;
        }
        if y > self.y_max {
            self.y_max = y;
        }
        if y < self.y_min {
            self.y_min = y;
        }
    }

    /// Grow the box to contain another box's corners
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.include_point(other.x_min, other.y_min);
        self.include_point(other.x_max, other.y_max);
    }

    /// Freeze the box and derive its extents
    pub fn build(&mut self) {
        self.extents = Some(Extents {
            width: self.x_max - self.x_min,
            height: self.y_max - self.y_min,
            center_x: f64::midpoint(self.x_min, self.x_max),
            center_y: f64::midpoint(self.y_min, self.y_max),
        });
    }

    /// Whether `build` has been called
    pub const fn is_built(&self) -> bool {
        self.extents.is_some()
    }

    /// Whether no point has been included yet
    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    /// Whether a bound is infinite because an orbit escaped
    pub fn has_infinity(&self) -> bool {
        !self.is_empty()
            && (self.x_min.is_infinite()
                || self.x_max.is_infinite()
                || self.y_min.is_infinite()
                || self.y_max.is_infinite())
    }

    /// `(x_min, x_max, y_min, y_max)` as accumulated so far
    pub const fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x_min, self.x_max, self.y_min, self.y_max)
    }

    fn extents(&self, quantity: &'static str) -> Result<Extents> {
        self.extents.ok_or(IfsError::FrameNotBuilt { quantity })
    }

    /// Width of the built box
    ///
    /// # Errors
    ///
    /// Returns `IfsError::FrameNotBuilt` before `build`
    pub fn width(&self) -> Result<f64> {
        Ok(self.extents("width")?.width)
    }

    /// Height of the built box
    ///
    /// # Errors
    ///
    /// Returns `IfsError::FrameNotBuilt` before `build`
    pub fn height(&self) -> Result<f64> {
        Ok(self.extents("height")?.height)
    }

    /// Center of the built box
    ///
    /// # Errors
    ///
    /// Returns `IfsError::FrameNotBuilt` before `build`
    pub fn center(&self) -> Result<(f64, f64)> {
        let extents = self.extents("center")?;
        Ok((extents.center_x, extents.center_y))
    }
}
