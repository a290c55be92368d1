//! Raster owning a density buffer and an optional colour layer
//!
//! Screen coordinates arrive as signed integers straight from the projector;
//! anything outside the raster is silently dropped.

use crate::io::configuration::MAX_IMAGE_DIMENSION;
use crate::io::error::{Result, invalid_parameter};
use crate::render::density::{Density, DensityKind};
use crate::render::palette::ColorRamp;
use image::{Rgb, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Destination of projected orbit points
pub trait RasterSink {
    /// Raster width in pixels
    fn width(&self) -> usize;

    /// Raster height in pixels
    fn height(&self) -> usize;

    /// Record a visit of pixel `(i, j)`
    fn plot(&mut self, i: i64, j: i64);

    /// Fold colour label `color` into pixel `(i, j)`; called after `plot`
    fn set_color(&mut self, i: i64, j: i64, color: f64);

    /// Hits recorded at `(i, j)`, 0 outside the raster
    fn hit_count(&self, i: i64, j: i64) -> u32;

    /// Forget everything drawn so far
    fn clear(&mut self);
}

/// Background the attractor is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Dense pixels are bright
    #[default]
    Black,
    /// Dense pixels are dark
    White,
}

/// Raster size and rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Density strategy
    pub density: DensityKind,
    /// Background colour
    pub background: Background,
    /// Colour ramp; grayscale when absent
    pub ramp: Option<ColorRamp>,
    /// Seed of the approximate density promotion draws
    pub seed: u64,
}

impl ImageSettings {
    /// Check the raster size
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is 0 or above `MAX_IMAGE_DIMENSION`
    pub fn validate(&self) -> Result<()> {
        for (parameter, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > MAX_IMAGE_DIMENSION {
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &format!("must be between 1 and {MAX_IMAGE_DIMENSION}"),
                ));
            }
        }
        Ok(())
    }
}

/// Colour layer: running average RGB per pixel
#[derive(Debug, Clone)]
struct ColorLayer {
    ramp: ColorRamp,
    averages: Array2<[f64; 3]>,
}

/// Density raster with optional colouring
#[derive(Debug, Clone)]
pub struct DensityImage {
    density: Density,
    colors: Option<ColorLayer>,
    background: Background,
    width: usize,
    height: usize,
}

impl DensityImage {
    /// Empty raster built from `settings`
    ///
    /// # Errors
    ///
    /// Returns an error if the raster size is invalid
    pub fn new(settings: &ImageSettings) -> Result<Self> {
        settings.validate()?;
        let (width, height) = (settings.width, settings.height);
        Ok(Self {
            density: Density::new(settings.density, width, height, settings.seed),
            colors: settings.ramp.clone().map(|ramp| ColorLayer {
                ramp,
                averages: Array2::from_elem((height, width), [0.0; 3]),
            }),
            background: settings.background,
            width,
            height,
        })
    }

    /// The density buffer
    pub const fn density(&self) -> &Density {
        &self.density
    }

    /// Mutable access to the density buffer, for strategy tuning
    pub const fn density_mut(&mut self) -> &mut Density {
        &mut self.density
    }

    /// Background used at finalisation
    pub const fn background(&self) -> Background {
        self.background
    }

    /// Whether a colour ramp is applied
    pub const fn is_colored(&self) -> bool {
        self.colors.is_some()
    }

    fn pixel(&self, i: i64, j: i64) -> Option<(usize, usize)> {
        let i = usize::try_from(i).ok()?;
        let j = usize::try_from(j).ok()?;
        (i < self.width && j < self.height).then_some((i, j))
    }

    /// Final RGB raster
    ///
    /// A white background inverts intensities: gray becomes `255 − level` and
    /// colour `255 − (1 − rgb)·level`.
    pub fn render(&self) -> RgbImage {
        let levels = self.density.levels();
        let mut output = RgbImage::new(self.width as u32, self.height as u32);
        for ((j, i), &level) in levels.indexed_iter() {
            let level = f64::from(level);
            let rgb = match &self.colors {
                Some(layer) => layer.averages.get((j, i)).copied().unwrap_or([0.0; 3]),
                None => [1.0; 3],
            };
            let channel = |c: f64| match (self.background, self.colors.is_some()) {
                (Background::Black, _) => (c * level) as u8,
                (Background::White, true) => (255.0 - (1.0 - c) * level) as u8,
                (Background::White, false) => (255.0 - c * level) as u8,
            };
            output.put_pixel(
                i as u32,
                j as u32,
                Rgb([channel(rgb[0]), channel(rgb[1]), channel(rgb[2])]),
            );
        }
        output
    }
}

impl RasterSink for DensityImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn plot(&mut self, i: i64, j: i64) {
        if let Some((i, j)) = self.pixel(i, j) {
            self.density.plot(i, j);
        }
    }

    fn set_color(&mut self, i: i64, j: i64, color: f64) {
        let Some((i, j)) = self.pixel(i, j) else {
            return;
        };
        let weight = self.density.color_weight(i, j);
        let Some(layer) = self.colors.as_mut() else {
            return;
        };
        if weight <= 0.0 {
            return;
        }
        let sample = layer.ramp.sample(color);
        if let Some(average) = layer.averages.get_mut((j, i)) {
            for (channel, value) in average.iter_mut().zip(sample) {
                *channel = (weight - 1.0).mul_add(*channel, value) / weight;
            }
        }
    }

    fn hit_count(&self, i: i64, j: i64) -> u32 {
        self.pixel(i, j)
            .map_or(0, |(i, j)| self.density.hit_count(i, j))
    }

    fn clear(&mut self) {
        self.density.clear();
        if let Some(layer) = self.colors.as_mut() {
            layer.averages.fill([0.0; 3]);
        }
    }
}
