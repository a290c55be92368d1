//! Frame sequences for transition, rotation and zoom animations
//!
//! Every frame of an animation is framed by one shared bounding box so the
//! attractor does not jump between frames. Renders are produced once and a
//! playback sequence says in which order to show them.

use crate::engine::generator::Generator;
use crate::io::configuration::{
    ANIMATION_FRAMING_RATE, DEFAULT_ANIMATION_HEIGHT, DEFAULT_ANIMATION_WIDTH,
    DEFAULT_FRAMING_POINTS, DEFAULT_POINTS_PER_FRAME, DEFAULT_SEED, FRAMES_PER_CYCLE,
};
use crate::io::error::{Result, invalid_parameter};
use crate::render::density::DensityKind;
use crate::render::image::{Background, DensityImage, ImageSettings};
use crate::render::projector::Projector;
use crate::system::bounds::MinMax;
use crate::system::interpolation::{
    Blend, ping_pong_sequence, rotation_skeletons, transition_skeletons, zoom_steps,
};
use crate::system::mode::Mode;
use crate::system::skeleton::Skeleton;
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Kind of animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    /// Ease from one skeleton to another and back
    #[default]
    Transition,
    /// Spin the selected transform half a turn
    Rotation,
    /// Dive into the selected transform
    Zoom,
}

/// Options shared by all animation kinds
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    /// Renders per cycle
    pub frames: usize,
    /// Orbit points plotted per render, before zoom growth
    pub points_per_frame: u64,
    /// Raster options of each render
    pub image: ImageSettings,
    /// Transform blending for transitions
    pub blend: Blend,
    /// Seed of the orbit's random stream
    pub seed: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            frames: FRAMES_PER_CYCLE,
            points_per_frame: DEFAULT_POINTS_PER_FRAME,
            image: ImageSettings {
                width: DEFAULT_ANIMATION_WIDTH,
                height: DEFAULT_ANIMATION_HEIGHT,
                density: DensityKind::Exact,
                background: Background::Black,
                ramp: None,
                seed: DEFAULT_SEED,
            },
            blend: Blend::Linear,
            seed: DEFAULT_SEED,
        }
    }
}

impl AnimationSettings {
    /// Check frame count and raster size
    ///
    /// # Errors
    ///
    /// Returns an error if `frames` is 0 or the raster size is invalid
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            return Err(invalid_parameter("frames", &self.frames, &"must be at least 1"));
        }
        self.image.validate()
    }
}

/// Rendered frames and the order to play them in
#[derive(Debug, Clone)]
pub struct Animation {
    renders: Vec<RgbImage>,
    sequence: Vec<usize>,
}

impl Animation {
    /// Distinct rendered frames
    pub fn renders(&self) -> &[RgbImage] {
        &self.renders
    }

    /// Playback order as indices into `renders`
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Frames in playback order
    pub fn playback(&self) -> impl Iterator<Item = &RgbImage> {
        self.sequence.iter().filter_map(|&index| self.renders.get(index))
    }

    /// Number of frames in playback order
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether nothing was rendered
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Union of the frames of every skeleton, each sampled with a tenth of the
/// still-image framing budget
pub fn shared_bounds(mode: &Mode, skeletons: &[Skeleton], rng: &mut StdRng) -> MinMax {
    let samples = (ANIMATION_FRAMING_RATE * DEFAULT_FRAMING_POINTS as f64) as usize;
    let mut bounds = MinMax::new();
    for skeleton in skeletons {
        bounds.merge(&skeleton.find_frame(mode, samples, rng));
    }
    bounds.build();
    bounds
}

/// Ease from `start` to `end`, then play back to `start`
///
/// Renders `frames + 1` skeletons and plays them ping-pong over `2·frames`
/// frames. `on_frame` receives the index and total of each finished render.
///
/// # Errors
///
/// Returns an error if the skeletons differ in size or a frame cannot be projected
pub fn render_transition(
    mode: &Mode,
    start: &Skeleton,
    end: &Skeleton,
    settings: &AnimationSettings,
    on_frame: &mut dyn FnMut(usize, usize),
) -> Result<Animation> {
    settings.validate()?;
    let skeletons = transition_skeletons(start, end, settings.frames, settings.blend)?;
    let renders = render_skeletons(mode, &skeletons, settings, on_frame)?;
    info!(renders = renders.len(), "rendered transition");
    Ok(Animation {
        renders,
        sequence: ping_pong_sequence(settings.frames),
    })
}

/// Spin the selected transform through half a turn over `2·frames` renders
///
/// # Errors
///
/// Returns an error if a frame cannot be projected
pub fn render_rotation(
    mode: &Mode,
    skeleton: &Skeleton,
    settings: &AnimationSettings,
    on_frame: &mut dyn FnMut(usize, usize),
) -> Result<Animation> {
    settings.validate()?;
    let skeletons = rotation_skeletons(skeleton, settings.frames);
    let renders = render_skeletons(mode, &skeletons, settings, on_frame)?;
    info!(renders = renders.len(), "rendered rotation");
    Ok(Animation {
        sequence: (0..renders.len()).collect(),
        renders,
    })
}

fn render_skeletons(
    mode: &Mode,
    skeletons: &[Skeleton],
    settings: &AnimationSettings,
    on_frame: &mut dyn FnMut(usize, usize),
) -> Result<Vec<RgbImage>> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let bounds = shared_bounds(mode, skeletons, &mut rng);
    let total = skeletons.len();

    skeletons
        .iter()
        .enumerate()
        .map(|(index, skeleton)| {
            let projector = Projector::new(
                &bounds,
                settings.image.width,
                settings.image.height,
                skeleton.frame(),
            )?;
            let frame_rng = StdRng::seed_from_u64(settings.seed.wrapping_add(index as u64));
            let mut generator =
                Generator::new(mode.clone(), skeleton.clone(), projector, total, frame_rng);
            let mut image = DensityImage::new(&settings.image)?;
            generator.generate_points(&mut image, settings.points_per_frame);
            on_frame(index, total);
            Ok(image.render())
        })
        .collect()
}

/// Dive into the selected transform over `frames` renders
///
/// The frame transform cannot be zoomed into; when it is selected, the
/// next transform is used. Deeper frames get more points, see `zoom_steps`.
///
/// # Errors
///
/// Returns an error if the attractor cannot be projected or an intermediate
/// view is singular
pub fn render_zoom(
    mode: &Mode,
    skeleton: &Skeleton,
    settings: &AnimationSettings,
    on_frame: &mut dyn FnMut(usize, usize),
) -> Result<Animation> {
    settings.validate()?;
    let mut skeleton = skeleton.clone();
    if skeleton.selected() == 0 {
        skeleton.shift_selected(1);
    }
    let steps = zoom_steps(&skeleton, settings.frames, settings.points_per_frame)?;

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let bounds = skeleton.find_frame(mode, DEFAULT_FRAMING_POINTS, &mut rng);
    let projector = Projector::new(
        &bounds,
        settings.image.width,
        settings.image.height,
        skeleton.frame(),
    )?;
    let mut generator = Generator::new(mode.clone(), skeleton, projector, steps.len(), rng);

    let mut renders = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        generator.set_view(&step.view)?;
        let mut image = DensityImage::new(&settings.image)?;
        generator.generate_points(&mut image, step.points);
        renders.push(image.render());
        on_frame(index, steps.len());
    }
    info!(renders = renders.len(), points = generator.generated(), "rendered zoom");
    Ok(Animation {
        sequence: (0..renders.len()).collect(),
        renders,
    })
}
