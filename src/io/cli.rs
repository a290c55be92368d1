//! Command-line interface for rendering, animating and inspecting fractals

use crate::engine::animation::{
    AnimationKind, AnimationSettings, render_rotation, render_transition, render_zoom,
};
use crate::engine::generator::{GenerationSettings, Generator};
use crate::io::configuration::{
    DEFAULT_ANIMATION_HEIGHT, DEFAULT_ANIMATION_WIDTH, DEFAULT_FRAMING_POINTS,
    DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, DEFAULT_POINTS, DEFAULT_POINTS_PER_FRAME,
    DEFAULT_SEED, FRAMES_PER_CYCLE, GIF_FRAME_DELAY_MS, MINIMAL_BUILT_POINTS, OUTPUT_SUFFIX,
};
use crate::io::error::{IfsError, Result, invalid_parameter};
use crate::io::image::export_png;
use crate::io::persistence::{IfsDocument, create_parent, to_fractint};
use crate::io::progress::{ProgressManager, ProgressUnit};
use crate::io::visualization::export_gif;
use crate::math::formula::FormulaPoint;
use crate::render::density::{Density, DensityKind};
use crate::render::image::{Background, DensityImage, ImageSettings};
use crate::render::palette::{BuiltinRamp, ColorRamp};
use crate::system::interpolation::Blend;
use crate::system::mode::{Mode, ModeKind};
use crate::system::skeleton::{Preset, Skeleton};
use clap::{ArgAction, Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "ifsforge")]
#[command(
    version,
    about = "Draw iterated function system fractals with the chaos game"
)]
/// Command-line arguments of the fractal generator
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Random seed for reproducible generation
    #[arg(short, long, global = true, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a still image to PNG
    Render(RenderArgs),
    /// Render a transition, rotation or zoom animation to GIF
    Animate(AnimateArgs),
    /// Generate a random skeleton and save it as JSON
    Random(RandomArgs),
    /// Report dimension, probabilities and bounds of a skeleton
    Inspect(InspectArgs),
}

/// Where the skeleton and mode come from
#[derive(Args, Debug, Clone)]
pub struct SkeletonArgs {
    /// Skeleton document (JSON) to load
    #[arg(short, long, conflicts_with_all = ["preset", "regular"])]
    pub input: Option<PathBuf>,

    /// Built-in skeleton
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Regular skeleton of N equal squares
    #[arg(long, value_name = "N", conflicts_with = "preset")]
    pub regular: Option<usize>,

    /// Generation mode; overrides the document's mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeKind>,

    /// Prefix formula for the next x, formula mode
    #[arg(long, requires = "formula_y")]
    pub formula_x: Option<String>,

    /// Prefix formula for the next y, formula mode
    #[arg(long, requires = "formula_x")]
    pub formula_y: Option<String>,
}

impl SkeletonArgs {
    /// Load or build the skeleton and resolve its mode
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded, a formula does not
    /// parse or the regular transform count is out of range
    pub fn resolve(&self) -> Result<(Mode, Skeleton)> {
        let (document_mode, skeleton) = match (&self.input, self.regular) {
            (Some(path), _) => IfsDocument::load(path)?.into_parts()?,
            (None, Some(count)) => (Mode::Linear, Skeleton::regular(count)?),
            (None, None) => (Mode::Linear, Skeleton::preset(self.preset.unwrap_or_default())),
        };
        let mode = match (self.mode, &self.formula_x, &self.formula_y) {
            (Some(ModeKind::Formula) | None, Some(next_x), Some(next_y)) => {
                Mode::Formula(FormulaPoint::new(next_x, next_y)?)
            }
            (Some(kind), _, _) if kind == document_mode.kind() => document_mode,
            (Some(kind), _, _) => mode_of_kind(kind)?,
            (None, _, _) => document_mode,
        };
        Ok((mode, skeleton))
    }

    fn stem(&self) -> String {
        match (&self.input, self.regular) {
            (Some(path), _) => path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            (None, Some(count)) => format!("regular{count}"),
            (None, None) => format!("{:?}", self.preset.unwrap_or_default()).to_lowercase(),
        }
    }
}

/// Mode of `kind`, with the standard formulas in formula mode
///
/// # Errors
///
/// Returns an error if the standard formulas fail to parse
pub fn mode_of_kind(kind: ModeKind) -> Result<Mode> {
    Ok(match kind {
        ModeKind::Linear => Mode::Linear,
        ModeKind::Sinusoidal => Mode::Sinusoidal,
        ModeKind::Julia => Mode::Julia,
        ModeKind::Formula => Mode::Formula(FormulaPoint::standard()?),
    })
}

/// Raster options shared by still images and animations
#[derive(Args, Debug, Clone)]
pub struct RasterArgs {
    /// Raster width in pixels
    #[arg(short = 'W', long)]
    pub width: Option<usize>,

    /// Raster height in pixels
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Hit counting strategy
    #[arg(long, value_enum, default_value_t)]
    pub density: DensityKind,

    /// Repeat hits a saturated pixel stands for, approximate density
    #[arg(long, value_name = "HITS")]
    pub hit_max: Option<f64>,

    /// Background colour
    #[arg(long, value_enum, default_value_t)]
    pub background: Background,

    /// Built-in colour ramp; grayscale when neither ramp option is given
    #[arg(long, value_enum, conflicts_with = "ramp_file")]
    pub ramp: Option<BuiltinRamp>,

    /// Colour map file with `[position color rgbt <r, g, b, t>]` entries
    #[arg(long)]
    pub ramp_file: Option<PathBuf>,
}

impl RasterArgs {
    /// Image settings, falling back to `default_size` for missing dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if the size is invalid or the ramp file cannot be read
    pub fn image_settings(&self, default_size: (usize, usize), seed: u64) -> Result<ImageSettings> {
        let ramp = match (&self.ramp_file, self.ramp) {
            (Some(path), _) => {
                let text = std::fs::read_to_string(path).map_err(|source| IfsError::FileSystem {
                    path: path.clone(),
                    operation: "read colour map",
                    source,
                })?;
                Some(ColorRamp::parse(&text)?)
            }
            (None, Some(builtin)) => Some(ColorRamp::builtin(builtin)),
            (None, None) => None,
        };
        let settings = ImageSettings {
            width: self.width.unwrap_or(default_size.0),
            height: self.height.unwrap_or(default_size.1),
            density: self.density,
            background: self.background,
            ramp,
            seed,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Apply density tuning options to a fresh raster
    ///
    /// # Errors
    ///
    /// Returns an error if the hit maximum is not above 1
    pub fn tune(&self, image: &mut DensityImage) -> Result<()> {
        let Some(hit_max) = self.hit_max else {
            return Ok(());
        };
        if !(hit_max > 1.0 && hit_max.is_finite()) {
            return Err(invalid_parameter("hit_max", &hit_max, &"must be a finite number above 1"));
        }
        if let Density::Approximate(density) = image.density_mut() {
            density.set_log_proba_hit_max(hit_max.ln());
        }
        Ok(())
    }
}

/// Options of the `render` subcommand
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub skeleton: SkeletonArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub raster: RasterArgs,

    /// Orbit points to plot
    #[arg(short, long, default_value_t = DEFAULT_POINTS)]
    pub points: u64,

    /// Orbit points sampled to frame the attractor
    #[arg(long, default_value_t = DEFAULT_FRAMING_POINTS)]
    pub framing_points: usize,

    /// Output PNG path; derived from the skeleton name when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options of the `animate` subcommand
#[derive(Args, Debug, Clone)]
pub struct AnimateArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub skeleton: SkeletonArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub raster: RasterArgs,

    /// Kind of animation
    #[arg(short, long, value_enum, default_value_t)]
    pub kind: AnimationKind,

    /// Renders per cycle
    #[arg(short, long, default_value_t = FRAMES_PER_CYCLE)]
    pub frames: usize,

    /// Orbit points per render
    #[arg(short, long, default_value_t = DEFAULT_POINTS_PER_FRAME)]
    pub points: u64,

    /// Transform blending of transitions
    #[arg(long, value_enum, default_value_t)]
    pub blend: Blend,

    /// End skeleton document of a transition
    #[arg(long, conflicts_with = "end_preset")]
    pub end: Option<PathBuf>,

    /// End preset of a transition; a random skeleton when neither end option is given
    #[arg(long, value_enum)]
    pub end_preset: Option<Preset>,

    /// Delay between GIF frames in milliseconds
    #[arg(long, default_value_t = GIF_FRAME_DELAY_MS)]
    pub delay: u32,

    /// Output GIF path; derived from the skeleton name when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options of the `random` subcommand
#[derive(Args, Debug, Clone)]
pub struct RandomArgs {
    /// Generation mode
    #[arg(short, long, value_enum, default_value_t)]
    pub mode: ModeKind,

    /// Number of transforms; ignored with --demo
    #[arg(short, long, default_value_t = 2)]
    pub transforms: usize,

    /// Pick a small demo skeleton of plausible dimension
    #[arg(long)]
    pub demo: bool,

    /// Output JSON path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also render the skeleton to this PNG
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

/// Options of the `inspect` subcommand
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub skeleton: SkeletonArgs,

    /// Orbit points sampled to estimate the bounds
    #[arg(long, default_value_t = DEFAULT_FRAMING_POINTS)]
    pub framing_points: usize,

    /// Write a Fractint `.ifs` entry to this path
    #[arg(long)]
    pub fractint: Option<PathBuf>,

    /// Entry name in the Fractint export
    #[arg(long)]
    pub name: Option<String>,
}

/// Runs one parsed command line with progress tracking
pub struct Runner {
    cli: Cli,
    progress: ProgressManager,
}

impl Runner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = if cli.should_show_progress() {
            ProgressManager::new()
        } else {
            ProgressManager::hidden()
        };
        Self { cli, progress }
    }

    /// Execute the subcommand
    ///
    /// # Errors
    ///
    /// Returns an error if argument validation, generation or export fails
    pub fn run(&mut self) -> Result<()> {
        let command = self.cli.command.clone();
        let result = match &command {
            Command::Render(args) => self.render(args).map(drop),
            Command::Animate(args) => self.animate(args).map(drop),
            Command::Random(args) => self.random(args).map(drop),
            Command::Inspect(args) => self.inspect(args),
        };
        self.progress.finish();
        result
    }

    /// Render a still image, returning the written path
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or export fails
    pub fn render(&mut self, args: &RenderArgs) -> Result<PathBuf> {
        let (mode, skeleton) = args.skeleton.resolve()?;
        let output = args.output.clone().unwrap_or_else(|| {
            output_path(args.skeleton.input.as_deref(), &args.skeleton.stem(), "png")
        });
        let image_settings = args
            .raster
            .image_settings((DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT), self.cli.seed)?;
        let settings = GenerationSettings {
            points: args.points,
            framing_points: args.framing_points,
            seed: self.cli.seed,
        };
        self.draw(mode, skeleton, &image_settings, &args.raster, &settings, &output)?;
        Ok(output)
    }

    fn draw(
        &mut self,
        mode: Mode,
        skeleton: Skeleton,
        image_settings: &ImageSettings,
        raster: &RasterArgs,
        settings: &GenerationSettings,
        output: &Path,
    ) -> Result<()> {
        if settings.points == 0 {
            return Err(invalid_parameter("points", &0, &"must be at least 1"));
        }
        if settings.framing_points == 0 {
            return Err(invalid_parameter("framing_points", &0, &"must be at least 1"));
        }
        let start_time = Instant::now();
        info!(
            mode = ?mode.kind(),
            transforms = skeleton.len(),
            points = settings.points,
            "rendering"
        );

        let mut generator = Generator::framed(
            mode,
            skeleton,
            image_settings.width,
            image_settings.height,
            settings,
        )?;
        let mut image = DensityImage::new(image_settings)?;
        raster.tune(&mut image)?;

        self.progress.start("render", settings.points, ProgressUnit::Points);
        let chunk = (settings.points / 100).max(MINIMAL_BUILT_POINTS as u64);
        let mut remaining = settings.points;
        while remaining > 0 {
            let batch = remaining.min(chunk);
            generator.generate_points(&mut image, batch);
            self.progress.advance(batch);
            remaining -= batch;
        }
        self.progress.complete(start_time.elapsed());

        export_png(&image.render(), output)?;
        info!(
            points = generator.generated(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "render finished"
        );
        Ok(())
    }

    /// Render an animation, returning the written path
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, transition skeletons
    /// differ in size, or export fails
    pub fn animate(&mut self, args: &AnimateArgs) -> Result<PathBuf> {
        let (mode, skeleton) = args.skeleton.resolve()?;
        let output = args.output.clone().unwrap_or_else(|| {
            output_path(args.skeleton.input.as_deref(), &args.skeleton.stem(), "gif")
        });
        let settings = AnimationSettings {
            frames: args.frames,
            points_per_frame: args.points,
            image: args.raster.image_settings(
                (DEFAULT_ANIMATION_WIDTH, DEFAULT_ANIMATION_HEIGHT),
                self.cli.seed,
            )?,
            blend: args.blend,
            seed: self.cli.seed,
        };
        settings.validate()?;

        let renders = match args.kind {
            AnimationKind::Transition => settings.frames + 1,
            AnimationKind::Rotation => 2 * settings.frames,
            AnimationKind::Zoom => settings.frames,
        };
        let start_time = Instant::now();
        self.progress.start("animate", renders as u64, ProgressUnit::Frames);
        let progress = &self.progress;
        let mut on_frame = |index: usize, _total: usize| progress.set_position(index as u64 + 1);

        let animation = match args.kind {
            AnimationKind::Transition => {
                let end = self.transition_end(args, &mode, &skeleton)?;
                render_transition(&mode, &skeleton, &end, &settings, &mut on_frame)?
            }
            AnimationKind::Rotation => render_rotation(&mode, &skeleton, &settings, &mut on_frame)?,
            AnimationKind::Zoom => render_zoom(&mode, &skeleton, &settings, &mut on_frame)?,
        };
        self.progress.complete(start_time.elapsed());

        export_gif(&animation, &output, args.delay)?;
        Ok(output)
    }

    fn transition_end(
        &self,
        args: &AnimateArgs,
        mode: &Mode,
        start: &Skeleton,
    ) -> Result<Skeleton> {
        match (&args.end, args.end_preset) {
            (Some(path), _) => Ok(IfsDocument::load(path)?.into_parts()?.1),
            (None, Some(preset)) => Ok(Skeleton::preset(preset)),
            (None, None) => {
                let mut rng = StdRng::seed_from_u64(self.cli.seed);
                let mut end = start.clone();
                end.randomize(mode, &mut rng)?;
                Ok(end)
            }
        }
    }

    /// Generate and save a random skeleton, returning it with its mode
    ///
    /// # Errors
    ///
    /// Returns an error if the transform count is out of range, no valid
    /// random configuration is found, or saving fails
    pub fn random(&mut self, args: &RandomArgs) -> Result<(Mode, Skeleton)> {
        let mode = mode_of_kind(args.mode)?;
        let mut rng = StdRng::seed_from_u64(self.cli.seed);
        // Demo skeletons pick their own transform count
        let skeleton = if args.demo {
            let mut skeleton = Skeleton::default();
            skeleton.random_for_demo(&mode, &mut rng)?;
            skeleton
        } else {
            let mut skeleton = Skeleton::regular(args.transforms)?;
            skeleton.randomize(&mode, &mut rng)?;
            skeleton
        };
        info!(
            transforms = skeleton.len(),
            dimension = skeleton.dimension(),
            "generated random skeleton"
        );
        IfsDocument::capture(&mode, &skeleton).save(&args.output)?;

        if let Some(preview) = &args.preview {
            let raster = RasterArgs {
                width: None,
                height: None,
                density: DensityKind::default(),
                hit_max: None,
                background: Background::default(),
                ramp: None,
                ramp_file: None,
            };
            let image_settings =
                raster.image_settings((DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT), self.cli.seed)?;
            let settings = GenerationSettings {
                seed: self.cli.seed,
                ..GenerationSettings::default()
            };
            self.draw(
                mode.clone(),
                skeleton.clone(),
                &image_settings,
                &raster,
                &settings,
                preview,
            )?;
        }
        Ok((mode, skeleton))
    }

    fn inspect(&self, args: &InspectArgs) -> Result<()> {
        let (mode, skeleton) = args.skeleton.resolve()?;
        let mut rng = StdRng::seed_from_u64(self.cli.seed);
        let bounds = skeleton.find_frame(&mode, args.framing_points, &mut rng);
        let (x_min, x_max, y_min, y_max) = bounds.bounds();

        info!(
            mode = ?mode.kind(),
            transforms = skeleton.len(),
            selected = skeleton.selected(),
            dimension = skeleton.dimension(),
            surface = skeleton.sum_surfaces(),
            "skeleton"
        );
        info!(probabilities = ?skeleton.probabilities(), "selection weights");
        info!(x_min, x_max, y_min, y_max, "attractor bounds");

        if let Some(path) = &args.fractint {
            let name = args.name.clone().unwrap_or_else(|| args.skeleton.stem());
            create_parent(path)?;
            std::fs::write(path, to_fractint(&skeleton, &name)).map_err(|source| {
                IfsError::FileSystem {
                    path: path.clone(),
                    operation: "write fractint export",
                    source,
                }
            })?;
            info!(path = %path.display(), "exported fractint entry");
        }
        Ok(())
    }
}

/// `<stem><OUTPUT_SUFFIX>.<extension>`, next to `input` when there is one
pub fn output_path(input: Option<&Path>, stem: &str, extension: &str) -> PathBuf {
    let output_name = format!("{stem}{OUTPUT_SUFFIX}.{extension}");
    match input.and_then(Path::parent) {
        Some(parent) => parent.join(output_name),
        None => PathBuf::from(output_name),
    }
}
