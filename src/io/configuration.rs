//! Generation constants and runtime configuration defaults

// Skeleton limits
/// Maximum number of transforms in a skeleton, the frame transform excluded
pub const MAX_TRANSFORMS: usize = 64;

/// Transforms whose coefficients differ from identity by less than this are treated as identity
pub const IDENTITY_TOLERANCE: f64 = 1e-4;

// Parsing recurses once per operator, so nesting is bounded
/// Deepest operator nesting accepted in a formula
pub const MAX_EXPRESSION_DEPTH: usize = 256;

// Orbit and framing
/// Number of orbit points sampled to find the bounding box of a still image
pub const DEFAULT_FRAMING_POINTS: usize = 100_000;

/// Fraction of `DEFAULT_FRAMING_POINTS` used per frame when framing an animation
pub const ANIMATION_FRAMING_RATE: f64 = 0.1;

/// Burn-in before framing is `sample_count / BURN_IN_DIVISOR`
pub const BURN_IN_DIVISOR: usize = 25;

/// Steps applied to a fresh seed so it lands on the attractor
pub const SETTLE_ITERATIONS: usize = 30;

// Unbounded modes reseed the orbit this often
/// Number of points between infinity checks and reseeds
pub const REFRAME_CHECK_INTERVAL: usize = 1000;

/// `|x| + |y|` above which a random orbit counts as divergent
pub const DIVERGENCE_BOUND: f64 = 10_000.0;

/// Orbit steps simulated when checking a random skeleton for divergence
pub const DIVERGENCE_CHECK_STEPS: usize = 20_000;

// Guards pathological user formulas that diverge from every seed
/// Maximum retries of a randomized configuration
pub const MAX_RANDOM_ATTEMPTS: usize = 10_000;

/// Accepted similarity dimension range for demo skeletons
pub const DEMO_DIMENSION_RANGE: (f64, f64) = (0.5, 2.0);

// Numeric searches
/// Upper bound of the dimension bisection interval
pub const DIMENSION_SEARCH_MAX: f64 = 50.0;

/// Width of the bisection interval at which the dimension search stops
pub const DIMENSION_TOLERANCE: f64 = 1e-5;

/// Relative change per axis under which the fixed point iteration stops
pub const FIXED_POINT_TOLERANCE: f64 = 1e-5;

/// Hard cap on fixed point iterations for maps that converge slowly
pub const FIXED_POINT_MAX_ITERATIONS: usize = 100_000;

// Rendering
/// Fraction of the raster used by the attractor, leaving a 4% border
pub const FRAMING_CORRECTION: f64 = 0.96;

/// Added to box extents so a degenerate box never divides by zero
pub const FRAMING_EPSILON: f64 = 1e-5;

/// Number of repeat hits a saturated approximate pixel stands for
pub const DEFAULT_PROBA_HIT_MAX: f64 = 10_000.0;

/// Reference range for `ApproximateDensity::set_proba`
pub const PROBA_SCALE: f64 = 2_147_483_647.0;

/// Intensity of a pixel hit once, approximate density, black background
pub const APPROXIMATE_FIRST_HIT: u8 = 127;

/// Deferred points kept by the Julia memo for a single image
pub const JULIA_MEMO_SINGLE_CAPACITY: usize = 2_000_000;

/// Deferred points shared by all frames of an animation
pub const JULIA_MEMO_SHARED_CAPACITY: usize = 10_000_000;

/// Highest hit threshold the Julia memo escalates to
pub const JULIA_HIT_THRESHOLD_MAX: u32 = 254;

// Generation pacing
/// Points generated between two deadline checks
pub const MINIMAL_BUILT_POINTS: usize = 1000;

/// Default number of points per still image
pub const DEFAULT_POINTS: u64 = 2_000_000;

/// Default number of points per animation frame
pub const DEFAULT_POINTS_PER_FRAME: u64 = 20_000;

/// Default number of frames per animation cycle
pub const FRAMES_PER_CYCLE: usize = 50;

// Prevents the last zoom frames from taking unbounded time
/// Maximum multiple of the base budget a zoom frame may use
pub const ZOOM_POINT_GROWTH_LIMIT: f64 = 100.0;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default still image width
pub const DEFAULT_IMAGE_WIDTH: usize = 800;
/// Default still image height
pub const DEFAULT_IMAGE_HEIGHT: usize = 600;
/// Default animation frame width
pub const DEFAULT_ANIMATION_WIDTH: usize = 160;
/// Default animation frame height
pub const DEFAULT_ANIMATION_HEIGHT: usize = 120;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed raster dimension
pub const MAX_IMAGE_DIMENSION: usize = 10_000;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_ifs";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 40;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 20;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
