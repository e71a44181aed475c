//! Sampler defaults and command-line output settings

// Sampler defaults
/// Default number of full passes over the site set
pub const DEFAULT_ITERATIONS: usize = 5;

/// Default early-accept cutoff for the distance metric
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default window half-width
pub const DEFAULT_RADIUS: usize = 4;

/// Default per-site candidate search budget
pub const DEFAULT_MAX_TRIES: usize = 10_000;

/// Fixed seed for reproducible simulation
pub const DEFAULT_SEED: u64 = 42;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed dimension for a requested output grid
pub const MAX_GRID_DIMENSION: usize = 10_000;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Suffix added to realization history animations
pub const HISTORY_SUFFIX: &str = "_history";
/// Delay between history animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 400;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
