/// Command-line interface and batch processing
pub mod cli;
/// Sampler defaults and output settings
pub mod configuration;
/// Error types and result alias
pub mod error;
/// Categorical PNG codec
pub mod image;
/// Multi-file progress display
pub mod progress;
/// Animated export of the realization history
pub mod visualization;
