//! Direct sampling for multiple-point geostatistical simulation
//!
//! A training image supplies patches. The sampler visits sites of a
//! realization in random order, draws candidate windows from the training
//! image until one is close enough to the site's neighbourhood, and pastes it
//! in. Conditional runs fill the missing cells of the training image itself;
//! unconditional runs grow a whole grid from a blank canvas.

#![forbid(unsafe_code)]

/// Distance metric, candidate search and the sampling engine
pub mod algorithm;
/// Command-line front end, image codec and error handling
pub mod io;
/// Grid model, site sets and window manipulation
pub mod spatial;

pub use algorithm::distance::{WindowDistance, nandiff};
pub use algorithm::sampler::{
    CandidatePool, DirectSampler, Realizations, SamplerConfig, SamplingMode,
};
pub use io::error::{Result, SimulationError};
