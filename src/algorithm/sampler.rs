use crate::{
    algorithm::distance::{DistanceFn, WindowDistance, nandiff},
    algorithm::search::CandidateSearch,
    io::configuration::{
        DEFAULT_ITERATIONS, DEFAULT_MAX_TRIES, DEFAULT_RADIUS, DEFAULT_THRESHOLD,
        MAX_GRID_DIMENSION,
    },
    io::error::{Result, invalid_parameter},
    spatial::grid::{
        complete_sites, interior_sites, missing_grid, missing_sites, observed_mask,
        window_view, window_view_mut,
    },
    spatial::window::merge_window,
};
use log::{debug, warn};
use ndarray::{Array2, ArrayView2};
use num_traits::Float;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

/// How the realization is seeded and which sites are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Start from the training image and fill only its missing sites
    #[default]
    Conditional,
    /// Start from a blank grid and visit every site
    Unconditional,
}

impl FromStr for SamplingMode {
    type Err = crate::io::error::SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conditional" => Ok(Self::Conditional),
            "unconditional" => Ok(Self::Unconditional),
            _ => Err(invalid_parameter(
                "sampling_mode",
                &s,
                &"expected 'conditional' or 'unconditional'",
            )),
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conditional => write!(f, "conditional"),
            Self::Unconditional => write!(f, "unconditional"),
        }
    }
}

/// Which training image sites candidates are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidatePool {
    /// Sites whose window holds no missing cell, falling back to every site
    /// when the training image has none
    #[default]
    Complete,
    /// Every site of the training image
    Interior,
}

/// Sampler parameters
#[derive(Debug, Clone)]
pub struct SamplerConfig<F> {
    /// Number of full passes over the site set, and of emitted snapshots
    pub iterations: usize,
    /// Candidates scoring strictly below this distance are accepted at once
    pub threshold: f64,
    /// Half the side length of a window
    pub radius: usize,
    /// Candidate values that are never pasted into the realization
    pub no_update_bands: Vec<F>,
    /// Conditional or unconditional simulation
    pub sampling_mode: SamplingMode,
    /// Per-site candidate search budget
    pub max_tries: usize,
    /// Realization shape in unconditional mode, defaults to the training image shape
    pub output_shape: Option<(usize, usize)>,
    /// Training image sites candidates are drawn from
    pub candidate_pool: CandidatePool,
}

impl<F> Default for SamplerConfig<F> {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            threshold: DEFAULT_THRESHOLD,
            radius: DEFAULT_RADIUS,
            no_update_bands: Vec::new(),
            sampling_mode: SamplingMode::default(),
            max_tries: DEFAULT_MAX_TRIES,
            output_shape: None,
            candidate_pool: CandidatePool::default(),
        }
    }
}

impl<F> SamplerConfig<F> {
    /// Check parameters before any sampling work starts
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `radius` or `max_tries` is zero
    /// - `threshold` is NaN
    /// - `output_shape` exceeds the maximum grid dimension
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(invalid_parameter(
                "radius",
                &self.radius,
                &"windows need a radius of at least 1",
            ));
        }
        if self.max_tries == 0 {
            return Err(invalid_parameter(
                "max_tries",
                &self.max_tries,
                &"at least one candidate must be drawn per site",
            ));
        }
        if self.threshold.is_nan() {
            return Err(invalid_parameter(
                "threshold",
                &self.threshold,
                &"threshold must be a number",
            ));
        }
        if let Some((rows, cols)) = self.output_shape {
            if rows > MAX_GRID_DIMENSION || cols > MAX_GRID_DIMENSION {
                return Err(invalid_parameter(
                    "output_shape",
                    &format!("{rows}x{cols}"),
                    &format!("dimensions are limited to {MAX_GRID_DIMENSION}"),
                ));
            }
        }
        Ok(())
    }
}

/// Direct sampling simulator bound to one training image
///
/// Holds everything that stays fixed across runs: the training image, the
/// parameters, the candidate pool and the observed mask. Each call to
/// [`DirectSampler::simulate`] starts a fresh run at iteration zero.
pub struct DirectSampler<'a, F, D = DistanceFn<F>> {
    training_image: ArrayView2<'a, F>,
    config: SamplerConfig<F>,
    candidates: Vec<[usize; 2]>,
    observed: Array2<bool>,
    distance: D,
}

impl<'a, F: Float> DirectSampler<'a, F> {
    /// Create a sampler scoring candidates with [`nandiff`]
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails [`SamplerConfig::validate`]
    pub fn new(training_image: ArrayView2<'a, F>, config: SamplerConfig<F>) -> Result<Self> {
        config.validate()?;

        let candidates = match config.candidate_pool {
            CandidatePool::Complete => {
                let complete = complete_sites(training_image, config.radius);
                if complete.is_empty() {
                    interior_sites(training_image.dim(), config.radius)
                } else {
                    complete
                }
            }
            CandidatePool::Interior => interior_sites(training_image.dim(), config.radius),
        };

        let observed = match config.sampling_mode {
            SamplingMode::Conditional => observed_mask(training_image),
            SamplingMode::Unconditional => {
                Array2::from_elem(Self::realization_shape(training_image, &config), false)
            }
        };

        if config.sampling_mode == SamplingMode::Conditional {
            if let Some(shape) = config.output_shape {
                if shape != training_image.dim() {
                    warn!(
                        "output shape {shape:?} is ignored in conditional mode, using {:?}",
                        training_image.dim()
                    );
                }
            }
        }

        if candidates.is_empty() {
            warn!(
                "training image {:?} is smaller than a {}x{} window, no site will be visited",
                training_image.dim(),
                2 * config.radius,
                2 * config.radius
            );
        }

        Ok(Self {
            training_image,
            config,
            candidates,
            observed,
            distance: nandiff::<F>,
        })
    }

    fn realization_shape(
        training_image: ArrayView2<'_, F>,
        config: &SamplerConfig<F>,
    ) -> (usize, usize) {
        match config.sampling_mode {
            SamplingMode::Conditional => training_image.dim(),
            SamplingMode::Unconditional => config.output_shape.unwrap_or(training_image.dim()),
        }
    }
}

impl<'a, F, D> DirectSampler<'a, F, D>
where
    F: Float,
    D: WindowDistance<F>,
{
    /// Replace the distance metric
    pub fn with_distance<E: WindowDistance<F>>(self, distance: E) -> DirectSampler<'a, F, E> {
        DirectSampler {
            training_image: self.training_image,
            config: self.config,
            candidates: self.candidates,
            observed: self.observed,
            distance,
        }
    }

    /// Start a run, returning the lazy sequence of per-iteration snapshots
    ///
    /// Nothing is computed until the first snapshot is requested. Dropping
    /// the iterator abandons the remaining iterations.
    pub fn simulate<R: Rng>(&self, rng: R) -> Realizations<'_, 'a, F, D, R> {
        let (realization, sites) = match self.config.sampling_mode {
            SamplingMode::Conditional => (
                self.training_image.to_owned(),
                missing_sites(self.training_image, self.config.radius),
            ),
            SamplingMode::Unconditional => {
                let shape = self.observed.dim();
                (missing_grid(shape), interior_sites(shape, self.config.radius))
            }
        };

        // Without candidates there is nothing to paste
        let sites = if self.candidates.is_empty() {
            Vec::new()
        } else {
            sites
        };

        Realizations {
            sampler: self,
            realization,
            sites,
            rng,
            iteration: 0,
            stats: IterationStats::default(),
        }
    }

    /// The sampler parameters
    pub const fn config(&self) -> &SamplerConfig<F> {
        &self.config
    }

    /// The training image candidates are drawn from
    pub fn training_image(&self) -> ArrayView2<'_, F> {
        self.training_image.view()
    }

    /// Training image sites candidates are drawn from
    pub fn candidates(&self) -> &[[usize; 2]] {
        &self.candidates
    }
}

/// Counters for one completed iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationStats {
    /// Number of sites visited
    pub sites: usize,
    /// Searches stopped by a candidate below the threshold
    pub early_accepts: usize,
    /// Searches that used their whole budget
    pub exhausted: usize,
    /// Cells that took a candidate value
    pub cells_written: usize,
}

/// Lazy sequence of realization snapshots, one per iteration
///
/// Each call to `next` runs one full pass over the shuffled site set and
/// returns an owned copy of the realization.
pub struct Realizations<'s, 'a, F, D, R> {
    sampler: &'s DirectSampler<'a, F, D>,
    realization: Array2<F>,
    sites: Vec<[usize; 2]>,
    rng: R,
    iteration: usize,
    stats: IterationStats,
}

impl<F, D, R> Realizations<'_, '_, F, D, R>
where
    F: Float,
    D: WindowDistance<F>,
    R: Rng,
{
    /// Number of completed iterations
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// The live realization
    pub fn realization(&self) -> ArrayView2<'_, F> {
        self.realization.view()
    }

    /// Sites visited every iteration, in the order of the last pass
    pub fn sites(&self) -> &[[usize; 2]] {
        &self.sites
    }

    /// Counters of the last completed iteration
    pub const fn stats(&self) -> IterationStats {
        self.stats
    }

    fn run_iteration(&mut self) {
        let sampler = self.sampler;
        let config = &sampler.config;
        let radius = config.radius;

        self.sites.shuffle(&mut self.rng);

        let search = CandidateSearch::new(
            sampler.training_image.view(),
            &sampler.candidates,
            radius,
            config.threshold,
            config.max_tries,
            &sampler.distance,
        );

        let mut stats = IterationStats {
            sites: self.sites.len(),
            ..IterationStats::default()
        };

        for &site in &self.sites {
            let current = window_view(self.realization.view(), site, radius);
            let Some(found) = search.search(current, &mut self.rng) else {
                continue;
            };

            if found.early_accept {
                stats.early_accepts += 1;
            } else {
                stats.exhausted += 1;
            }

            let candidate = window_view(sampler.training_image.view(), found.position, radius);
            let observed = window_view(sampler.observed.view(), site, radius);
            let target = window_view_mut(self.realization.view_mut(), site, radius);
            stats.cells_written +=
                merge_window(target, candidate, observed, &config.no_update_bands);
        }

        debug!(
            "iteration {}: {} sites, {} early accepts, {} exhausted searches, {} cells written",
            self.iteration + 1,
            stats.sites,
            stats.early_accepts,
            stats.exhausted,
            stats.cells_written
        );

        self.stats = stats;
    }
}

impl<F, D, R> Iterator for Realizations<'_, '_, F, D, R>
where
    F: Float,
    D: WindowDistance<F>,
    R: Rng,
{
    type Item = Array2<F>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iteration >= self.sampler.config.iterations {
            return None;
        }

        self.run_iteration();
        self.iteration += 1;
        Some(self.realization.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .sampler
            .config
            .iterations
            .saturating_sub(self.iteration);
        (remaining, Some(remaining))
    }
}

impl<F, D, R> ExactSizeIterator for Realizations<'_, '_, F, D, R>
where
    F: Float,
    D: WindowDistance<F>,
    R: Rng,
{
}

impl<F, D, R> FusedIterator for Realizations<'_, '_, F, D, R>
where
    F: Float,
    D: WindowDistance<F>,
    R: Rng,
{
}
