//! Command-line interface for batch simulation of PNG training images

use crate::algorithm::sampler::{CandidatePool, DirectSampler, SamplerConfig, SamplingMode};
use crate::io::configuration::{
    DEFAULT_ITERATIONS, DEFAULT_MAX_TRIES, DEFAULT_RADIUS, DEFAULT_SEED, DEFAULT_THRESHOLD,
    GIF_FRAME_DELAY_MS, HISTORY_SUFFIX, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, SimulationError, invalid_parameter};
use crate::io::image::{CategoricalImage, export_grid_as_png, load_categorical_png};
use crate::io::progress::ProgressManager;
use crate::io::visualization::HistoryCapture;
use crate::spatial::grid::missing_count;
use clap::Parser;
use log::info;
use rand::{SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "lidisa")]
#[command(
    author,
    version,
    about = "Fill or generate categorical images by direct sampling"
)]
/// Command-line arguments for the simulation tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Training PNG file or directory to process (transparent pixels are missing)
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Random seed for reproducible simulation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of passes over the image
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Distance below which a candidate is accepted at once
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Half the side length of the pasted windows
    #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
    pub radius: usize,

    /// Candidates drawn per site before settling for the best one
    #[arg(long, default_value_t = DEFAULT_MAX_TRIES)]
    pub max_tries: usize,

    /// Sampling mode: conditional or unconditional
    #[arg(short, long, default_value_t = SamplingMode::Conditional)]
    pub mode: SamplingMode,

    /// Category indices that are never pasted (comma separated)
    #[arg(short = 'b', long, value_delimiter = ',')]
    pub no_update: Vec<usize>,

    /// Draw candidates from every window, including windows with missing pixels
    #[arg(long)]
    pub any_window: bool,

    /// Output width in pixels for unconditional mode (implies square if height not specified)
    #[arg(short = 'w', long)]
    pub width: Option<usize>,

    /// Output height in pixels for unconditional mode
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Export the realization history as an animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Requested unconditional output shape as (rows, cols)
    pub const fn output_shape(&self) -> Option<(usize, usize)> {
        match (self.height, self.width) {
            (Some(h), Some(w)) => Some((h, w)),
            (Some(h), None) => Some((h, h)),
            (None, Some(w)) => Some((w, w)),
            (None, None) => None,
        }
    }

    /// Build the sampler parameters for a decoded training image
    ///
    /// # Errors
    ///
    /// Returns an error if a no-update category is missing from the palette
    pub fn sampler_config(&self, source: &CategoricalImage) -> Result<SamplerConfig<f64>> {
        let mut no_update_bands = Vec::with_capacity(self.no_update.len());
        for &category in &self.no_update {
            if category >= source.palette.len() {
                return Err(invalid_parameter(
                    "no_update",
                    &category,
                    &format!("image has {} categories", source.palette.len()),
                ));
            }
            no_update_bands.push(category as f64);
        }

        Ok(SamplerConfig {
            iterations: self.iterations,
            threshold: self.threshold,
            radius: self.radius,
            no_update_bands,
            sampling_mode: self.mode,
            max_tries: self.max_tries,
            output_shape: self.output_shape(),
            candidate_pool: if self.any_window {
                CandidatePool::Interior
            } else {
                CandidatePool::Complete
            },
        })
    }
}

/// Orchestrates batch processing of PNG files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation, sampler configuration or file
    /// processing fails
    pub fn process(&mut self) -> Result<()> {
        if self.cli.iterations == 0 {
            return Err(invalid_parameter(
                "iterations",
                &self.cli.iterations,
                &"at least one iteration is needed to produce a result",
            ));
        }

        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for file in &files {
            self.process_file(file)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if self.cli.target.extension().and_then(|s| s.to_str()) == Some("png") {
                if self.should_process_file(&self.cli.target) {
                    Ok(vec![self.cli.target.clone()])
                } else {
                    Ok(vec![])
                }
            } else {
                Err(crate::io::error::io_error(
                    "Target file must be a PNG image",
                ))
            }
        } else if self.cli.target.is_dir() {
            let mut files = Self::list_png_files(&self.cli.target)?;
            files.retain(|path| self.should_process_file(path));
            Ok(files)
        } else {
            Err(crate::io::error::io_error(
                "Target must be a PNG file or directory",
            ))
        }
    }

    /// Sorted PNG inputs of a directory, leaving out generated results
    ///
    /// # Errors
    ///
    /// Returns a file system error naming the directory if it cannot be read
    pub fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let read_error = |source: std::io::Error| SimulationError::FileSystem {
            path: dir.to_path_buf(),
            operation: "read directory",
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("png")
                && !Self::is_generated(&path)
            {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::get_output_path(input_path);
        if output_path.exists() {
            info!("Skipping: {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path) -> Result<()> {
        let start_time = Instant::now();
        let output_path = Self::get_output_path(input_path);

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(input_path, self.cli.iterations);
        }

        let source = load_categorical_png(input_path)?;
        info!(
            "{}: {}x{} cells, {} categories, {} missing",
            input_path.display(),
            source.grid.nrows(),
            source.grid.ncols(),
            source.palette.len(),
            missing_count(source.grid.view())
        );

        let config = self.cli.sampler_config(&source)?;
        let sampler = DirectSampler::new(source.grid.view(), config)?;
        let rng = StdRng::seed_from_u64(self.cli.seed);

        let mut history = self
            .cli
            .visualize
            .then(|| HistoryCapture::new(source.palette.clone(), self.cli.iterations));

        let mut realizations = sampler.simulate(rng);
        let mut result = None;
        while let Some(snapshot) = realizations.next() {
            if let Some(ref pm) = self.progress_manager {
                pm.update_iteration(realizations.iteration());
            }
            if let Some(ref mut capture) = history {
                capture.record(snapshot.view())?;
            }
            result = Some(snapshot);
        }

        let Some(result) = result else {
            return Err(invalid_parameter(
                "iterations",
                &self.cli.iterations,
                &"no iteration was run",
            ));
        };

        export_grid_as_png(result.view(), &source.palette, &output_path)?;
        info!(
            "{}: wrote {} ({} cells still missing)",
            input_path.display(),
            output_path.display(),
            missing_count(result.view())
        );

        if let Some(ref capture) = history {
            capture.export_gif(&Self::get_history_path(input_path), GIF_FRAME_DELAY_MS)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.complete_file();
        }
        info!(
            "{}: finished in {:.2?}",
            input_path.display(),
            start_time.elapsed()
        );

        Ok(())
    }

    fn is_generated(path: &Path) -> bool {
        path.file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with(OUTPUT_SUFFIX))
    }

    /// Path of the realization written for an input file
    pub fn get_output_path(input_path: &Path) -> PathBuf {
        Self::sibling_path(input_path, OUTPUT_SUFFIX, "png")
    }

    /// Path of the history animation written for an input file
    pub fn get_history_path(input_path: &Path) -> PathBuf {
        Self::sibling_path(input_path, HISTORY_SUFFIX, "gif")
    }

    fn sibling_path(input_path: &Path, suffix: &str, extension: &str) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(name)
        } else {
            PathBuf::from(name)
        }
    }
}
