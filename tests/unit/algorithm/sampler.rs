//! Tests for sampler configuration, initialization and the snapshot sequence

#[cfg(test)]
mod tests {
    use lidisa::SimulationError;
    use lidisa::algorithm::sampler::{
        CandidatePool, DirectSampler, IterationStats, SamplerConfig, SamplingMode,
    };
    use ndarray::{Array2, ArrayView2};
    use rand::{SeedableRng, rngs::StdRng};

    fn checkerboard(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| ((r + c) % 2) as f64)
    }

    fn always_far(_: ArrayView2<'_, f64>, _: ArrayView2<'_, f64>) -> f64 {
        1.0
    }

    fn grids_equal(a: &Array2<f64>, b: &Array2<f64>) -> bool {
        a.dim() == b.dim()
            && a
                .iter()
                .zip(b.iter())
                .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
    }

    // Tests sampling modes parse from text and reject anything else
    // Verified by accepting unknown modes as conditional
    #[test]
    fn test_sampling_mode_parsing() {
        assert_eq!(
            "conditional".parse::<SamplingMode>().ok(),
            Some(SamplingMode::Conditional)
        );
        assert_eq!(
            " Unconditional ".parse::<SamplingMode>().ok(),
            Some(SamplingMode::Unconditional)
        );

        let err = "semi-conditional"
            .parse::<SamplingMode>()
            .expect_err("unknown mode must be rejected");
        assert!(matches!(
            err,
            SimulationError::InvalidParameter {
                parameter: "sampling_mode",
                ..
            }
        ));
        assert_eq!(SamplingMode::Unconditional.to_string(), "unconditional");
    }

    // Tests defaults follow the reference parameters
    // Verified by changing the default radius
    #[test]
    fn test_default_config() {
        let config = SamplerConfig::<f64>::default();
        assert_eq!(config.iterations, 5);
        assert!((config.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.radius, 4);
        assert!(config.no_update_bands.is_empty());
        assert_eq!(config.sampling_mode, SamplingMode::Conditional);
        assert_eq!(config.max_tries, 10_000);
        assert_eq!(config.output_shape, None);
        assert_eq!(config.candidate_pool, CandidatePool::Complete);
    }

    // Tests invalid parameters fail before sampling starts
    // Verified by removing each validation branch
    #[test]
    fn test_invalid_parameters_fail_fast() {
        let training = checkerboard(6, 6);

        let bad_configs = [
            SamplerConfig {
                radius: 0,
                ..SamplerConfig::default()
            },
            SamplerConfig {
                max_tries: 0,
                ..SamplerConfig::default()
            },
            SamplerConfig {
                threshold: f64::NAN,
                ..SamplerConfig::default()
            },
            SamplerConfig {
                sampling_mode: SamplingMode::Unconditional,
                output_shape: Some((20_000, 5)),
                ..SamplerConfig::default()
            },
        ];

        for config in bad_configs {
            assert!(DirectSampler::new(training.view(), config).is_err());
        }
    }

    // Tests the sequence length equals the iteration count
    // Verified by emitting one snapshot fewer
    #[test]
    fn test_sequence_has_one_snapshot_per_iteration() {
        let training = checkerboard(8, 8);
        let config = SamplerConfig {
            iterations: 4,
            radius: 1,
            max_tries: 5,
            sampling_mode: SamplingMode::Unconditional,
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config).expect("valid config");

        let realizations = sampler.simulate(StdRng::seed_from_u64(1));
        assert_eq!(realizations.len(), 4);
        assert_eq!(realizations.count(), 4);

        let zero = SamplerConfig {
            iterations: 0,
            radius: 1,
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), zero).expect("valid config");
        assert_eq!(sampler.simulate(StdRng::seed_from_u64(1)).count(), 0);
    }

    // Tests each call starts a new run at iteration zero
    // Verified by sharing the iteration counter across runs
    #[test]
    fn test_simulate_restarts_per_call() {
        let training = checkerboard(6, 6);
        let config = SamplerConfig {
            iterations: 2,
            radius: 1,
            sampling_mode: SamplingMode::Unconditional,
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config).expect("valid config");

        let mut first = sampler.simulate(StdRng::seed_from_u64(5));
        assert_eq!(first.iteration(), 0);
        assert!(first.next().is_some());
        assert_eq!(first.iteration(), 1);

        let second = sampler.simulate(StdRng::seed_from_u64(5));
        assert_eq!(second.iteration(), 0);
        assert!(second.realization().iter().all(|v| v.is_nan()));
    }

    // Tests snapshots are independent copies of the live realization
    // Verified by returning a shared buffer
    #[test]
    fn test_snapshots_do_not_alias() {
        let training = checkerboard(6, 6);
        let config = SamplerConfig {
            iterations: 2,
            radius: 1,
            sampling_mode: SamplingMode::Unconditional,
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config).expect("valid config");
        let mut realizations = sampler.simulate(StdRng::seed_from_u64(2));

        let mut first = realizations.next().expect("first snapshot");
        let kept = first.clone();
        first.fill(99.0);

        assert!(grids_equal(&kept, &realizations.realization().to_owned()));
        assert!(realizations.next().is_some());
    }

    // Tests unconditional runs start blank with the requested shape
    // Verified by sizing the realization from the training image
    #[test]
    fn test_unconditional_output_shape() {
        let training = checkerboard(6, 6);
        let config = SamplerConfig {
            iterations: 1,
            radius: 1,
            sampling_mode: SamplingMode::Unconditional,
            output_shape: Some((9, 12)),
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config).expect("valid config");
        let realizations = sampler.simulate(StdRng::seed_from_u64(3));

        assert_eq!(realizations.realization().dim(), (9, 12));
        // Sites are every position where a 2x2 window fits
        assert_eq!(realizations.sites().len(), 8 * 11);

        let snapshots: Vec<_> = realizations.collect();
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots.iter().all(|s| s.dim() == (9, 12)));
        assert!(snapshots.iter().flatten().all(|&v| v == 0.0 || v == 1.0));
    }

    // Tests conditional runs visit only missing sites and ignore output_shape
    // Verified by visiting every interior site in conditional mode
    #[test]
    fn test_conditional_sites_are_missing_cells() {
        let mut training = checkerboard(6, 6);
        for site in [(2, 2), (3, 4), (0, 0)] {
            if let Some(cell) = training.get_mut(site) {
                *cell = f64::NAN;
            }
        }

        let config = SamplerConfig {
            iterations: 1,
            radius: 1,
            output_shape: Some((3, 3)),
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config).expect("valid config");
        let realizations = sampler.simulate(StdRng::seed_from_u64(4));

        // (0, 0) lies in the border where no window is centred
        let mut sites = realizations.sites().to_vec();
        sites.sort_unstable();
        assert_eq!(sites, vec![[2, 2], [3, 4]]);
        assert_eq!(realizations.realization().dim(), (6, 6));
    }

    // Tests a training image smaller than one window yields unchanged copies
    // Verified by treating the empty site set as an error
    #[test]
    fn test_too_small_training_image_is_degenerate() {
        let mut training = checkerboard(3, 3);
        if let Some(cell) = training.get_mut((1, 1)) {
            *cell = f64::NAN;
        }

        let config = SamplerConfig {
            iterations: 3,
            radius: 2,
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config).expect("valid config");
        assert!(sampler.candidates().is_empty());

        let snapshots: Vec<_> = sampler.simulate(StdRng::seed_from_u64(0)).collect();
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots.iter().all(|s| grids_equal(s, &training)));
    }

    // Tests the complete pool avoids windows with missing cells
    // Verified by always using the interior pool
    #[test]
    fn test_candidate_pools() {
        let mut training = checkerboard(5, 5);
        if let Some(cell) = training.get_mut((0, 0)) {
            *cell = f64::NAN;
        }

        let complete = DirectSampler::new(
            training.view(),
            SamplerConfig {
                radius: 1,
                ..SamplerConfig::default()
            },
        )
        .expect("valid config");
        let interior = DirectSampler::new(
            training.view(),
            SamplerConfig {
                radius: 1,
                candidate_pool: CandidatePool::Interior,
                ..SamplerConfig::default()
            },
        )
        .expect("valid config");

        assert_eq!(interior.candidates().len(), 16);
        assert_eq!(complete.candidates().len(), 15);
        assert!(!complete.candidates().contains(&[1, 1]));
    }

    // Tests an exhausted search still pastes its best candidate
    // Verified by skipping the merge when no candidate beats the threshold
    #[test]
    fn test_custom_distance_and_stats() {
        let training = checkerboard(6, 6);
        let config = SamplerConfig {
            iterations: 1,
            radius: 1,
            threshold: 0.0,
            max_tries: 3,
            sampling_mode: SamplingMode::Unconditional,
            ..SamplerConfig::default()
        };
        let sampler = DirectSampler::new(training.view(), config)
            .expect("valid config")
            .with_distance(always_far);

        let mut realizations = sampler.simulate(StdRng::seed_from_u64(8));
        let snapshot = realizations.next().expect("one iteration");
        let stats = realizations.stats();

        assert_eq!(
            stats,
            IterationStats {
                sites: 25,
                early_accepts: 0,
                exhausted: 25,
                cells_written: 25 * 4,
            }
        );
        assert!(snapshot.iter().all(|v| !v.is_nan()));
    }
}
