//! Tests for command-line parsing and end-to-end file processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use lidisa::SamplingMode;
    use lidisa::SimulationError;
    use lidisa::io::cli::{Cli, FileProcessor};
    use lidisa::io::image::{grid_from_rgba, load_categorical_png};
    use std::path::{Path, PathBuf};

    const DARK: [u8; 4] = [20, 20, 20, 255];
    const LIGHT: [u8; 4] = [230, 230, 230, 255];

    /// Checkerboard with a transparent 3x3 hole in the middle
    fn write_training_png(path: &Path) {
        let mut img = RgbaImage::new(10, 10);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let hole = (4..7).contains(&x) && (4..7).contains(&y);
            *pixel = if hole {
                Rgba([0, 0, 0, 0])
            } else if (x + y) % 2 == 0 {
                Rgba(DARK)
            } else {
                Rgba(LIGHT)
            };
        }
        img.save(path).expect("write training image");
    }

    // Tests defaults and flag parsing
    // Verified by changing the default mode
    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["lidisa", "input.png"]);
        assert_eq!(cli.target, PathBuf::from("input.png"));
        assert_eq!(cli.mode, SamplingMode::Conditional);
        assert_eq!(cli.iterations, 5);
        assert_eq!(cli.radius, 4);
        assert!(cli.no_update.is_empty());
        assert!(cli.skip_existing());
        assert!(cli.should_show_progress());

        let cli = Cli::parse_from([
            "lidisa", "dir", "-m", "unconditional", "-b", "0,2", "-w", "32", "-r", "2", "-q",
            "-n", "--max-tries", "50",
        ]);
        assert_eq!(cli.mode, SamplingMode::Unconditional);
        assert_eq!(cli.no_update, vec![0, 2]);
        assert_eq!(cli.output_shape(), Some((32, 32)));
        assert_eq!(cli.radius, 2);
        assert_eq!(cli.max_tries, 50);
        assert!(!cli.skip_existing());
        assert!(!cli.should_show_progress());
    }

    // Tests unknown modes are rejected while parsing arguments
    // Verified by falling back to conditional mode
    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["lidisa", "input.png", "--mode", "sideways"]).is_err());
    }

    // Tests no-update categories are checked against the palette
    // Verified by accepting any category index
    #[test]
    fn test_sampler_config_validates_bands() {
        let mut img = RgbaImage::new(2, 2);
        for pixel in img.pixels_mut() {
            *pixel = Rgba(DARK);
        }
        let source = grid_from_rgba(&img);

        let cli = Cli::parse_from(["lidisa", "input.png", "-b", "0"]);
        let config = cli.sampler_config(&source).expect("category 0 exists");
        assert_eq!(config.no_update_bands, vec![0.0]);

        let cli = Cli::parse_from(["lidisa", "input.png", "-b", "1"]);
        assert!(cli.sampler_config(&source).is_err());
    }

    // Tests output paths sit next to the input
    // Verified by dropping the parent directory
    #[test]
    fn test_output_paths() {
        let input = Path::new("data/maps/field.png");
        assert_eq!(
            FileProcessor::get_output_path(input),
            PathBuf::from("data/maps/field_result.png")
        );
        assert_eq!(
            FileProcessor::get_history_path(input),
            PathBuf::from("data/maps/field_history.gif")
        );
    }

    // Tests a conditional run fills the hole and writes both outputs
    // Verified by exporting the initial realization
    #[test]
    fn test_process_fills_missing_pixels() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let input = dir.path().join("board.png");
        write_training_png(&input);

        let cli = Cli::parse_from([
            "lidisa",
            input.to_str().expect("utf-8 path"),
            "-r",
            "1",
            "-i",
            "2",
            "-t",
            "1.0",
            "-q",
            "-v",
        ]);
        let mut processor = FileProcessor::new(cli);
        processor.process().expect("processing succeeds");

        let output = load_categorical_png(&FileProcessor::get_output_path(&input))
            .expect("result is readable");
        assert_eq!(output.grid.dim(), (10, 10));
        assert!(output.grid.iter().all(|v| !v.is_nan()));
        assert!(FileProcessor::get_history_path(&input).exists());
    }

    // Tests zero iterations and non-PNG targets are rejected
    // Verified by silently producing no output
    #[test]
    fn test_process_rejects_bad_targets() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let input = dir.path().join("board.png");
        write_training_png(&input);

        let cli = Cli::parse_from(["lidisa", input.to_str().expect("utf-8 path"), "-i", "0", "-q"]);
        assert!(FileProcessor::new(cli).process().is_err());

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "not an image").expect("write text file");
        let cli = Cli::parse_from(["lidisa", text.to_str().expect("utf-8 path"), "-q"]);
        assert!(FileProcessor::new(cli).process().is_err());
    }

    // Tests directory listing keeps only training PNGs in sorted order
    // Verified by including generated results in the batch
    #[test]
    fn test_list_png_files() {
        let dir = tempfile::tempdir().expect("temporary directory");
        write_training_png(&dir.path().join("b.png"));
        write_training_png(&dir.path().join("a.png"));
        write_training_png(&dir.path().join("a_result.png"));
        std::fs::write(dir.path().join("notes.txt"), "text").expect("write text file");

        let files = FileProcessor::list_png_files(dir.path()).expect("readable directory");
        assert_eq!(files, vec![dir.path().join("a.png"), dir.path().join("b.png")]);
    }

    // Tests an unreadable directory reports its own path
    // Verified by converting the I/O error without a path
    #[test]
    fn test_list_png_files_reports_directory() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let missing = dir.path().join("gone");

        let err = FileProcessor::list_png_files(&missing).expect_err("directory is missing");
        assert!(err.to_string().contains("gone"));
        match err {
            SimulationError::FileSystem {
                path, operation, ..
            } => {
                assert_eq!(path, missing);
                assert_eq!(operation, "read directory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
