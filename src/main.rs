//! CLI entry point for direct sampling simulation

use clap::Parser;
use env_logger::{Builder, Env};
use lidisa::io::cli::{Cli, FileProcessor};

fn main() -> lidisa::Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
