//! CLI argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

/// Packs files and a launch command into a self-extracting executable.
#[derive(Parser)]
#[command(name = "bundler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Path of the bundle to write (default: CONFIG with a .bundle extension)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report every archived and ignored path
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// The bundle path, defaulting to the configuration path with its
    /// extension replaced by `bundle`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.config.with_extension("bundle"))
    }
}
