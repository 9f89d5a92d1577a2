//! Bundle command implementation.

use crate::cli::Cli;
use crate::error::convert_bundle_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use bundler_core::BundleOptions;
use bundler_core::Bundler;
use bundler_core::Reporter;
use std::path::Path;

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let output = cli.output_path();
    let bundler =
        Bundler::from_config_file(&cli.config).map_err(|e| convert_bundle_error(e, &cli.config))?;

    // Progress bar only when nothing else writes per-source output
    let progress = (!cli.verbose && !cli.quiet && !cli.json && CliProgress::should_show())
        .then(|| CliProgress::new(bundler.config().sources.len(), "Bundling"));

    let mut reporter = CliReporter {
        formatter,
        progress,
    };
    let options = BundleOptions {
        verbose: cli.verbose,
    };
    let report = bundler
        .bundle(&output, &options, &mut reporter)
        .map_err(|e| convert_bundle_error(e, &cli.config))?;
    if let Some(progress) = &reporter.progress {
        progress.finish();
    }

    formatter.format_bundle_result(&report)?;
    formatter.format_success("bundle success");

    Ok(())
}

/// Routes build events to the formatter and the progress bar.
struct CliReporter<'a> {
    formatter: &'a dyn OutputFormatter,
    progress: Option<CliProgress>,
}

impl Reporter for CliReporter<'_> {
    fn notice(&mut self, message: &str) {
        match &self.progress {
            Some(progress) => progress.suspend(|| self.formatter.format_notice(message)),
            None => self.formatter.format_notice(message),
        }
    }

    fn warn(&mut self, message: &str) {
        match &self.progress {
            Some(progress) => progress.suspend(|| self.formatter.format_warning(message)),
            None => self.formatter.format_warning(message),
        }
    }

    fn on_source_start(&mut self, path: &Path, _total: usize, _current: usize) {
        if let Some(progress) = &self.progress {
            progress.start(path);
        }
    }

    fn on_source_complete(&mut self, _path: &Path) {
        if let Some(progress) = &self.progress {
            progress.complete();
        }
    }
}
