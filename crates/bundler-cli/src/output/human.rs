//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use bundler_core::BundleReport;
use console::Term;
use console::style;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_bundle_result(&self, report: &BundleReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Bundle created: {}",
                style("✓").green().bold(),
                report.output.display()
            ));
        } else {
            self.line(&format!("Bundle created: {}", report.output.display()));
        }

        self.line(&format!("  Sources:          {}", report.sources.len()));
        self.line(&format!(
            "  Files added:      {}",
            report.entries.files_added
        ));
        self.line(&format!(
            "  Directories:      {}",
            report.entries.directories_added
        ));
        self.line(&format!(
            "  Bundle size:      {}",
            Self::format_size(report.bundle_size)
        ));

        if self.verbose {
            self.line(&format!(
                "  Symlinks:         {}",
                report.entries.symlinks_added
            ));
            self.line(&format!(
                "  Content size:     {}",
                Self::format_size(report.entries.bytes_written)
            ));
            self.line(&format!(
                "  Payload size:     {}",
                Self::format_size(report.entries.bytes_compressed)
            ));
            self.line(&format!(
                "  Payload offset:   {}",
                report.payload_offset
            ));
            self.line(&format!(
                "  Compression:      {:.1}%",
                report.compression_percentage()
            ));
            if report.has_ignored() {
                self.line(&format!("  Ignored:          {}", report.ignored.len()));
            }
            self.line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_success(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            self.line(message);
        }
    }

    fn format_notice(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("→").cyan()));
        } else {
            self.line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }
}
