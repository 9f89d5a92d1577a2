//! JSON output formatter for machine-readable results.
//!
//! Only the final result goes to stdout. Warnings go to stderr so stdout
//! stays a single JSON document.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use bundler_core::BundleReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct BundleOutput {
    output_path: String,
    sources: Vec<String>,
    ignored: Vec<String>,
    files_added: usize,
    directories_added: usize,
    symlinks_added: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    payload_offset: u64,
    bundle_size: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    duration_ms: u128,
}

impl BundleOutput {
    fn from_report(report: &BundleReport) -> Self {
        Self {
            output_path: report.output.display().to_string(),
            sources: report
                .sources
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            ignored: report
                .ignored
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            files_added: report.entries.files_added,
            directories_added: report.entries.directories_added,
            symlinks_added: report.entries.symlinks_added,
            bytes_written: report.entries.bytes_written,
            bytes_compressed: report.entries.bytes_compressed,
            payload_offset: report.payload_offset,
            bundle_size: report.bundle_size,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_bundle_result(&self, report: &BundleReport) -> Result<()> {
        let output = JsonOutput::success("bundle", BundleOutput::from_report(report));
        Self::output(&output)
    }

    fn format_success(&self, _message: &str) {}

    fn format_notice(&self, _message: &str) {}

    fn format_warning(&self, message: &str) {
        let _ = writeln!(io::stderr(), "warning: {message}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bundler_core::EntryCounts;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_bundle_output_shape() {
        let report = BundleReport {
            output: PathBuf::from("app.bundle"),
            sources: vec![PathBuf::from("a.txt"), PathBuf::from("dir/b.txt")],
            ignored: vec![PathBuf::from("dir/c.log")],
            entries: EntryCounts {
                files_added: 2,
                directories_added: 1,
                symlinks_added: 0,
                bytes_written: 400,
                bytes_compressed: 100,
            },
            payload_offset: 512,
            bundle_size: 612,
            duration: Duration::from_millis(7),
        };

        let output = JsonOutput::success("bundle", BundleOutput::from_report(&report));
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["operation"], "bundle");
        assert_eq!(value["status"], "success");
        assert!(value.get("error").is_none());
        assert_eq!(value["data"]["output_path"], "app.bundle");
        assert_eq!(value["data"]["sources"][1], "dir/b.txt");
        assert_eq!(value["data"]["ignored"][0], "dir/c.log");
        assert_eq!(value["data"]["files_added"], 2);
        assert_eq!(value["data"]["payload_offset"], 512);
        assert_eq!(value["data"]["compression_ratio"], 4.0);
        assert_eq!(value["data"]["duration_ms"], 7);
    }
}
