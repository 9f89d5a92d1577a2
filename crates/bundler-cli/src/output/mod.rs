//! Reporting of bundle builds on the terminal.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter that renders a [`bundler_core::BundleReport`] and the
/// notices emitted while the bundle is built.
///
/// `--json` wins over the other flags and prints one document on stdout.
/// Otherwise the styled formatter honors `verbose` and `quiet`.
pub fn create_formatter(json: bool, verbose: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter::new(verbose, quiet))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bundler_core::BundleReport;
    use bundler_core::EntryCounts;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report() -> BundleReport {
        BundleReport {
            output: PathBuf::from("app.bundle"),
            sources: vec![PathBuf::from("a.txt"), PathBuf::from("dir/")],
            ignored: vec![PathBuf::from("dir/c.log")],
            entries: EntryCounts {
                files_added: 2,
                directories_added: 1,
                ..EntryCounts::default()
            },
            payload_offset: 512,
            bundle_size: 2048,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_every_formatter_renders_bundle_report() {
        let report = report();
        for (json, verbose, quiet) in [
            (true, false, false),
            (false, true, false),
            (false, false, true),
        ] {
            create_formatter(json, verbose, quiet)
                .format_bundle_result(&report)
                .unwrap();
        }
    }
}
