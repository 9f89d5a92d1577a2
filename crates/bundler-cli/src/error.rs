//! Error conversion utilities for CLI.
//!
//! Converts bundler-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use bundler_core::BundleError;
use std::path::Path;

/// Converts `BundleError` to user-friendly anyhow error with context
pub fn convert_bundle_error(err: BundleError, config: &Path) -> anyhow::Error {
    match err {
        BundleError::ConfigRead { path, source } => {
            anyhow!(
                "Cannot read configuration '{}': {source}\n\
                 HINT: Pass the path of an existing YAML configuration file.",
                path.display()
            )
        }
        BundleError::ConfigParse { source } => {
            anyhow!(
                "Invalid configuration '{}': {source}\n\
                 HINT: Supported keys are command, archive_paths and ignore_paths.",
                config.display()
            )
        }
        BundleError::Pattern { pattern, source } => {
            anyhow!(
                "Invalid glob pattern '{pattern}' in '{}': {source}",
                config.display()
            )
        }
        BundleError::SourceNotFound { path } => {
            anyhow!(
                "Unable to add '{}' to bundle: no such file or directory\n\
                 HINT: archive_paths are resolved from the current directory.",
                path.display()
            )
        }
        BundleError::ParentTraversal { path } => {
            anyhow!(
                "Unable to add '{}' to bundle: archive names cannot contain '..'\n\
                 HINT: Run bundler from a directory that contains the file.",
                path.display()
            )
        }
        BundleError::Output { path, source } => {
            anyhow!(
                "Unable to write bundle '{}': {source}\n\
                 HINT: Check that the output directory exists and is writable.",
                path.display()
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Failed to bundle '{}'", config.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_parent_traversal_error() {
        let err = BundleError::ParentTraversal {
            path: PathBuf::from("../secret.txt"),
        };
        let msg = format!("{:?}", convert_bundle_error(err, Path::new("app.yaml")));
        assert!(msg.contains("../secret.txt"));
        assert!(msg.contains("'..'"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_output_error() {
        let err = BundleError::Output {
            path: PathBuf::from("/ro/app.bundle"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        let msg = format!("{:?}", convert_bundle_error(err, Path::new("app.yaml")));
        assert!(msg.contains("/ro/app.bundle"));
        assert!(msg.contains("writable"));
    }

    #[test]
    fn test_convert_other_error_keeps_context() {
        let err = BundleError::UnsupportedFileType {
            path: PathBuf::from("fifo"),
        };
        let msg = format!("{:?}", convert_bundle_error(err, Path::new("app.yaml")));
        assert!(msg.contains("Failed to bundle 'app.yaml'"));
        assert!(msg.contains("fifo"));
    }
}
