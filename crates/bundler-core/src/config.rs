//! Bundle configuration: the YAML file and its resolution into concrete
//! source paths.

use crate::BundleError;
use crate::Result;
use glob::Pattern;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Configuration file as written by the user.
///
/// ```yaml
/// command: ./run.sh
/// archive_paths:
///   - a.txt
///   - dir/*
/// ignore_paths:
///   - dir/b.txt
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command run from the extraction directory; empty means none.
    pub command: String,

    /// Glob patterns selecting what goes into the bundle.
    pub archive_paths: Vec<String>,

    /// Glob patterns removing resolved paths again.
    pub ignore_paths: Vec<String>,
}

impl Config {
    /// Reads and parses a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BundleError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parses a configuration from YAML text.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundler_core::Config;
    ///
    /// let config = Config::from_yaml_str("command: ./run.sh\narchive_paths: [run.sh]\n")?;
    /// assert_eq!(config.command, "./run.sh");
    /// assert_eq!(config.archive_paths, ["run.sh"]);
    /// assert!(config.ignore_paths.is_empty());
    /// # Ok::<(), bundler_core::BundleError>(())
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Expands the patterns into an ordered list of source paths.
    ///
    /// Relative patterns are matched under `base_dir` and yield paths
    /// relative to it, so their spelling is what ends up in the archive.
    /// Patterns are expanded in order, matches of one pattern sorted, and a
    /// pattern that matches nothing contributes nothing. Resolved paths
    /// matching any ignore pattern are moved to
    /// [`BundleConfig::ignored`].
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is malformed, a match cannot be read,
    /// or `base_dir` is not valid UTF-8.
    pub fn resolve(&self, base_dir: &Path) -> Result<BundleConfig> {
        let ignore = self
            .ignore_paths
            .iter()
            .map(String::as_str)
            .map(compile)
            .collect::<Result<Vec<_>>>()?;

        let base = base_dir.to_str().ok_or_else(|| BundleError::NonUtf8Path {
            path: base_dir.to_path_buf(),
        })?;
        let escaped_base = Pattern::escape(base.trim_end_matches('/'));

        let mut resolved = BundleConfig::new(Vec::new(), self.command.clone());
        for pattern in &self.archive_paths {
            let relative = Path::new(pattern).is_relative();
            let full = if relative {
                format!("{escaped_base}/{pattern}")
            } else {
                pattern.clone()
            };

            let matches = glob::glob(&full).map_err(|source| BundleError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

            for found in matches {
                let found = found.map_err(|source| BundleError::Glob {
                    pattern: pattern.clone(),
                    source,
                })?;
                let path = if relative {
                    found
                        .strip_prefix(base_dir)
                        .map_or_else(|_| found.clone(), Path::to_path_buf)
                } else {
                    found
                };

                if ignore.iter().any(|ignored| ignored.matches_path(&path)) {
                    debug!(path = %path.display(), "ignoring path");
                    resolved.ignored.push(path);
                } else if pattern.ends_with('/') && base_dir.join(&path).is_dir() {
                    // Keeps the separator so the directory's contents land at the archive root
                    let mut spelled = path.into_os_string();
                    spelled.push("/");
                    resolved.sources.push(PathBuf::from(spelled));
                } else {
                    resolved.sources.push(path);
                }
            }
        }

        Ok(resolved)
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|source| BundleError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Resolved configuration consumed by the bundle assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleConfig {
    /// Source paths to archive, in order.
    pub sources: Vec<PathBuf>,

    /// Command to run after unpacking; may be empty.
    pub command: String,

    /// Paths removed by ignore patterns, reported for information only.
    pub ignored: Vec<PathBuf>,
}

impl BundleConfig {
    /// Creates a configuration with no ignored paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundler_core::BundleConfig;
    ///
    /// let config = BundleConfig::new(vec!["run.sh".into()], "./run.sh");
    /// assert_eq!(config.sources.len(), 1);
    /// assert!(config.ignored.is_empty());
    /// ```
    pub fn new<S: Into<String>>(sources: Vec<PathBuf>, command: S) -> Self {
        Self {
            sources,
            command: command.into(),
            ignored: Vec::new(),
        }
    }
}
