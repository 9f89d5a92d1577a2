//! Error types for archiving and bundle assembly.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `BundleError`.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Errors that can occur while resolving, archiving or assembling a bundle.
///
/// Every failure is fatal for the bundle being built. Variants carry the
/// path or pattern that failed so the caller can report it.
#[derive(Error, Debug)]
pub enum BundleError {
    /// I/O operation failed without a more specific context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source path does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// File metadata could not be read.
    #[error("cannot read metadata for {path}: {source}")]
    Metadata {
        /// The path being inspected.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File content or symlink target could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("cannot walk {path}: {source}")]
    Walk {
        /// The directory being walked.
        path: PathBuf,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// Path contains a `..` segment.
    #[error("path cannot contain a relative marker of '..': {path}")]
    ParentTraversal {
        /// The offending path.
        path: PathBuf,
    },

    /// Filesystem object is neither a regular file, a directory nor a symlink.
    #[error("unsupported file type: {path}")]
    UnsupportedFileType {
        /// The offending path.
        path: PathBuf,
    },

    /// Path cannot be represented as UTF-8 in the archive.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// Configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        /// The configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML for the expected schema.
    #[error("invalid config: {source}")]
    ConfigParse {
        /// Underlying parse error.
        #[from]
        source: serde_yaml::Error,
    },

    /// Glob pattern is malformed.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern text.
        pattern: String,
        /// Underlying pattern error.
        #[source]
        source: glob::PatternError,
    },

    /// A path matched by a glob pattern could not be read.
    #[error("cannot resolve pattern '{pattern}': {source}")]
    Glob {
        /// The pattern being expanded.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: glob::GlobError,
    },

    /// Bundle output could not be created, written or published.
    #[error("cannot write bundle {path}: {source}")]
    Output {
        /// The output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File is not a bundle or its payload is unreadable.
    #[error("invalid bundle {path}: {reason}")]
    InvalidPayload {
        /// The bundle path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
}

impl BundleError {
    /// Returns `true` if this error came from loading or resolving
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundler_core::BundleError;
    ///
    /// let err = BundleError::ConfigRead {
    ///     path: "bundle.yaml".into(),
    ///     source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    /// };
    /// assert!(err.is_config_error());
    /// assert!(!err.is_output_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::Pattern { .. }
                | Self::Glob { .. }
        )
    }

    /// Returns `true` if this error came from archiving a source.
    #[must_use]
    pub const fn is_archive_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::Metadata { .. }
                | Self::Read { .. }
                | Self::Walk { .. }
                | Self::ParentTraversal { .. }
                | Self::UnsupportedFileType { .. }
                | Self::NonUtf8Path { .. }
        )
    }

    /// Returns `true` if this error came from writing the bundle itself.
    #[must_use]
    pub const fn is_output_error(&self) -> bool {
        matches!(self, Self::Output { .. })
    }

    /// Returns the path the failure is about, if known.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundler_core::BundleError;
    /// use std::path::Path;
    ///
    /// let err = BundleError::ParentTraversal {
    ///     path: "../secret.txt".into(),
    /// };
    /// assert_eq!(err.path(), Some(Path::new("../secret.txt")));
    /// ```
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceNotFound { path }
            | Self::Metadata { path, .. }
            | Self::Read { path, .. }
            | Self::Walk { path, .. }
            | Self::ParentTraversal { path }
            | Self::UnsupportedFileType { path }
            | Self::NonUtf8Path { path }
            | Self::ConfigRead { path, .. }
            | Self::Output { path, .. }
            | Self::InvalidPayload { path, .. } => Some(path),
            Self::Glob { source, .. } => Some(source.path()),
            Self::Io(_) | Self::ConfigParse { .. } | Self::Pattern { .. } => None,
        }
    }
}
