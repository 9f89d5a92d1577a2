//! Progress reporting and bundle statistics.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Receives user-facing messages and progress while a bundle is built.
///
/// The library never prints; the caller decides how (or whether) to show
/// these.
///
/// # Examples
///
/// ```
/// use bundler_core::Reporter;
///
/// #[derive(Default)]
/// struct Collect(Vec<String>);
///
/// impl Reporter for Collect {
///     fn notice(&mut self, message: &str) {
///         self.0.push(message.to_string());
///     }
///
///     fn warn(&mut self, message: &str) {
///         self.0.push(format!("warning: {message}"));
///     }
/// }
///
/// let mut reporter = Collect::default();
/// reporter.notice("archiving a.txt");
/// assert_eq!(reporter.0, ["archiving a.txt"]);
/// ```
pub trait Reporter {
    /// Informational message, such as the source about to be archived.
    fn notice(&mut self, message: &str);

    /// Something worth the user's attention that does not stop the build.
    fn warn(&mut self, message: &str);

    /// Called before each source is archived. `current` is 1-based.
    fn on_source_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    /// Called after a source has been archived.
    fn on_source_complete(&mut self, _path: &Path) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn notice(&mut self, _message: &str) {}

    fn warn(&mut self, _message: &str) {}
}

/// Counts of entries written to an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryCounts {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of directories added.
    pub directories_added: usize,

    /// Number of symlinks added.
    pub symlinks_added: usize,

    /// Total file content written (uncompressed).
    pub bytes_written: u64,

    /// Total bytes of the compressed stream.
    pub bytes_compressed: u64,
}

impl EntryCounts {
    /// Number of entries of every kind.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added
    }
}

/// Outcome of a successful bundle build.
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Path of the bundle executable.
    pub output: PathBuf,

    /// Sources archived, in order.
    pub sources: Vec<PathBuf>,

    /// Paths left out by ignore patterns.
    pub ignored: Vec<PathBuf>,

    /// Entry statistics of the payload.
    pub entries: EntryCounts,

    /// Byte offset where the payload starts (length of the bootstrap).
    pub payload_offset: u64,

    /// Total size of the bundle executable.
    pub bundle_size: u64,

    /// Duration of the build.
    pub duration: Duration,
}

impl BundleReport {
    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundler_core::BundleReport;
    /// use bundler_core::EntryCounts;
    ///
    /// let report = BundleReport {
    ///     output: "app.bundle".into(),
    ///     sources: vec![],
    ///     ignored: vec![],
    ///     entries: EntryCounts {
    ///         bytes_written: 1000,
    ///         bytes_compressed: 250,
    ///         ..EntryCounts::default()
    ///     },
    ///     payload_offset: 400,
    ///     bundle_size: 650,
    ///     duration: std::time::Duration::ZERO,
    /// };
    /// assert_eq!(report.compression_ratio(), 4.0);
    /// assert_eq!(report.compression_percentage(), 75.0);
    /// ```
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.entries.bytes_compressed == 0 || self.entries.bytes_written == 0 {
            return 0.0;
        }
        self.entries.bytes_written as f64 / self.entries.bytes_compressed as f64
    }

    /// Returns the compression percentage (space saved).
    ///
    /// Returns 0.0 if nothing was written and 100.0 if the compressed size
    /// is 0.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.entries.bytes_written == 0 {
            return 0.0;
        }
        if self.entries.bytes_compressed == 0 {
            return 100.0;
        }
        let ratio = self.entries.bytes_compressed as f64 / self.entries.bytes_written as f64;
        (1.0 - ratio) * 100.0
    }

    /// Returns whether any configured path was left out.
    #[must_use]
    pub fn has_ignored(&self) -> bool {
        !self.ignored.is_empty()
    }
}
