//! Builds the self-extracting bundle executable.

use crate::BundleError;
use crate::Result;
use crate::archive::ArchiveWriter;
use crate::archive::naming;
use crate::bundle::template::render_bootstrap;
use crate::config::BundleConfig;
use crate::config::Config;
use crate::report::BundleReport;
use crate::report::Reporter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing::info;

/// Options for a single bundle build.
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    /// Report each source before it is archived, and every ignored path.
    pub verbose: bool,
}

/// Assembles a bootstrap script and the archived sources into one
/// executable file.
///
/// # Examples
///
/// ```no_run
/// use bundler_core::BundleConfig;
/// use bundler_core::BundleOptions;
/// use bundler_core::Bundler;
/// use bundler_core::NoopReporter;
///
/// let config = BundleConfig::new(vec!["run.sh".into(), "data".into()], "./run.sh");
/// let report = Bundler::new(config)
///     .with_base_dir("/srv/app")
///     .bundle("/tmp/app.bundle", &BundleOptions::default(), &mut NoopReporter)?;
/// println!("{} entries", report.entries.total_entries());
/// # Ok::<(), bundler_core::BundleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Bundler {
    config: BundleConfig,
    base_dir: Option<PathBuf>,
}

impl Bundler {
    /// Creates a bundler for an already resolved configuration.
    pub fn new(config: BundleConfig) -> Self {
        Self {
            config,
            base_dir: None,
        }
    }

    /// Loads a configuration file and resolves its patterns against the
    /// current working directory.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::from_file(path)?;
        let cwd = std::env::current_dir()?;
        let resolved = config.resolve(&cwd)?;
        Ok(Self::new(resolved).with_base_dir(cwd))
    }

    /// Resolves relative sources against `dir` instead of the working
    /// directory.
    #[must_use]
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// The configuration this bundler builds from.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Writes the bundle executable to `output`.
    ///
    /// The bootstrap script and the payload are streamed into a staging
    /// file next to `output`. Once the archive trailers are written the
    /// staging file is synced, made executable (mode 0755) and renamed onto
    /// `output`. Every source is archived with its path preserved.
    ///
    /// # Errors
    ///
    /// Any failure aborts the build. The staging file is removed and
    /// `output` is neither created nor replaced.
    pub fn bundle<P: AsRef<Path>>(
        &self,
        output: P,
        options: &BundleOptions,
        reporter: &mut dyn Reporter,
    ) -> Result<BundleReport> {
        let start = Instant::now();
        let output = output.as_ref();
        let output_error = |source: std::io::Error| BundleError::Output {
            path: output.to_path_buf(),
            source,
        };

        let directory = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staging = tempfile::Builder::new()
            .prefix(".bundler-")
            .suffix(".partial")
            .tempfile_in(directory)
            .map_err(output_error)?;
        debug!(staging = %staging.path().display(), "created staging file");

        let script = render_bootstrap(&self.config.command);
        staging
            .write_all(script.as_bytes())
            .map_err(output_error)?;

        let staging_path = absolute_for(staging.path(), output)?;
        let output_path = absolute_for(output, output)?;

        let mut writer = ArchiveWriter::new(staging.as_file_mut())
            .with_excluded(&staging_path)
            .with_excluded(&output_path);
        if let Some(base) = &self.base_dir {
            writer = writer.with_base_dir(base);
        }

        let total = self.config.sources.len();
        if total == 0 {
            reporter.warn("no paths to archive, the bundle payload is empty");
        }
        for (index, source) in self.config.sources.iter().enumerate() {
            if options.verbose {
                reporter.notice(&format!("archiving {}", source.display()));
            }
            reporter.on_source_start(source, total, index + 1);
            writer.archive(source, true)?;
            reporter.on_source_complete(source);
        }

        if options.verbose {
            for ignored in &self.config.ignored {
                reporter.warn(&format!("ignored {}", ignored.display()));
            }
        }

        let (file, entries) = writer.finish()?;
        file.sync_all().map_err(output_error)?;
        set_executable(file).map_err(output_error)?;
        let bundle_size = file.metadata().map_err(output_error)?.len();

        staging
            .persist(output)
            .map_err(|e| output_error(e.error))?;

        let payload_offset = script.len() as u64;
        info!(
            output = %output.display(),
            payload_offset,
            payload_size = bundle_size - payload_offset,
            "bundle written"
        );

        Ok(BundleReport {
            output: output.to_path_buf(),
            sources: self.config.sources.clone(),
            ignored: self.config.ignored.clone(),
            entries,
            payload_offset,
            bundle_size,
            duration: start.elapsed(),
        })
    }
}

/// Absolute, normalized form of `path`; failures are reported against the
/// bundle being written.
fn absolute_for(path: &Path, output: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|source| BundleError::Output {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(naming::normalize(&absolute))
}

#[cfg(unix)]
fn set_executable(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}
