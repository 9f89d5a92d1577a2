//! Self-extracting bundle builder.
//!
//! `bundler-core` archives a list of files and directories into a
//! gzip-compressed TAR payload and prepends a bash bootstrap script that
//! unpacks the payload into a temporary directory and runs a command there.
//! The result is a single executable file.
//!
//! # Examples
//!
//! ```no_run
//! use bundler_core::BundleOptions;
//! use bundler_core::Bundler;
//! use bundler_core::NoopReporter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bundler = Bundler::from_config_file("app.yaml")?;
//! let report = bundler.bundle("app.bundle", &BundleOptions::default(), &mut NoopReporter)?;
//! println!("Bundled {} files", report.entries.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod bundle;
pub mod config;
pub mod error;
pub mod report;

pub use archive::ArchiveWriter;
pub use bundle::BundleOptions;
pub use bundle::Bundler;
pub use bundle::SENTINEL;
pub use bundle::render_bootstrap;
pub use config::BundleConfig;
pub use config::Config;
pub use error::BundleError;
pub use error::Result;
pub use report::BundleReport;
pub use report::EntryCounts;
pub use report::NoopReporter;
pub use report::Reporter;
