//! Bundle assembler.
//!
//! A bundle is a bash bootstrap script, a sentinel line, and a
//! gzip-compressed TAR payload, concatenated into one executable file.

pub mod assembler;
pub mod payload;
pub mod template;

pub use assembler::BundleOptions;
pub use assembler::Bundler;
pub use template::SENTINEL;
pub use template::render_bootstrap;
