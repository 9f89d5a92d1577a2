//! Archive writer.
//!
//! Turns source paths into entries of a gzip-compressed TAR stream with
//! relative, `/`-separated names.

pub mod entry;
pub mod naming;
pub mod walker;
pub mod writer;

pub use entry::ArchiveEntry;
pub use entry::EntryKind;
pub use walker::TreeWalker;
pub use writer::ArchiveWriter;
