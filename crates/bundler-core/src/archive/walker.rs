//! Directory tree walking for archive creation.

use crate::BundleError;
use crate::Result;
use crate::archive::entry::ArchiveEntry;
use crate::archive::naming;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Walks a filesystem tree and yields one [`ArchiveEntry`] per object.
///
/// The walk:
/// - visits the root first, and every directory before its contents
/// - never follows symlinks, not even when the root is one
/// - visits siblings sorted by file name, so output is deterministic
/// - names each entry relative to `base`
///
/// # Examples
///
/// ```no_run
/// use bundler_core::archive::walker::TreeWalker;
/// use std::path::Path;
///
/// let walker = TreeWalker::new(Path::new("/srv/app"), Path::new("/srv"));
/// for entry in walker.walk() {
///     let entry = entry?;
///     println!("{}", entry.name);
/// }
/// # Ok::<(), bundler_core::BundleError>(())
/// ```
pub struct TreeWalker<'a> {
    root: &'a Path,
    base: &'a Path,
    excluded: &'a [PathBuf],
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker over `root`, naming entries relative to `base`.
    ///
    /// `base` must be `root` itself or one of its ancestors.
    #[must_use]
    pub fn new(root: &'a Path, base: &'a Path) -> Self {
        Self {
            root,
            base,
            excluded: &[],
        }
    }

    /// Skips the given paths, and everything below them, during the walk.
    ///
    /// Paths are compared exactly, so they must be spelled the way the walk
    /// produces them (absolute and normalized when the root is).
    #[must_use]
    pub fn with_excluded(mut self, excluded: &'a [PathBuf]) -> Self {
        self.excluded = excluded;
        self
    }

    /// Returns an iterator over the entries of the tree.
    ///
    /// # Errors
    ///
    /// Items are errors if:
    /// - a directory cannot be read
    /// - an entry cannot be inspected (see [`ArchiveEntry::from_path`])
    /// - a name cannot be represented as UTF-8
    pub fn walk(&self) -> impl Iterator<Item = Result<ArchiveEntry>> + '_ {
        WalkDir::new(self.root)
            .follow_links(false)
            .follow_root_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.excluded.iter().any(|p| p == entry.path()))
            .map(move |entry| {
                let entry = entry.map_err(|source| BundleError::Walk {
                    path: source
                        .path()
                        .map_or_else(|| self.root.to_path_buf(), Path::to_path_buf),
                    source,
                })?;
                let name = naming::relative_name(entry.path(), self.base)?;
                ArchiveEntry::from_path(entry.path(), &name)
            })
    }
}
