//! Archive entries built from filesystem objects.

use crate::BundleError;
use crate::Result;
use crate::archive::naming;
use std::fs::Metadata;
use std::path::Path;
use std::path::PathBuf;
use tar::Header;

/// Kind of filesystem object stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file; its content follows the header.
    File,

    /// Directory; header only.
    Directory,

    /// Symbolic link; header only, the link itself is stored.
    Symlink {
        /// Target of the symlink, exactly as read from the link.
        target: PathBuf,
    },
}

impl EntryKind {
    /// Short lowercase label used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink { .. } => "symlink",
        }
    }
}

/// One filesystem object ready to be appended to an archive.
///
/// Entries are built and consumed one at a time while archiving; nothing
/// keeps them around afterwards.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Filesystem path the entry was read from.
    pub path: PathBuf,

    /// Name inside the archive: relative, `/`-separated, directories end
    /// with `/`.
    pub name: String,

    /// What kind of object this is.
    pub kind: EntryKind,

    /// Metadata of the object itself (symlinks are not followed).
    pub metadata: Metadata,
}

impl ArchiveEntry {
    /// Reads the object at `path` and prepares it under the given archive
    /// name.
    ///
    /// Directory names get a trailing `/`. A regular file whose computed
    /// name is `.` (a lone top-level file) is named after its base name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` or `name` has a `..` segment
    /// - the object cannot be inspected or its link target cannot be read
    /// - the object is not a file, directory or symlink
    pub fn from_path(path: &Path, name: &str) -> Result<Self> {
        if naming::has_parent_segment(path) || naming::name_has_parent_segment(name) {
            return Err(BundleError::ParentTraversal {
                path: path.to_path_buf(),
            });
        }

        let metadata = std::fs::symlink_metadata(path).map_err(|e| metadata_error(path, e))?;
        let file_type = metadata.file_type();

        let kind = if file_type.is_symlink() {
            let target = std::fs::read_link(path).map_err(|source| BundleError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            EntryKind::Symlink { target }
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            return Err(BundleError::UnsupportedFileType {
                path: path.to_path_buf(),
            });
        };

        let mut name = name.to_string();
        if kind == EntryKind::Directory && !name.ends_with('/') {
            name.push('/');
        }
        if kind == EntryKind::File && name == "." {
            name = path
                .file_name()
                .and_then(|base| base.to_str())
                .ok_or_else(|| BundleError::NonUtf8Path {
                    path: path.to_path_buf(),
                })?
                .to_string();
        }

        Ok(Self {
            path: path.to_path_buf(),
            name,
            kind,
            metadata,
        })
    }

    /// Size of the content that follows the header.
    #[must_use]
    pub fn content_size(&self) -> u64 {
        match self.kind {
            EntryKind::File => self.metadata.len(),
            EntryKind::Directory | EntryKind::Symlink { .. } => 0,
        }
    }

    /// Builds the TAR header for this entry.
    ///
    /// Path, link name and checksum are filled in when the entry is
    /// appended.
    #[must_use]
    pub fn header(&self) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(match self.kind {
            EntryKind::File => tar::EntryType::Regular,
            EntryKind::Directory => tar::EntryType::Directory,
            EntryKind::Symlink { .. } => tar::EntryType::Symlink,
        });
        header.set_size(self.content_size());
        set_permissions(&mut header, &self.metadata);
        header
    }
}

/// Maps a failed `stat` to a typed error, keeping "not found" distinct.
pub(crate) fn metadata_error(path: &Path, source: std::io::Error) -> BundleError {
    if source.kind() == std::io::ErrorKind::NotFound {
        BundleError::SourceNotFound {
            path: path.to_path_buf(),
        }
    } else {
        BundleError::Metadata {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Sets mode, ownership and mtime in the TAR header from metadata.
#[cfg(unix)]
fn set_permissions(header: &mut Header, metadata: &Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(metadata.mode() & 0o7777);
    header.set_uid(u64::from(metadata.uid()));
    header.set_gid(u64::from(metadata.gid()));
    // mtime can be negative for dates before epoch, clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_permissions(header: &mut Header, metadata: &Metadata) {
    let mode = if metadata.is_dir() {
        0o755
    } else if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    header.set_mode(mode);

    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}
