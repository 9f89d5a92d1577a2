//! In-archive name computation.
//!
//! Names inside the archive are always relative and separated by `/`,
//! whatever the host path conventions are. The payload is unpacked by a
//! POSIX shell, so literal source paths are split the POSIX way too.

use crate::BundleError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Returns `true` if any segment of `path` is `..`.
///
/// Only whole segments count: `a..b` is an ordinary file name.
///
/// # Examples
///
/// ```
/// use bundler_core::archive::naming::has_parent_segment;
/// use std::path::Path;
///
/// assert!(has_parent_segment(Path::new("../etc/passwd")));
/// assert!(has_parent_segment(Path::new("a/../b")));
/// assert!(!has_parent_segment(Path::new("a..b/c")));
/// ```
#[must_use]
pub fn has_parent_segment(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

/// Returns `true` if a `/`-separated archive name has a `..` segment.
#[must_use]
pub fn name_has_parent_segment(name: &str) -> bool {
    name.split('/').any(|segment| segment == "..")
}

/// Lexically normalizes a path: drops `.` segments and folds `..` into its
/// parent.
///
/// No filesystem access happens, so symlinks are not taken into account.
/// A `..` that would climb above the root of an absolute path is dropped;
/// on a relative path it is kept.
///
/// # Examples
///
/// ```
/// use bundler_core::archive::naming::normalize;
/// use std::path::Path;
///
/// assert_eq!(normalize(Path::new("/work/./app/../dist")), Path::new("/work/dist"));
/// assert_eq!(normalize(Path::new("/..")), Path::new("/"));
/// assert_eq!(normalize(Path::new("../lib")), Path::new("../lib"));
/// ```
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(segment) => {
                normalized.push(segment);
                depth += 1;
            }
        }
    }

    normalized
}

/// Converts a relative path into a `/`-separated archive name.
///
/// The empty path becomes `.`.
pub fn to_slash(relative: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| BundleError::NonUtf8Path {
                    path: relative.to_path_buf(),
                })?;
                segments.push(segment);
            }
            Component::ParentDir => segments.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if segments.is_empty() {
        return Ok(".".to_string());
    }
    Ok(segments.join("/"))
}

/// Computes the archive name of `path` relative to `base`.
///
/// # Errors
///
/// Returns an error if `path` is not under `base` or is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use bundler_core::archive::naming::relative_name;
/// use std::path::Path;
///
/// let name = relative_name(Path::new("/srv/app/lib/util.sh"), Path::new("/srv")).unwrap();
/// assert_eq!(name, "app/lib/util.sh");
///
/// let name = relative_name(Path::new("/srv/app"), Path::new("/srv/app")).unwrap();
/// assert_eq!(name, ".");
/// ```
pub fn relative_name(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| {
        BundleError::Io(std::io::Error::other(format!(
            "path {} is not under {}",
            path.display(),
            base.display()
        )))
    })?;
    to_slash(relative)
}

/// Splits a literal source path into the prefixes that are archived one by
/// one when the path is preserved.
///
/// Each item is the filesystem path of the prefix and its archive name, so
/// `a/b/c.txt` yields `a`, `a/b` and `a/b/c.txt`. Empty and `.` segments are
/// skipped. A leading `/` stays part of the filesystem path but never of the
/// archive name.
///
/// # Errors
///
/// Returns [`BundleError::ParentTraversal`] if the path has a `..` segment
/// and [`BundleError::NonUtf8Path`] if a segment is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use bundler_core::archive::naming::preserved_prefixes;
/// use std::path::Path;
///
/// let prefixes = preserved_prefixes(Path::new("a/b/c.txt")).unwrap();
/// let names: Vec<_> = prefixes.iter().map(|(_, name)| name.as_str()).collect();
/// assert_eq!(names, ["a", "a/b", "a/b/c.txt"]);
///
/// assert!(preserved_prefixes(Path::new("../c.txt")).is_err());
/// ```
pub fn preserved_prefixes(source: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut prefixes = Vec::new();
    let mut fs_path = PathBuf::new();
    let mut name = String::new();

    for component in source.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => fs_path.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(BundleError::ParentTraversal {
                    path: source.to_path_buf(),
                });
            }
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| BundleError::NonUtf8Path {
                    path: source.to_path_buf(),
                })?;
                fs_path.push(segment);
                if !name.is_empty() {
                    name.push('/');
                }
                name.push_str(segment);
                prefixes.push((fs_path.clone(), name.clone()));
            }
        }
    }

    Ok(prefixes)
}

/// Returns `true` if the literal path ends with a separator, meaning the
/// caller wants the directory contents at the archive root.
#[must_use]
pub fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&byte| std::path::is_separator(char::from(byte)))
}
