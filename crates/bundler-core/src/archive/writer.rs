//! Gzip-compressed TAR stream writer.

use crate::BundleError;
use crate::Result;
use crate::archive::entry::ArchiveEntry;
use crate::archive::entry::EntryKind;
use crate::archive::entry::metadata_error;
use crate::archive::naming;
use crate::archive::walker::TreeWalker;
use crate::report::EntryCounts;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tar::Builder;
use tracing::debug;

/// Wrapper writer that tracks bytes written for accurate compression reporting.
struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Append-only writer of a gzip-compressed TAR archive.
///
/// One writer owns one output stream. Entries are appended strictly in the
/// order they are archived and are never rewritten. The stream is only a
/// valid archive once [`finish`](Self::finish) or [`close`](Self::close)
/// has written the trailers.
///
/// # Examples
///
/// ```no_run
/// use bundler_core::archive::ArchiveWriter;
///
/// let mut writer = ArchiveWriter::create("payload.tar.gz")?;
/// writer.archive("config/app.yaml", true)?;
/// writer.archive("assets", false)?;
/// let counts = writer.close()?;
/// println!("{} files", counts.files_added);
/// # Ok::<(), bundler_core::BundleError>(())
/// ```
pub struct ArchiveWriter<W: Write> {
    builder: Builder<GzEncoder<CountingWriter<W>>>,
    base_dir: Option<PathBuf>,
    excluded: Vec<PathBuf>,
    counts: EntryCounts,
}

impl ArchiveWriter<File> {
    /// Creates a writer targeting a new archive file at `path`.
    ///
    /// An existing file is truncated.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| BundleError::Output {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ArchiveWriter<W> {
    /// Creates a writer streaming into `writer` with default compression.
    ///
    /// Relative sources are resolved against the process working directory
    /// unless [`with_base_dir`](Self::with_base_dir) is used.
    pub fn new(writer: W) -> Self {
        Self::with_compression(writer, Compression::default())
    }

    /// Creates a writer streaming into `writer` with the given gzip level.
    pub fn with_compression(writer: W, level: Compression) -> Self {
        let encoder = GzEncoder::new(CountingWriter::new(writer), level);
        Self {
            builder: Builder::new(encoder),
            base_dir: None,
            excluded: Vec::new(),
            counts: EntryCounts::default(),
        }
    }

    /// Resolves relative sources against `dir` instead of the working
    /// directory.
    #[must_use]
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.base_dir = Some(naming::normalize(&dir.into()));
        self
    }

    /// Leaves `path` out of every directory walk.
    ///
    /// `path` should be absolute; it is compared against the walked paths
    /// after lexical normalization.
    #[must_use]
    pub fn with_excluded<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.excluded.push(naming::normalize(path.as_ref()));
        self
    }

    /// Entry statistics so far.
    pub fn counts(&self) -> &EntryCounts {
        &self.counts
    }

    /// Archives one source path.
    ///
    /// - A directory, or any path when `preserve_path` is false, is walked
    ///   recursively. Names are relative to the path itself when the literal
    ///   `source` ends with a separator (its contents land at the archive
    ///   root), and relative to its parent otherwise (the path becomes a
    ///   named top-level entry).
    /// - A single file with `preserve_path` keeps its literal path as the
    ///   name, and every intermediate directory is archived as its own
    ///   entry first: `a/b/c.txt` writes `a/`, `a/b/` and `a/b/c.txt`.
    ///
    /// # Errors
    ///
    /// Any failure aborts the call and leaves the stream unusable as an
    /// archive:
    /// - the source does not exist or cannot be inspected
    /// - a path has a `..` segment
    /// - a directory cannot be walked or a file cannot be read
    /// - the output stream cannot be written
    pub fn archive<P: AsRef<Path>>(&mut self, source: P, preserve_path: bool) -> Result<()> {
        let source = source.as_ref();
        let absolute = self.absolute(source)?;

        let metadata = std::fs::metadata(&absolute).map_err(|e| metadata_error(source, e))?;

        if metadata.is_dir() || !preserve_path {
            let base = if naming::ends_with_separator(source) {
                absolute.clone()
            } else {
                absolute.parent().unwrap_or(&absolute).to_path_buf()
            };
            debug!(source = %source.display(), base = %base.display(), "walking source");

            let excluded = self.excluded.clone();
            let walker = TreeWalker::new(&absolute, &base).with_excluded(&excluded);
            for entry in walker.walk() {
                self.append(&entry?)?;
            }
        } else {
            debug!(source = %source.display(), "archiving source with its path");

            for (prefix, name) in naming::preserved_prefixes(source)? {
                let path = self.resolve(&prefix);
                let entry = ArchiveEntry::from_path(&path, &name)?;
                self.append(&entry)?;
            }
        }

        Ok(())
    }

    /// Writes the TAR trailer, then the gzip trailer, flushes the backing
    /// writer and returns it with the final statistics.
    pub fn finish(self) -> Result<(W, EntryCounts)> {
        let encoder = self.builder.into_inner()?;
        let mut counting = encoder.finish()?;
        counting.flush()?;

        let mut counts = self.counts;
        counts.bytes_compressed = counting.total_bytes();
        Ok((counting.into_inner(), counts))
    }

    /// Finishes the archive and releases the backing writer.
    pub fn close(self) -> Result<EntryCounts> {
        let (writer, counts) = self.finish()?;
        drop(writer);
        Ok(counts)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn absolute(&self, source: &Path) -> Result<PathBuf> {
        if source.as_os_str().is_empty() {
            return Err(BundleError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        let absolute = std::path::absolute(self.resolve(source)).map_err(|e| BundleError::Metadata {
            path: source.to_path_buf(),
            source: e,
        })?;
        Ok(naming::normalize(&absolute))
    }

    fn append(&mut self, entry: &ArchiveEntry) -> Result<()> {
        debug!(name = %entry.name, kind = entry.kind.as_str(), "adding entry");

        let mut header = entry.header();
        match &entry.kind {
            EntryKind::File => {
                let mut file = File::open(&entry.path).map_err(|source| BundleError::Read {
                    path: entry.path.clone(),
                    source,
                })?;
                self.builder
                    .append_data(&mut header, &entry.name, &mut file)
                    .map_err(|e| append_error(entry, &e))?;
                self.counts.files_added += 1;
                self.counts.bytes_written += entry.content_size();
            }
            EntryKind::Directory => {
                self.builder
                    .append_data(&mut header, &entry.name, std::io::empty())
                    .map_err(|e| append_error(entry, &e))?;
                self.counts.directories_added += 1;
            }
            EntryKind::Symlink { target } => {
                self.builder
                    .append_link(&mut header, &entry.name, target)
                    .map_err(|e| append_error(entry, &e))?;
                self.counts.symlinks_added += 1;
            }
        }

        Ok(())
    }
}

fn append_error(entry: &ArchiveEntry, err: &std::io::Error) -> BundleError {
    BundleError::Io(std::io::Error::new(
        err.kind(),
        format!("cannot append {} to archive: {err}", entry.path.display()),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    struct Listed {
        name: String,
        kind: tar::EntryType,
        link: Option<PathBuf>,
        content: Vec<u8>,
    }

    fn list(bytes: &[u8]) -> Vec<Listed> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
                let kind = entry.header().entry_type();
                let link = entry.link_name().unwrap().map(|l| l.into_owned());
                let mut content = Vec::new();
                entry.read_to_end(&mut content).unwrap();
                Listed {
                    name,
                    kind,
                    link,
                    content,
                }
            })
            .collect()
    }

    fn names(bytes: &[u8]) -> Vec<String> {
        list(bytes).into_iter().map(|entry| entry.name).collect()
    }

    fn build<F: FnOnce(&mut ArchiveWriter<Vec<u8>>)>(base: &Path, f: F) -> Vec<u8> {
        let mut writer = ArchiveWriter::new(Vec::new()).with_base_dir(base);
        f(&mut writer);
        writer.finish().unwrap().0
    }

    #[test]
    fn test_preserve_path_writes_every_prefix() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/c.txt"), "deep").unwrap();

        let bytes = build(temp.path(), |w| w.archive("a/b/c.txt", true).unwrap());
        let entries = list(&bytes);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a/", "a/b/", "a/b/c.txt"]);
        assert!(entries[0].kind.is_dir());
        assert!(entries[1].kind.is_dir());
        assert!(entries[2].kind.is_file());
        assert_eq!(entries[2].content, b"deep");
    }

    #[test]
    fn test_directory_named_after_itself() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dir/sub")).unwrap();
        fs::write(temp.path().join("dir/one.txt"), "1").unwrap();
        fs::write(temp.path().join("dir/sub/two.txt"), "2").unwrap();

        let bytes = build(temp.path(), |w| w.archive("dir", true).unwrap());
        assert_eq!(
            names(&bytes),
            ["dir/", "dir/one.txt", "dir/sub/", "dir/sub/two.txt"]
        );
    }

    #[test]
    fn test_directory_with_trailing_separator_puts_contents_at_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dir/sub")).unwrap();
        fs::write(temp.path().join("dir/one.txt"), "1").unwrap();
        fs::write(temp.path().join("dir/sub/two.txt"), "2").unwrap();

        let bytes = build(temp.path(), |w| w.archive("dir/", true).unwrap());
        assert_eq!(names(&bytes), ["./", "one.txt", "sub/", "sub/two.txt"]);
    }

    #[test]
    fn test_nested_directory_source_is_named_from_its_parent() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("outer/inner")).unwrap();
        fs::write(temp.path().join("outer/inner/x.txt"), "x").unwrap();

        let bytes = build(temp.path(), |w| w.archive("outer/inner", true).unwrap());
        assert_eq!(names(&bytes), ["inner/", "inner/x.txt"]);
    }

    #[test]
    fn test_file_without_preserve_uses_base_name() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("deep/er")).unwrap();
        fs::write(temp.path().join("deep/er/file.txt"), "f").unwrap();

        let bytes = build(temp.path(), |w| w.archive("deep/er/file.txt", false).unwrap());
        assert_eq!(names(&bytes), ["file.txt"]);
    }

    #[test]
    fn test_every_file_appears_once() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("tree");
        for dir in ["x", "x/y", "z"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        for file in ["top.txt", "x/a.txt", "x/y/b.txt", "z/c.txt"] {
            fs::write(root.join(file), file).unwrap();
        }

        let bytes = build(temp.path(), |w| w.archive("tree", true).unwrap());
        let entries = list(&bytes);

        for file in ["top.txt", "x/a.txt", "x/y/b.txt", "z/c.txt"] {
            let name = format!("tree/{file}");
            let matching: Vec<_> = entries.iter().filter(|e| e.name == name).collect();
            assert_eq!(matching.len(), 1, "{name} should appear exactly once");
            assert_eq!(matching[0].content, file.as_bytes());
        }
        assert!(
            entries
                .iter()
                .all(|e| !e.name.split('/').any(|segment| segment == ".."))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_stored_not_followed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("pkg")).unwrap();
        fs::write(temp.path().join("pkg/real.txt"), "real content").unwrap();
        std::os::unix::fs::symlink("real.txt", temp.path().join("pkg/alias.txt")).unwrap();

        let bytes = build(temp.path(), |w| w.archive("pkg", true).unwrap());
        let entries = list(&bytes);

        let alias = entries.iter().find(|e| e.name == "pkg/alias.txt").unwrap();
        assert!(alias.kind.is_symlink());
        assert_eq!(alias.link.as_deref(), Some(Path::new("real.txt")));
        assert!(alias.content.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_preserved_symlink_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("bin")).unwrap();
        fs::write(temp.path().join("bin/tool-1.0"), "tool").unwrap();
        std::os::unix::fs::symlink("tool-1.0", temp.path().join("bin/tool")).unwrap();

        let bytes = build(temp.path(), |w| w.archive("bin/tool", true).unwrap());
        let entries = list(&bytes);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "bin/");
        assert_eq!(entries[1].name, "bin/tool");
        assert!(entries[1].kind.is_symlink());
        assert_eq!(entries[1].link.as_deref(), Some(Path::new("tool-1.0")));
    }

    #[test]
    fn test_parent_segment_is_fatal() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir(&work).unwrap();
        fs::write(temp.path().join("outside.txt"), "nope").unwrap();

        let mut writer = ArchiveWriter::new(Vec::new()).with_base_dir(&work);
        let err = writer.archive("../outside.txt", true).unwrap_err();
        assert!(matches!(err, BundleError::ParentTraversal { .. }));
    }

    #[test]
    fn test_parent_spelled_directory_is_walked_cleanly() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir(&work).unwrap();
        fs::create_dir(temp.path().join("shared")).unwrap();
        fs::write(temp.path().join("shared/lib.sh"), "lib").unwrap();

        let bytes = build(&work, |w| w.archive("../shared", true).unwrap());
        assert_eq!(names(&bytes), ["shared/", "shared/lib.sh"]);
    }

    #[test]
    fn test_excluded_path_is_left_out_of_walks() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("app")).unwrap();
        fs::write(temp.path().join("app/run.sh"), "run").unwrap();
        fs::write(temp.path().join("app/out.bundle"), "old").unwrap();

        let mut writer = ArchiveWriter::new(Vec::new())
            .with_base_dir(temp.path())
            .with_excluded(temp.path().join("app/out.bundle"));
        writer.archive("app", true).unwrap();
        let bytes = writer.finish().unwrap().0;

        assert_eq!(names(&bytes), ["app/", "app/run.sh"]);
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(Vec::new()).with_base_dir(temp.path());

        let err = writer.archive("absent.txt", true).unwrap_err();
        assert!(matches!(err, BundleError::SourceNotFound { .. }));

        let err = writer.archive("", true).unwrap_err();
        assert!(matches!(err, BundleError::SourceNotFound { .. }));
    }

    #[test]
    fn test_entries_follow_call_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("z.txt"), "z").unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();

        let bytes = build(temp.path(), |w| {
            w.archive("z.txt", true).unwrap();
            w.archive("a.txt", true).unwrap();
        });
        assert_eq!(names(&bytes), ["z.txt", "a.txt"]);
    }

    #[test]
    fn test_counts() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("d")).unwrap();
        fs::write(temp.path().join("d/f1"), "12345").unwrap();
        fs::write(temp.path().join("d/f2"), "678").unwrap();

        let mut writer = ArchiveWriter::new(Vec::new()).with_base_dir(temp.path());
        writer.archive("d", true).unwrap();
        assert_eq!(writer.counts().files_added, 2);

        let (bytes, counts) = writer.finish().unwrap();
        assert_eq!(counts.files_added, 2);
        assert_eq!(counts.directories_added, 1);
        assert_eq!(counts.symlinks_added, 0);
        assert_eq!(counts.bytes_written, 8);
        assert_eq!(counts.bytes_compressed, bytes.len() as u64);
    }

    #[test]
    fn test_create_writes_gzip_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("in.txt"), "a".repeat(1000)).unwrap();
        let output = temp.path().join("scratch.tar.gz");

        let mut writer = ArchiveWriter::create(&output)
            .unwrap()
            .with_base_dir(temp.path());
        writer.archive("in.txt", true).unwrap();
        let counts = writer.close().unwrap();

        let data = fs::read(&output).unwrap();
        assert_eq!(&data[0..2], &[0x1f, 0x8b]); // gzip magic bytes
        assert_eq!(counts.bytes_compressed, data.len() as u64);
        assert_eq!(names(&data), ["in.txt"]);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let writer = ArchiveWriter::new(Vec::new());
        let (bytes, counts) = writer.finish().unwrap();
        assert_eq!(counts.total_entries(), 0);
        assert!(names(&bytes).is_empty());
    }

    #[test]
    fn test_compression_level() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("big.txt"), "b".repeat(100_000)).unwrap();

        let mut fast =
            ArchiveWriter::with_compression(Vec::new(), Compression::none()).with_base_dir(temp.path());
        fast.archive("big.txt", true).unwrap();
        let (stored, _) = fast.finish().unwrap();

        let mut best =
            ArchiveWriter::with_compression(Vec::new(), Compression::best()).with_base_dir(temp.path());
        best.archive("big.txt", true).unwrap();
        let (compressed, _) = best.finish().unwrap();

        assert!(compressed.len() < stored.len());
    }
}
