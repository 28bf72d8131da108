//! Document sources.
//!
//! A [`Source`] resolves paths to document text and lists directories. The
//! parser and collection loader never touch the filesystem directly; they go
//! through a [`Sources`] chain that asks each source in order and takes the
//! first hit. This lets documents bundled into the binary (see
//! [`RustEmbedSource`]) shadow files on disk.

use std::io;
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rust_embed::RustEmbed;

/// Error accessing a source.
#[derive(Debug, thiserror::Error)]
#[error("Failed to access {} in {source_name} source: {error}", path.display())]
pub struct SourceError {
    /// Name of the source that failed.
    pub source_name: &'static str,
    /// Path being accessed.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub error: io::Error,
}

/// A place documents can be read from.
///
/// Both methods return `Ok(None)` when the path is not known to this source,
/// so the next source in a [`Sources`] chain gets a chance.
pub trait Source: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Read a document's text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the path exists but cannot be read.
    fn read(&self, path: &Path) -> Result<Option<String>, SourceError>;

    /// List the files directly inside a directory, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the directory exists but cannot be listed.
    fn list(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, SourceError>;
}

/// Filesystem source.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl FsSource {
    fn error(path: &Path, error: io::Error) -> SourceError {
        SourceError {
            source_name: "filesystem",
            path: path.to_path_buf(),
            error,
        }
    }
}

impl Source for FsSource {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn read(&self, path: &Path) -> Result<Option<String>, SourceError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::error(path, e)),
        }
    }

    fn list(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, SourceError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::error(dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::error(dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| Self::error(&entry.path(), e))?
                .is_file();
            if is_file {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(Some(files))
    }
}

/// Source backed by a folder compiled into the binary with `rust-embed`.
///
/// Embedded files are keyed by their path relative to the embedded folder.
/// A lookup path is made relative by stripping the configured root (the
/// directory the folder mirrors on disk, usually the site directory); paths
/// outside the root are never found here. Listings are non-recursive.
///
/// ```ignore
/// #[derive(rust_embed::RustEmbed)]
/// #[folder = "bundled/"]
/// struct Bundled;
///
/// let sources = Sources::empty()
///     .with(RustEmbedSource::<Bundled>::new().with_root(site_dir))
///     .with(FsSource);
/// ```
pub struct RustEmbedSource<E> {
    root: PathBuf,
    assets: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> RustEmbedSource<E> {
    /// Create a source whose keys are looked up relative to the working
    /// directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::new(),
            assets: PhantomData,
        }
    }

    /// Set the directory the embedded folder stands in for.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Embedded key for a lookup path, `/`-separated.
    fn key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("/"))
    }
}

impl<E: RustEmbed> Default for RustEmbedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for RustEmbedSource<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustEmbedSource")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<E: RustEmbed> Source for RustEmbedSource<E> {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn read(&self, path: &Path) -> Result<Option<String>, SourceError> {
        let Some(file) = self.key(path).and_then(|key| E::get(&key)) else {
            return Ok(None);
        };
        String::from_utf8(file.data.into_owned())
            .map(Some)
            .map_err(|e| SourceError {
                source_name: "embedded",
                path: path.to_path_buf(),
                error: io::Error::new(io::ErrorKind::InvalidData, e),
            })
    }

    fn list(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, SourceError> {
        let Some(key) = self.key(dir) else {
            return Ok(None);
        };
        let prefix = if key.is_empty() { key } else { format!("{key}/") };

        let mut files: Vec<PathBuf> = E::iter()
            .filter_map(|name| {
                let rest = name.strip_prefix(prefix.as_str())?;
                (!rest.contains('/')).then(|| dir.join(rest))
            })
            .collect();
        if files.is_empty() {
            return Ok(None);
        }
        files.sort();
        Ok(Some(files))
    }
}

/// Ordered chain of sources; the first source that knows a path wins.
#[derive(Clone)]
pub struct Sources {
    chain: Vec<Arc<dyn Source>>,
}

impl Sources {
    /// Create an empty chain.
    #[must_use]
    pub fn empty() -> Self {
        Self { chain: Vec::new() }
    }

    /// Append a source to the end of the chain.
    #[must_use]
    pub fn with(mut self, source: impl Source + 'static) -> Self {
        self.chain.push(Arc::new(source));
        self
    }

    /// Read a document from the first source that has it.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] encountered.
    pub fn read(&self, path: &Path) -> Result<Option<String>, SourceError> {
        for source in &self.chain {
            if let Some(text) = source.read(path)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    /// List a directory from the first source that has it.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] encountered.
    pub fn list(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, SourceError> {
        for source in &self.chain {
            if let Some(files) = source.list(dir)? {
                return Ok(Some(files));
            }
        }
        Ok(None)
    }

    /// Names of the sources, in lookup order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|s| s.name()).collect()
    }
}

impl Default for Sources {
    /// Filesystem only.
    fn default() -> Self {
        Self::empty().with(FsSource)
    }
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources")
            .field("chain", &self.names())
            .finish()
    }
}

/// In-memory source for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct MemorySource {
    files: std::collections::BTreeMap<PathBuf, String>,
}

#[cfg(test)]
impl MemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

#[cfg(test)]
impl Source for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, path: &Path) -> Result<Option<String>, SourceError> {
        Ok(self.files.get(path).cloned())
    }

    fn list(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, SourceError> {
        let files: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect();
        Ok((!files.is_empty()).then_some(files))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Documents under `testdata/bundled`, embedded at compile time.
    #[derive(rust_embed::RustEmbed)]
    #[folder = "testdata/bundled/"]
    pub(crate) struct Bundled;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_fs_read_missing_is_none() {
        let dir = create_test_dir();
        let result = FsSource.read(&dir.path().join("nope.md")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_fs_read_existing() {
        let dir = create_test_dir();
        let path = dir.path().join("a.md");
        fs::write(&path, "hello").unwrap();
        assert_eq!(FsSource.read(&path).unwrap(), Some("hello".to_owned()));
    }

    #[test]
    fn test_fs_list_files_only_sorted() {
        let dir = create_test_dir();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.md"), "").unwrap();

        let files = FsSource.list(dir.path()).unwrap().unwrap();
        assert_eq!(files, vec![dir.path().join("a.md"), dir.path().join("b.md")]);
    }

    #[test]
    fn test_fs_list_missing_is_none() {
        let dir = create_test_dir();
        assert!(FsSource.list(&dir.path().join("missing")).unwrap().is_none());
    }

    #[test]
    fn test_memory_list_is_non_recursive() {
        let source = MemorySource::new()
            .with_file("docs/a.md", "a")
            .with_file("docs/nested/b.md", "b")
            .with_file("other/c.md", "c");
        let files = source.list(Path::new("docs")).unwrap().unwrap();
        assert_eq!(files, vec![PathBuf::from("docs/a.md")]);
        assert!(source.list(Path::new("missing")).unwrap().is_none());
    }

    #[test]
    fn test_rust_embed_read() {
        let source = RustEmbedSource::<Bundled>::new();
        let text = source.read(Path::new("posts/first.md")).unwrap().unwrap();
        assert!(text.contains("title: First embedded"));
        assert!(source.read(Path::new("posts/missing.md")).unwrap().is_none());
    }

    #[test]
    fn test_rust_embed_list_is_non_recursive() {
        let source = RustEmbedSource::<Bundled>::new();
        let files = source.list(Path::new("posts")).unwrap().unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("posts/first.md"),
                PathBuf::from("posts/notes.txt"),
                PathBuf::from("posts/second.md"),
            ]
        );
        assert!(source.list(Path::new("missing")).unwrap().is_none());
    }

    #[test]
    fn test_rust_embed_root_is_stripped() {
        let source = RustEmbedSource::<Bundled>::new().with_root("/srv/site");
        let path = Path::new("/srv/site/posts/first.md");
        assert!(source.read(path).unwrap().is_some());
        assert!(source.read(Path::new("/elsewhere/posts/first.md")).unwrap().is_none());

        let files = source.list(Path::new("/srv/site/posts")).unwrap().unwrap();
        assert!(files.contains(&path.to_path_buf()));
    }

    #[test]
    fn test_rust_embed_shadows_filesystem() {
        let dir = create_test_dir();
        fs::create_dir(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("posts/first.md"), "from disk").unwrap();
        fs::write(dir.path().join("posts/disk-only.md"), "only on disk").unwrap();

        let sources = Sources::empty()
            .with(RustEmbedSource::<Bundled>::new().with_root(dir.path()))
            .with(FsSource);

        let first = sources.read(&dir.path().join("posts/first.md")).unwrap().unwrap();
        assert!(first.contains("First embedded"));
        assert_eq!(
            sources.read(&dir.path().join("posts/disk-only.md")).unwrap(),
            Some("only on disk".to_owned())
        );
    }

    #[test]
    fn test_chain_first_hit_wins() {
        let dir = create_test_dir();
        let path = dir.path().join("a.md");
        fs::write(&path, "from disk").unwrap();

        let sources = Sources::empty()
            .with(MemorySource::new().with_file(path.clone(), "embedded"))
            .with(FsSource);
        assert_eq!(sources.read(&path).unwrap(), Some("embedded".to_owned()));

        let other = dir.path().join("b.md");
        fs::write(&other, "only on disk").unwrap();
        assert_eq!(sources.read(&other).unwrap(), Some("only on disk".to_owned()));
    }

    #[test]
    fn test_chain_miss_everywhere() {
        let sources = Sources::empty().with(MemorySource::new());
        assert!(sources.read(Path::new("x.md")).unwrap().is_none());
        assert!(sources.list(Path::new("x")).unwrap().is_none());
    }

    #[test]
    fn test_default_chain_is_filesystem() {
        assert_eq!(Sources::default().names(), vec!["filesystem"]);
    }

    #[test]
    fn test_sources_debug_lists_names() {
        let sources = Sources::empty()
            .with(RustEmbedSource::<Bundled>::new())
            .with(FsSource);
        assert_eq!(
            format!("{sources:?}"),
            r#"Sources { chain: ["embedded", "filesystem"] }"#
        );
    }
}
