//! Chunks, parts, and lazily-read part bodies

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Index of a chunk inside a [`ChunkGraph`](super::ChunkGraph). The index is the
/// chunk's identity.
pub type ChunkIndex = usize;

/// Something that can produce the raw bytes of a part on demand.
///
/// Implementations may perform blocking I/O. They are called at most once per
/// visited part in a single assembly, and never for parts that are not visited.
pub trait PartBody: Send + Sync {
    /// Read the full body
    fn read(&self) -> io::Result<Vec<u8>>;

    /// File the body comes from, if any
    fn source_path(&self) -> Option<&Path> {
        None
    }
}

impl<F> PartBody for F
where
    F: Fn() -> io::Result<Vec<u8>> + Send + Sync,
{
    fn read(&self) -> io::Result<Vec<u8>> {
        self()
    }
}

/// Body bytes that are already resident in memory
#[derive(Debug, Clone)]
pub struct InlineBody(Arc<[u8]>);

impl InlineBody {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into().into())
    }
}

impl PartBody for InlineBody {
    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }
}

/// Body backed by a file in a build output directory
#[derive(Debug, Clone)]
pub struct FileBody {
    /// Absolute path of the file
    pub path: PathBuf,

    /// Append a `\n` after the file contents so that concatenated scripts
    /// never run into each other
    pub trailing_newline: bool,
}

impl FileBody {
    pub fn new(path: impl Into<PathBuf>, trailing_newline: bool) -> Self {
        Self {
            path: path.into(),
            trailing_newline,
        }
    }
}

impl PartBody for FileBody {
    fn read(&self) -> io::Result<Vec<u8>> {
        let mut contents = fs::read(&self.path).map_err(|e| {
            io::Error::new(e.kind(), format!("{}: {}", self.path.display(), e))
        })?;
        if self.trailing_newline {
            contents.push(b'\n');
        }
        Ok(contents)
    }

    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// The atomic unit of output: a body plus the chunks it needs loaded first
#[derive(Clone)]
pub struct Part {
    body: Arc<dyn PartBody>,

    /// Chunks this part depends on, in declaration order
    pub depends_on: Vec<ChunkIndex>,
}

impl Part {
    pub fn new(body: impl PartBody + 'static) -> Self {
        Self {
            body: Arc::new(body),
            depends_on: Vec::new(),
        }
    }

    /// Part whose body is produced by a closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    /// Part with inline bytes
    pub fn inline(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(InlineBody::new(bytes))
    }

    /// Part read from a file when visited
    pub fn file(path: impl Into<PathBuf>, trailing_newline: bool) -> Self {
        Self::new(FileBody::new(path, trailing_newline))
    }

    pub fn with_deps(mut self, deps: impl IntoIterator<Item = ChunkIndex>) -> Self {
        self.depends_on.extend(deps);
        self
    }

    /// File the body is read from, for diagnostics
    pub fn source_path(&self) -> Option<&Path> {
        self.body.source_path()
    }

    /// Retrieve the body. Performs whatever I/O the body source needs.
    pub fn read_body(&self) -> io::Result<Vec<u8>> {
        self.body.read()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// A chunk is an ordered list of parts, optionally named
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    /// Display name, for diagnostics only
    pub name: Option<String>,

    /// Parts in emission order
    pub parts: Vec<Part>,
}

impl Chunk {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { name: None, parts }
    }

    pub fn named(name: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            name: Some(name.into()),
            parts,
        }
    }

    /// Check if chunk has no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of parts in chunk
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// All chunk indices referenced by any part, in order, duplicates kept
    pub fn dependencies(&self) -> impl Iterator<Item = ChunkIndex> + '_ {
        self.parts.iter().flat_map(|p| p.depends_on.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_body() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let part = Part::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(b"x".to_vec())
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(part.read_body().unwrap(), b"x");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_body_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.js");
        fs::write(&path, "a()").unwrap();

        assert_eq!(FileBody::new(&path, false).read().unwrap(), b"a()");
        assert_eq!(FileBody::new(&path, true).read().unwrap(), b"a()\n");
        assert_eq!(Part::file(&path, false).source_path(), Some(path.as_path()));
        assert_eq!(Part::inline("a()").source_path(), None);
    }

    #[test]
    fn test_file_body_missing_file_names_path() {
        let err = FileBody::new("/nonexistent/dir/0.js", false).read().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/nonexistent/dir/0.js"));
    }

    #[test]
    fn test_chunk_dependencies() {
        let chunk = Chunk::named(
            "app",
            vec![Part::inline("a").with_deps([1, 2]), Part::inline("b").with_deps([2])],
        );
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.dependencies().collect::<Vec<_>>(), vec![1, 2, 2]);
    }
}
