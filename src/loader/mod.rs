//! Chunk graph producers
//!
//! Builds a [`ChunkGraph`] from build output on disk. Two layouts are
//! supported:
//! - a directory of `<id>-<name>.<ext>` chunk files
//! - a JSON chunk manifest listing chunk files and entrypoints

mod directory;
mod manifest;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::chunkset::ChunkGraph;

pub use directory::{load_directory, parse_chunk_filename};
pub use manifest::{load_manifest, ChunkManifest, ManifestChunk};

/// Options shared by all producers
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Append `\n` to every file-backed part body
    pub trailing_newline: bool,
}

/// Where a chunk graph comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSource {
    /// Directory of numbered chunk files
    Directory(PathBuf),
    /// JSON chunk manifest
    Manifest(PathBuf),
}

impl GraphSource {
    /// Directory to watch for changes: the chunk directory itself, or the
    /// directory holding the manifest
    pub fn watch_path(&self) -> PathBuf {
        match self {
            GraphSource::Directory(dir) => dir.clone(),
            GraphSource::Manifest(path) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| path.clone()),
        }
    }

    /// Build the graph
    pub fn load(&self, options: &LoadOptions) -> Result<ChunkGraph> {
        let graph = match self {
            GraphSource::Directory(dir) => load_directory(dir, options)?,
            GraphSource::Manifest(path) => load_manifest(path, options)?,
        };
        info!("Loaded chunk graph from {} ({} chunks)", self, graph.len());
        Ok(graph)
    }
}

impl fmt::Display for GraphSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSource::Directory(path) => write!(f, "directory {}", path.display()),
            GraphSource::Manifest(path) => write!(f, "manifest {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_graph_source_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0-main.js"), "m").unwrap();
        let manifest = dir.path().join("chunks.json");
        fs::write(
            &manifest,
            r#"{ "chunks": [ { "id": 0, "name": "main", "files": ["0-main.js"] } ] }"#,
        )
        .unwrap();

        let options = LoadOptions::default();
        let from_dir = GraphSource::Directory(dir.path().to_path_buf())
            .load(&options)
            .unwrap();
        let from_manifest = GraphSource::Manifest(manifest.clone())
            .load(&options)
            .unwrap();

        assert_eq!(from_dir.resolve_name("main"), Some(0));
        assert_eq!(from_manifest.resolve_name("main"), Some(0));
        assert_eq!(GraphSource::Manifest(manifest).watch_path(), dir.path());
        assert_eq!(
            GraphSource::Directory(dir.path().join("chunks")).watch_path(),
            dir.path().join("chunks")
        );
    }

    #[test]
    fn test_graph_source_missing_directory() {
        let source = GraphSource::Directory(PathBuf::from("/nonexistent/chunks"));
        assert!(source.load(&LoadOptions::default()).is_err());
    }
}
