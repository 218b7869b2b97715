//! Load a chunk graph from a JSON chunk manifest emitted alongside a build
//!
//! ```json
//! {
//!   "outputPath": "dist",
//!   "chunks": [
//!     { "id": 0, "name": "runtime", "files": ["runtime.js"] },
//!     { "id": 1, "files": ["1.js"] },
//!     { "id": 2, "name": "app", "files": ["app.js"] }
//!   ],
//!   "entrypoints": { "app": [0, 1, 2] }
//! }
//! ```
//!
//! Each entrypoint lists its chunks in load order; the last one is the entry
//! chunk itself and the rest become dependencies of its first part.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LoadOptions;
use crate::chunkset::{Chunk, ChunkGraph, ChunkIndex, GraphError, Part};

/// On-disk manifest format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkManifest {
    /// Directory chunk files are relative to. Relative paths are resolved
    /// against the manifest's own directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    pub chunks: Vec<ManifestChunk>,

    /// Entry name -> chunk ids, entry chunk last
    #[serde(default)]
    pub entrypoints: BTreeMap<String, Vec<ChunkIndex>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestChunk {
    pub id: ChunkIndex,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Output files, one part each
    #[serde(default)]
    pub files: Vec<String>,
}

impl ChunkManifest {
    /// Read and parse a manifest file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read chunk manifest: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse chunk manifest: {}", path.display()))
    }

    /// Turn the manifest into a graph whose file parts live under `output_dir`
    pub fn into_graph(self, output_dir: &Path, options: &LoadOptions) -> Result<ChunkGraph> {
        let mut chunks = self.chunks;
        chunks.sort_by_key(|c| c.id);

        let mut graph = ChunkGraph::new();
        for manifest_chunk in chunks {
            let expected = graph.len();
            if manifest_chunk.id < expected {
                return Err(GraphError::DuplicateIndex(manifest_chunk.id).into());
            }
            if manifest_chunk.id != expected {
                return Err(GraphError::NonDenseIndex {
                    expected,
                    found: manifest_chunk.id,
                }
                .into());
            }

            let parts = manifest_chunk
                .files
                .iter()
                .map(|file| Part::file(output_dir.join(file), options.trailing_newline))
                .collect();

            graph.push_chunk(Chunk {
                name: manifest_chunk.name,
                parts,
            });
        }

        for (name, ids) in &self.entrypoints {
            let Some((&entry_idx, dep_ids)) = ids.split_last() else {
                bail!("Entrypoint '{}' has no chunks", name);
            };

            let len = graph.len();
            let entry = graph
                .chunk_mut(entry_idx)
                .ok_or(GraphError::DanglingName {
                    name: name.clone(),
                    index: entry_idx,
                    len,
                })?;

            if entry.name.as_deref() != Some(name.as_str()) {
                bail!(
                    "Unexpected chunk name for entrypoint '{}': chunk {} is named {:?}",
                    name,
                    entry_idx,
                    entry.name
                );
            }

            let Some(first_part) = entry.parts.first_mut() else {
                bail!("Entry chunk '{}' has no files", name);
            };
            first_part.depends_on.extend_from_slice(dep_ids);
        }

        graph.validate()?;
        Ok(graph)
    }
}

/// Load a graph from a manifest file
pub fn load_manifest(path: &Path, options: &LoadOptions) -> Result<ChunkGraph> {
    let manifest = ChunkManifest::read(path)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let output_dir = match &manifest.output_path {
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    };

    let graph = manifest.into_graph(&output_dir, options)?;
    debug!(
        "Loaded {} chunks ({} named) from {}",
        graph.len(),
        graph.names().len(),
        path.display()
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{assemble, AssemblyRequest};
    use pretty_assertions::assert_eq;

    fn write_fixture(dir: &Path, manifest: &str) -> PathBuf {
        let out = dir.join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("runtime.js"), "runtime;").unwrap();
        fs::write(out.join("1.js"), "shared;").unwrap();
        fs::write(out.join("app.js"), "app;").unwrap();
        fs::write(out.join("app.extra.js"), "extra;").unwrap();

        let path = dir.join("chunks.json");
        fs::write(&path, manifest).unwrap();
        path
    }

    const MANIFEST: &str = r#"{
        "outputPath": "dist",
        "chunks": [
            { "id": 2, "name": "app", "files": ["app.js", "app.extra.js"] },
            { "id": 0, "name": "runtime", "files": ["runtime.js"] },
            { "id": 1, "files": ["1.js"] }
        ],
        "entrypoints": { "app": [0, 1, 2] }
    }"#;

    #[test]
    fn test_load_manifest_entrypoint_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), MANIFEST);

        let graph = load_manifest(&path, &LoadOptions::default()).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.resolve_name("app"), Some(2));
        assert_eq!(graph.resolve_name("runtime"), Some(0));
        let app = graph.chunk(2).unwrap();
        assert_eq!(app.parts[0].depends_on, vec![0, 1]);
        assert!(app.parts[1].depends_on.is_empty());

        let output = assemble(&graph, &AssemblyRequest::names(["app"])).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "runtime;shared;app;extra;");

        let output = assemble(&graph, &AssemblyRequest::ids([1]).with_deps(false)).unwrap();
        assert_eq!(output, b"shared;");
    }

    #[test]
    fn test_load_manifest_rejects_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{ "chunks": [ { "id": 0, "files": [] }, { "id": 3, "files": [] } ] }"#,
        );

        let err = load_manifest(&path, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "expected chunk id 1 but found 3");
    }

    #[test]
    fn test_into_graph_rejects_duplicate_ids() {
        let manifest: ChunkManifest =
            serde_json::from_str(r#"{ "chunks": [ { "id": 0 }, { "id": 0 } ] }"#).unwrap();

        let err = manifest
            .into_graph(Path::new("dist"), &LoadOptions::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<GraphError>(),
            Some(&GraphError::DuplicateIndex(0))
        );
    }

    #[test]
    fn test_load_manifest_entry_name_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "chunks": [ { "id": 0, "name": "other", "files": ["app.js"] } ],
                "entrypoints": { "app": [0] }
            }"#,
        );

        let err = load_manifest(&path, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Unexpected chunk name"));
    }

    #[test]
    fn test_load_manifest_unknown_entry_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "chunks": [ { "id": 0, "name": "app", "files": ["app.js"] } ],
                "entrypoints": { "app": [0, 5] }
            }"#,
        );

        let err = load_manifest(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::DanglingName { index: 5, .. })
        ));
    }

    #[test]
    fn test_load_manifest_dangling_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            r#"{
                "chunks": [ { "id": 0, "name": "app", "files": ["app.js"] } ],
                "entrypoints": { "app": [4, 0] }
            }"#,
        );

        let err = load_manifest(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::DanglingDependency { index: 4, .. })
        ));
    }

    #[test]
    fn test_load_manifest_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "{ not json");

        let err = load_manifest(&path, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse chunk manifest"));
    }
}
