//! Load a chunk graph from a directory of numbered chunk files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use super::LoadOptions;
use crate::chunkset::{Chunk, ChunkGraph, GraphError, Part};

/// `<id>-<name>.<ext>`, e.g. `0-runtime.js`
static CHUNK_FILE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-([^.]+)\.(\w+)$").expect("valid chunk file regex"));

/// Parse a chunk file name into its id and name
pub fn parse_chunk_filename(filename: &str) -> Option<(usize, &str)> {
    let caps = CHUNK_FILE_REGEX.captures(filename)?;
    let id = caps.get(1)?.as_str().parse().ok()?;
    let name = caps.get(2)?.as_str();
    Some((id, name))
}

/// Build a graph where every `<id>-<name>.<ext>` file in `dir` is one named
/// chunk with a single file-backed part and no dependencies.
///
/// Ids must form the sequence `0..n` with no gaps.
pub fn load_directory(dir: &Path, options: &LoadOptions) -> Result<ChunkGraph> {
    if !dir.is_dir() {
        bail!("Chunk directory not found: {}", dir.display());
    }

    let mut files: BTreeMap<usize, (String, PathBuf)> = BTreeMap::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to read chunk directory: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy();
        let Some((id, name)) = parse_chunk_filename(&filename) else {
            debug!("Skipping non-chunk file: {}", filename);
            continue;
        };

        if files
            .insert(id, (name.to_string(), entry.path().to_path_buf()))
            .is_some()
        {
            return Err(GraphError::DuplicateIndex(id).into());
        }
    }

    let mut graph = ChunkGraph::new();
    for (id, (name, path)) in files {
        let expected = graph.len();
        if id != expected {
            return Err(GraphError::NonDenseIndex { expected, found: id }.into());
        }
        graph.push_chunk(Chunk::named(
            name,
            vec![Part::file(path, options.trailing_newline)],
        ));
    }

    graph.validate()?;
    debug!("Loaded {} chunks from {}", graph.len(), dir.display());

    Ok(graph)
}
