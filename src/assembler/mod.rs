//! Chunk assembly
//!
//! Turns a [`ChunkGraph`] plus an [`AssemblyRequest`] into a single byte
//! buffer. The traversal is a depth-first walk with one visited set per call:
//! - every chunk is emitted at most once, however many roots or paths reach it
//! - with `include_deps`, a part's dependencies are emitted before the chunk
//!   that owns the part
//! - cycles terminate; the first visitor of a chunk decides its position
//!
//! Bodies are only read after the traversal has succeeded, once per emitted
//! part. Chunks the traversal never reaches are never read.

mod request;

use std::collections::HashSet;
use std::io;

use thiserror::Error;
use tracing::{debug, trace};

use crate::chunkset::{Chunk, ChunkGraph, ChunkIndex, Part};

pub use request::{parse_chunk_ids, parse_chunk_names, AssemblyRequest, ContentType, RequestError};

/// Reasons an assembly can fail. No partial output is ever returned.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A requested name is missing from the graph's name map
    #[error("unknown chunk name `{0}`")]
    UnknownChunkName(String),

    /// A requested id, or the index a requested name maps to, is out of range
    #[error("invalid chunk index {index} (graph has {len} chunks)")]
    InvalidChunkIndex { index: ChunkIndex, len: usize },

    /// A part depends on a chunk outside the graph
    #[error("part {part} of chunk {chunk} depends on missing chunk {index}")]
    DanglingDependency {
        chunk: ChunkIndex,
        part: usize,
        index: ChunkIndex,
        len: usize,
    },

    /// Reading a part's body failed
    #[error("failed to read part {part} of chunk {chunk}")]
    Body {
        chunk: ChunkIndex,
        part: usize,
        #[source]
        source: io::Error,
    },
}

impl AssembleError {
    /// Whether a requested chunk does not exist. Dangling dependencies and
    /// body failures are faults of the graph, not of the request.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssembleError::UnknownChunkName(_) | AssembleError::InvalidChunkIndex { .. }
        )
    }
}

/// A part selected for output, with its position in the graph
#[derive(Debug, Clone, Copy)]
pub struct PartRef<'g> {
    pub chunk: ChunkIndex,
    pub index: usize,
    pub part: &'g Part,
}

/// Traversal state scoped to a single assembly call
struct Visitor<'g> {
    graph: &'g ChunkGraph,
    include_deps: bool,
    visited: HashSet<ChunkIndex>,
    output: Vec<PartRef<'g>>,
}

impl<'g> Visitor<'g> {
    fn new(graph: &'g ChunkGraph, include_deps: bool) -> Self {
        Self {
            graph,
            include_deps,
            visited: HashSet::new(),
            output: Vec::new(),
        }
    }

    fn chunk(&self, index: ChunkIndex) -> Result<&'g Chunk, AssembleError> {
        self.graph
            .chunk(index)
            .ok_or(AssembleError::InvalidChunkIndex {
                index,
                len: self.graph.len(),
            })
    }

    fn visit(&mut self, index: ChunkIndex) -> Result<(), AssembleError> {
        // Marked before recursing so a cycle back into this chunk is a no-op
        if !self.visited.insert(index) {
            return Ok(());
        }

        let chunk = self.chunk(index)?;
        let mut own_parts = Vec::with_capacity(chunk.parts.len());

        for (part_idx, part) in chunk.parts.iter().enumerate() {
            if self.include_deps {
                for &dep in &part.depends_on {
                    if dep >= self.graph.len() {
                        return Err(AssembleError::DanglingDependency {
                            chunk: index,
                            part: part_idx,
                            index: dep,
                            len: self.graph.len(),
                        });
                    }
                    self.visit(dep)?;
                }
            }
            own_parts.push(PartRef {
                chunk: index,
                index: part_idx,
                part,
            });
        }

        trace!(chunk = index, parts = own_parts.len(), "emitting chunk");
        self.output.extend(own_parts);
        Ok(())
    }
}

/// Resolve a request to root indices: ids first, then names, in order
fn resolve_roots(
    graph: &ChunkGraph,
    request: &AssemblyRequest,
) -> Result<Vec<ChunkIndex>, AssembleError> {
    let mut roots = request.chunk_ids.clone();
    for name in &request.chunk_names {
        let index = graph
            .resolve_name(name)
            .ok_or_else(|| AssembleError::UnknownChunkName(name.clone()))?;
        roots.push(index);
    }
    Ok(roots)
}

/// Compute the ordered list of parts a request selects, without reading any
/// body.
pub fn collect_parts<'g>(
    graph: &'g ChunkGraph,
    request: &AssemblyRequest,
) -> Result<Vec<PartRef<'g>>, AssembleError> {
    let roots = resolve_roots(graph, request)?;

    let mut visitor = Visitor::new(graph, request.include_deps);
    for index in roots {
        visitor.visit(index)?;
    }

    debug!(
        chunks = visitor.visited.len(),
        parts = visitor.output.len(),
        "collected parts"
    );
    Ok(visitor.output)
}

/// Assemble the requested chunks into one buffer.
///
/// The buffer is only returned once every body has been read; any failure
/// discards what was read so far.
pub fn assemble(graph: &ChunkGraph, request: &AssemblyRequest) -> Result<Vec<u8>, AssembleError> {
    let parts = collect_parts(graph, request)?;

    let mut bodies = Vec::with_capacity(parts.len());
    for part_ref in &parts {
        let body = part_ref.part.read_body().map_err(|source| AssembleError::Body {
            chunk: part_ref.chunk,
            part: part_ref.index,
            source,
        })?;
        bodies.push(body);
    }

    Ok(bodies.concat())
}
