//! Chunk graph: the indexed pool of chunks the assembler walks

use std::collections::HashMap;

use thiserror::Error;

use super::chunk::{Chunk, ChunkIndex};

/// Problems a graph producer detects before handing the graph out
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Source chunk ids are not a gap-free sequence starting at 0
    #[error("expected chunk id {expected} but found {found}")]
    NonDenseIndex { expected: ChunkIndex, found: ChunkIndex },

    /// Two chunks claim the same id
    #[error("duplicate chunk id {0}")]
    DuplicateIndex(ChunkIndex),

    /// A name points outside the chunk list
    #[error("chunk name `{name}` maps to index {index}, but the graph has {len} chunks")]
    DanglingName {
        name: String,
        index: ChunkIndex,
        len: usize,
    },

    /// A part depends on a chunk that does not exist
    #[error("part {part} of chunk {chunk} depends on missing chunk {index} ({len} chunks)")]
    DanglingDependency {
        chunk: ChunkIndex,
        part: usize,
        index: ChunkIndex,
        len: usize,
    },
}

/// An indexed collection of chunks with a name lookup.
///
/// Valid indices are exactly `0..len()`. Dependencies may form cycles,
/// including self-references.
#[derive(Debug, Clone, Default)]
pub struct ChunkGraph {
    /// Map from chunk name to chunk index
    names: HashMap<String, ChunkIndex>,

    /// All chunks, indexed by position
    chunks: Vec<Chunk>,
}

impl ChunkGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from parts that were assembled elsewhere
    pub fn from_parts(names: HashMap<String, ChunkIndex>, chunks: Vec<Chunk>) -> Self {
        Self { names, chunks }
    }

    /// Append a chunk and return its index. A named chunk is also registered
    /// in the name map.
    pub fn push_chunk(&mut self, chunk: Chunk) -> ChunkIndex {
        let index = self.chunks.len();
        if let Some(name) = &chunk.name {
            self.names.insert(name.clone(), index);
        }
        self.chunks.push(chunk);
        index
    }

    /// Register (or re-point) a name
    pub fn set_name(&mut self, name: impl Into<String>, index: ChunkIndex) {
        self.names.insert(name.into(), index);
    }

    /// Look up a chunk index by name
    pub fn resolve_name(&self, name: &str) -> Option<ChunkIndex> {
        self.names.get(name).copied()
    }

    /// Get a chunk by index
    pub fn chunk(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Get a mutable reference to a chunk
    pub fn chunk_mut(&mut self, index: ChunkIndex) -> Option<&mut Chunk> {
        self.chunks.get_mut(index)
    }

    pub fn names(&self) -> &HashMap<String, ChunkIndex> {
        &self.names
    }

    /// Iterate chunks with their indices
    pub fn iter(&self) -> impl Iterator<Item = (ChunkIndex, &Chunk)> {
        self.chunks.iter().enumerate()
    }

    /// Total number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if graph is empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Check that every name and every dependency points at an existing chunk.
    ///
    /// Producers call this once after building; the assembler does not.
    pub fn validate(&self) -> Result<(), GraphError> {
        let len = self.chunks.len();

        let mut names: Vec<_> = self.names.iter().collect();
        names.sort();
        for (name, &index) in names {
            if index >= len {
                return Err(GraphError::DanglingName {
                    name: name.clone(),
                    index,
                    len,
                });
            }
        }

        for (chunk_idx, chunk) in self.iter() {
            for (part_idx, part) in chunk.parts.iter().enumerate() {
                if let Some(&index) = part.depends_on.iter().find(|&&dep| dep >= len) {
                    return Err(GraphError::DanglingDependency {
                        chunk: chunk_idx,
                        part: part_idx,
                        index,
                        len,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkset::Part;

    #[test]
    fn test_push_chunk_registers_name() {
        let mut graph = ChunkGraph::new();

        let runtime = graph.push_chunk(Chunk::named("runtime", vec![Part::inline("r")]));
        let anon = graph.push_chunk(Chunk::new(vec![Part::inline("a")]));

        assert_eq!(runtime, 0);
        assert_eq!(anon, 1);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.resolve_name("runtime"), Some(0));
        assert_eq!(graph.names().len(), 1);
    }

    #[test]
    fn test_validate_accepts_cycles() {
        let mut graph = ChunkGraph::new();
        graph.push_chunk(Chunk::named("a", vec![Part::inline("a").with_deps([1, 0])]));
        graph.push_chunk(Chunk::named("b", vec![Part::inline("b").with_deps([0])]));

        assert_eq!(graph.validate(), Ok(()));
    }

    #[test]
    fn test_validate_dangling_name() {
        let names = HashMap::from([("ghost".to_string(), 3)]);
        let graph = ChunkGraph::from_parts(names, vec![Chunk::new(vec![Part::inline("a")])]);

        assert_eq!(
            graph.validate(),
            Err(GraphError::DanglingName {
                name: "ghost".to_string(),
                index: 3,
                len: 1,
            })
        );
    }

    #[test]
    fn test_validate_dangling_dependency() {
        let mut graph = ChunkGraph::new();
        graph.push_chunk(Chunk::new(vec![
            Part::inline("a"),
            Part::inline("b").with_deps([0, 7]),
        ]));

        let err = graph.validate().unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingDependency {
                chunk: 0,
                part: 1,
                index: 7,
                len: 1,
            }
        );
        assert!(err.to_string().contains("depends on missing chunk 7"));
    }
}
