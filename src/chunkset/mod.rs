//! Chunk graph data model
//!
//! A [`ChunkGraph`] is built once per compilation by a producer (see
//! [`crate::loader`]) and is read-only while chunks are being assembled.

mod chunk;
mod graph;

pub use chunk::{Chunk, ChunkIndex, FileBody, InlineBody, Part, PartBody};
pub use graph::{ChunkGraph, GraphError};
