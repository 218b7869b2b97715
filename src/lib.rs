//! dynbundle library
//!
//! Assembles arbitrary combinations of pre-built chunks into one byte stream,
//! so a loader can fetch many fine-grained chunks in a single round trip.
//!
//! ```
//! use dynbundle_lib::assembler::{assemble, AssemblyRequest};
//! use dynbundle_lib::chunkset::{Chunk, ChunkGraph, Part};
//!
//! let mut graph = ChunkGraph::new();
//! graph.push_chunk(Chunk::named("runtime", vec![Part::inline("r;")]));
//! graph.push_chunk(Chunk::named("app", vec![Part::inline("a;").with_deps([0])]));
//!
//! let output = assemble(&graph, &AssemblyRequest::names(["app"])).unwrap();
//! assert_eq!(output, b"r;a;");
//! ```

pub mod assembler;
pub mod chunkset;
pub mod cli;
pub mod config;
pub mod loader;
pub mod server;
pub mod utils;

pub use assembler::{assemble, AssembleError, AssemblyRequest, ContentType};
pub use chunkset::{Chunk, ChunkGraph, Part};
pub use cli::Cli;
pub use config::Config;
