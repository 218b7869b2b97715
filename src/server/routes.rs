//! Mapping chunk URLs to assembly requests

use crate::assembler::{parse_chunk_ids, AssemblyRequest, ContentType, RequestError};
use crate::chunkset::ChunkGraph;

/// What a path below the public path asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkRoute {
    /// Source map request; answered with an empty map
    SourceMap,
    /// Assemble these chunks
    Assemble(AssemblyRequest),
    /// Not a chunk URL
    NotFound,
}

const BATCH_PREFIX: &str = "chunk.";

/// Parse the part of a URL that follows the public path.
///
/// Recognized forms:
/// - `<name>.<ext>`: a named chunk with its dependencies
/// - `chunk.<id>,<id>.<ext>`: exactly these chunks, no dependencies
/// - `<ext>/i=<id>,<id>` or `<ext>/n=<name>,<name>`: batch with dependencies
/// - `*.map`: source maps
pub fn parse_asset_path(asset: &str, graph: &ChunkGraph) -> Result<ChunkRoute, RequestError> {
    if asset.ends_with(".map") {
        return Ok(ChunkRoute::SourceMap);
    }

    if let Some((stem, ext)) = asset.rsplit_once('.') {
        if let Ok(content_type) = ext.parse::<ContentType>() {
            if graph.resolve_name(stem).is_some() {
                let request = AssemblyRequest::names([stem]).with_content_type(content_type);
                return Ok(ChunkRoute::Assemble(request));
            }

            if let Some(ids) = stem.strip_prefix(BATCH_PREFIX) {
                let request = AssemblyRequest::ids(parse_chunk_ids(ids)?)
                    .with_content_type(content_type)
                    .with_deps(false);
                return Ok(ChunkRoute::Assemble(request));
            }
        }
    }

    if let Some((ext, query)) = asset.split_once('/') {
        if let Ok(content_type) = ext.parse::<ContentType>() {
            let request = AssemblyRequest::parse_query(query)?.with_content_type(content_type);
            return Ok(ChunkRoute::Assemble(request));
        }
    }

    Ok(ChunkRoute::NotFound)
}
