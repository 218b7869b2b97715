//! Assembly requests and the compact query syntax used in chunk URLs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunkset::ChunkIndex;

/// Errors produced while parsing a request from a URL or CLI argument
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("unknown param type `{0}`")]
    UnknownParam(String),

    #[error("invalid chunk id `{0}`")]
    InvalidChunkId(String),

    #[error("unknown content type `{0}`")]
    UnknownContentType(String),
}

/// Kind of asset being assembled. Only used by callers to label output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Classic script
    #[default]
    Js,
    /// ES module
    Mjs,
    /// Stylesheet
    Css,
}

impl ContentType {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Js => "js",
            ContentType::Mjs => "mjs",
            ContentType::Css => "css",
        }
    }

    /// MIME type for an HTTP `Content-Type` header
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Js | ContentType::Mjs => "application/javascript; charset=utf-8",
            ContentType::Css => "text/css; charset=utf-8",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContentType {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "js" => Ok(ContentType::Js),
            "mjs" => Ok(ContentType::Mjs),
            "css" => Ok(ContentType::Css),
            other => Err(RequestError::UnknownContentType(other.to_string())),
        }
    }
}

/// Which chunks to assemble, and whether to pull in their dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyRequest {
    /// Chunks requested by index
    #[serde(default)]
    pub chunk_ids: Vec<ChunkIndex>,

    /// Chunks requested by name; visited after `chunk_ids`
    #[serde(default)]
    pub chunk_names: Vec<String>,

    #[serde(default)]
    pub content_type: ContentType,

    /// Expand each part's dependencies before emitting it
    #[serde(default = "default_true")]
    pub include_deps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AssemblyRequest {
    fn default() -> Self {
        Self {
            chunk_ids: Vec::new(),
            chunk_names: Vec::new(),
            content_type: ContentType::default(),
            include_deps: true,
        }
    }
}

impl AssemblyRequest {
    /// Request chunks by index
    pub fn ids(ids: impl IntoIterator<Item = ChunkIndex>) -> Self {
        Self {
            chunk_ids: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Request chunks by name
    pub fn names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            chunk_names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_deps(mut self, include_deps: bool) -> Self {
        self.include_deps = include_deps;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Check if nothing was requested
    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty() && self.chunk_names.is_empty()
    }

    /// Parse the `i=1,2,3` / `n=app,vendor` form used in batch chunk URLs.
    ///
    /// Dependencies are included. An empty value yields an empty list.
    pub fn parse_query(query: &str) -> Result<Self, RequestError> {
        let (key, value) = query.split_once('=').unwrap_or((query, ""));
        let mut request = Self::default();

        match key {
            "i" => request.chunk_ids = parse_chunk_ids(value)?,
            "n" => request.chunk_names = parse_chunk_names(value),
            other => return Err(RequestError::UnknownParam(other.to_string())),
        }

        Ok(request)
    }
}

/// Parse a comma-separated list of chunk indices
pub fn parse_chunk_ids(value: &str) -> Result<Vec<ChunkIndex>, RequestError> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|id| {
            id.trim()
                .parse::<ChunkIndex>()
                .map_err(|_| RequestError::InvalidChunkId(id.to_string()))
        })
        .collect()
}

/// Parse a comma-separated list of chunk names
pub fn parse_chunk_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_query_ids() {
        let request = AssemblyRequest::parse_query("i=3,1,2").unwrap();
        assert_eq!(request.chunk_ids, vec![3, 1, 2]);
        assert!(request.chunk_names.is_empty());
        assert!(request.include_deps);
        assert_eq!(request.content_type, ContentType::Js);
    }

    #[test]
    fn test_parse_query_names() {
        let request = AssemblyRequest::parse_query("n=app,vendor").unwrap();
        assert_eq!(request.chunk_names, vec!["app", "vendor"]);
        assert!(request.chunk_ids.is_empty());
    }

    #[test]
    fn test_parse_query_empty_value() {
        assert!(AssemblyRequest::parse_query("i=").unwrap().is_empty());
        assert!(AssemblyRequest::parse_query("n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_query_errors() {
        assert_eq!(
            AssemblyRequest::parse_query("x=1"),
            Err(RequestError::UnknownParam("x".to_string()))
        );
        assert_eq!(
            AssemblyRequest::parse_query("i=1,two"),
            Err(RequestError::InvalidChunkId("two".to_string()))
        );
        assert!(AssemblyRequest::parse_query("i=-1").is_err());
    }

    #[test]
    fn test_content_type() {
        assert_eq!("css".parse::<ContentType>().unwrap(), ContentType::Css);
        assert_eq!(ContentType::Mjs.to_string(), "mjs");
        assert_eq!(ContentType::Js.mime(), "application/javascript; charset=utf-8");
        assert!("html".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_request_json_shape() {
        let request = AssemblyRequest::names(["app"]).with_deps(false);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"chunkIds":[],"chunkNames":["app"],"contentType":"js","includeDeps":false}"#
        );

        let parsed: AssemblyRequest = serde_json::from_str(r#"{"chunkIds":[2]}"#).unwrap();
        assert_eq!(parsed, AssemblyRequest::ids([2]));
    }
}
