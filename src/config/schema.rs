//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Where the chunk graph is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunksConfig {
    /// Directory of `<id>-<name>.<ext>` chunk files
    #[serde(default = "default_chunk_dir")]
    pub dir: String,

    /// JSON chunk manifest. Takes precedence over `dir` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    /// Append a newline after every chunk file
    #[serde(default)]
    pub trailing_newline: bool,
}

impl Default for ChunksConfig {
    fn default() -> Self {
        Self {
            dir: default_chunk_dir(),
            manifest: None,
            trailing_newline: false,
        }
    }
}

fn default_chunk_dir() -> String {
    "dist/chunks".to_string()
}

/// Chunk server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// URL prefix chunk requests are served under
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Prefix responses with a `/** {request} */` comment
    #[serde(default)]
    pub banner: bool,

    /// Reload the chunk graph when build output changes
    #[serde(default = "default_true")]
    pub watch: bool,

    /// Allow cross-origin requests
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            public_path: default_public_path(),
            banner: false,
            watch: true,
            cors: true,
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_public_path() -> String {
    "/chunks/".to_string()
}

fn default_true() -> bool {
    true
}
