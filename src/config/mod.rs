//! Configuration handling for dynbundle
//!
//! Parses and manages dynbundle.toml configuration files.

mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loader::{GraphSource, LoadOptions};

pub use schema::*;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chunk graph source
    #[serde(default)]
    pub chunks: ChunksConfig,

    /// Chunk server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Root directory (computed from config file location)
    #[serde(skip)]
    pub root: PathBuf,
}

impl Config {
    /// Load configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let canonical_path = absolute(path.as_ref())?;

        let content = fs::read_to_string(&canonical_path)
            .with_context(|| format!("Failed to read config file: {}", canonical_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", canonical_path.display()))?;

        // Set root directory to the directory containing the config file
        config.root = canonical_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        config.validate()?;

        Ok(config)
    }

    /// Load the config file if it exists, otherwise use defaults rooted at
    /// the current directory
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = absolute(path.as_ref())?;
        if path.exists() {
            return Self::load(path);
        }

        debug!("No config file at {}, using defaults", path.display());
        let mut config = Self::default_config();
        config.root = std::env::current_dir()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            root: PathBuf::from("."),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let public_path = &self.server.public_path;
        if !public_path.starts_with('/') || !public_path.ends_with('/') {
            anyhow::bail!(
                "server.public_path must start and end with '/', got '{}'",
                public_path
            );
        }

        if self.chunks.dir.is_empty() && self.chunks.manifest.is_none() {
            anyhow::bail!("Either chunks.dir or chunks.manifest must be set");
        }

        Ok(())
    }

    /// Where to build the chunk graph from
    pub fn graph_source(&self) -> GraphSource {
        match &self.chunks.manifest {
            Some(manifest) => GraphSource::Manifest(self.root.join(manifest)),
            None => GraphSource::Directory(self.root.join(&self.chunks.dir)),
        }
    }

    /// Options passed to the graph producers
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            trailing_newline: self.chunks.trailing_newline,
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynbundle.toml");
        fs::write(
            &path,
            r#"
[chunks]
manifest = "build/chunks.json"
trailing_newline = true

[server]
port = 8080
public_path = "/_chunks/"
banner = true
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "localhost");
        assert!(config.server.banner);
        assert!(config.server.watch);
        assert_eq!(config.root, dir.path());
        assert_eq!(
            config.graph_source(),
            GraphSource::Manifest(dir.path().join("build/chunks.json"))
        );
        assert!(config.load_options().trailing_newline);
    }

    #[test]
    fn test_defaults_use_chunk_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynbundle.toml");
        fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.server.public_path, "/chunks/");
        assert_eq!(
            config.graph_source(),
            GraphSource::Directory(dir.path().join("dist/chunks"))
        );
    }

    #[test]
    fn test_invalid_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynbundle.toml");
        fs::write(&path, "[server]\npublic_path = \"chunks\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("public_path"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.chunks.dir, "dist/chunks");
        assert!(config.chunks.manifest.is_none());
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynbundle.toml");
        fs::write(&path, "[server\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("dynbundle.toml"));
    }
}
