//! Command-line interface for dynbundle
//!
//! Provides the main CLI structure using clap with subcommands for:
//! - `assemble`: Write an assembled chunk batch to stdout or a file
//! - `serve`: HTTP chunk server
//! - `inspect`: List the chunk graph

mod assemble;
mod inspect;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use crate::config::Config;

pub use assemble::AssembleCommand;
pub use inspect::InspectCommand;
pub use serve::{ServeCommand, ServeOptions};

/// dynbundle - assemble pre-built chunks into a single response
#[derive(Parser, Debug)]
#[command(name = "dynbundle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to dynbundle.toml config file
    #[arg(short, long, global = true, default_value = "dynbundle.toml")]
    pub config: String,

    /// Read chunks from this directory of `<id>-<name>.<ext>` files
    #[arg(long, global = true, env = "DYNBUNDLE_DIR", conflicts_with = "manifest")]
    pub dir: Option<PathBuf>,

    /// Read chunks from this JSON chunk manifest
    #[arg(long, global = true, env = "DYNBUNDLE_MANIFEST")]
    pub manifest: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble chunks and write the result
    Assemble(AssembleCommand),

    /// Serve assembled chunks over HTTP
    Serve(ServeCommand),

    /// List chunks, names and dependencies
    Inspect(InspectCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.command {
            Commands::Assemble(cmd) => cmd.execute(&config).await,
            Commands::Serve(cmd) => {
                print_banner();
                cmd.execute(config).await
            }
            Commands::Inspect(cmd) => cmd.execute(&config).await,
        }
    }

    /// Load the config file and apply command-line overrides
    fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {}", self.config);
        let mut config = Config::load_or_default(&self.config)?;

        // Overrides are relative to the working directory, not the config file
        let cwd = std::env::current_dir()?;
        if let Some(dir) = &self.dir {
            config.chunks.dir = cwd.join(dir).display().to_string();
            config.chunks.manifest = None;
        }
        if let Some(manifest) = &self.manifest {
            config.chunks.manifest = Some(cwd.join(manifest).display().to_string());
        }

        Ok(config)
    }
}

/// Print the dynbundle banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "⚡".cyan(),
        "dynbundle".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::GraphSource;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dynbundle.toml");
        std::fs::write(&config_path, "[chunks]\nmanifest = \"m.json\"\n").unwrap();

        let cli = Cli::parse_from([
            "dynbundle",
            "--config",
            config_path.to_str().unwrap(),
            "--dir",
            "/tmp/chunks",
            "inspect",
        ]);
        let config = cli.load_config().unwrap();

        assert_eq!(
            config.graph_source(),
            GraphSource::Directory(PathBuf::from("/tmp/chunks"))
        );
    }
}
