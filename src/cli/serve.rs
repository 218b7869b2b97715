//! Serve command implementation

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::server::ChunkServer;

/// Serve assembled chunks over HTTP
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Port to run the server on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Do not reload the chunk graph when build output changes
    #[arg(long)]
    pub no_watch: bool,
}

impl ServeCommand {
    pub async fn execute(&self, config: Config) -> Result<()> {
        let options = self.options(&config);
        let addr = format!("{}:{}", options.host, options.port);

        eprintln!(
            "{} Serving {} at {}\n",
            "→".blue(),
            config.graph_source().to_string().dimmed(),
            format!("http://{}{}", addr, config.server.public_path)
                .cyan()
                .underline()
        );

        if options.watch {
            eprintln!("  {} Reload on change {}", "•".dimmed(), "enabled".green());
        }

        eprintln!("  {} Press {} to stop\n", "•".dimmed(), "Ctrl+C".yellow());

        let server = ChunkServer::new(Arc::new(config), options)?;
        server.start().await
    }

    /// Merge command-line flags over the `[server]` config section
    pub fn options(&self, config: &Config) -> ServeOptions {
        ServeOptions {
            host: self
                .host
                .clone()
                .unwrap_or_else(|| config.server.host.clone()),
            port: self.port.unwrap_or(config.server.port),
            watch: config.server.watch && !self.no_watch,
        }
    }
}

/// Chunk server options
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub watch: bool,
}
