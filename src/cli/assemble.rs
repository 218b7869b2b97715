//! Assemble command implementation

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::assembler::{assemble, collect_parts, AssemblyRequest, ContentType};
use crate::config::Config;
use crate::utils::{format_duration, format_size};

/// Assemble chunks and write the result
#[derive(Args, Debug)]
pub struct AssembleCommand {
    /// Chunk ids to include (repeatable, or comma-separated)
    #[arg(short = 'i', long = "id", value_delimiter = ',')]
    pub ids: Vec<usize>,

    /// Chunk names to include (repeatable, or comma-separated)
    #[arg(short = 'n', long = "name", value_delimiter = ',')]
    pub names: Vec<String>,

    /// Only emit the requested chunks, without their dependencies
    #[arg(long)]
    pub no_deps: bool,

    /// Content type of the output (js, mjs, css)
    #[arg(short = 't', long, default_value = "js")]
    pub content_type: ContentType,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print the chunks and parts that would be emitted, without reading them
    #[arg(long)]
    pub dry_run: bool,
}

impl AssembleCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let request = self.request();
        if request.is_empty() {
            anyhow::bail!("Nothing to assemble: pass at least one --id or --name");
        }

        let graph = config
            .graph_source()
            .load(&config.load_options())
            .context("Failed to load chunk graph")?;

        if self.dry_run {
            let parts = collect_parts(&graph, &request)?;
            let mut stdout = io::stdout().lock();
            for part_ref in parts {
                let name = graph
                    .chunk(part_ref.chunk)
                    .and_then(|c| c.name.as_deref())
                    .unwrap_or("-");
                writeln!(stdout, "{}:{}\t{}", part_ref.chunk, part_ref.index, name)?;
            }
            return Ok(());
        }

        let start = Instant::now();
        let content = assemble(&graph, &request)?;
        info!("Assembled {} bytes in {:?}", content.len(), start.elapsed());

        match &self.out {
            Some(path) => {
                fs::write(path, &content)
                    .with_context(|| format!("Failed to write output: {}", path.display()))?;

                eprintln!(
                    "{} Wrote {} ({}) in {}",
                    "✓".green().bold(),
                    path.display().to_string().cyan(),
                    format_size(content.len()).dimmed(),
                    format_duration(start.elapsed())
                );
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(&content)?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Build the assembly request from the arguments
    pub fn request(&self) -> AssemblyRequest {
        AssemblyRequest {
            chunk_ids: self.ids.clone(),
            chunk_names: self.names.clone(),
            content_type: self.content_type,
            include_deps: !self.no_deps,
        }
    }
}
