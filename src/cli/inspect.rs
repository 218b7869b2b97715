//! Inspect command implementation

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::chunkset::{ChunkGraph, ChunkIndex};
use crate::config::Config;
use crate::utils::display_relative;

/// List chunks, names and dependencies
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Summary of one chunk
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChunkSummary {
    pub index: ChunkIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parts: usize,
    /// Backing files, relative to the project root
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    pub depends_on: Vec<ChunkIndex>,
}

/// Summary of a whole graph
#[derive(Debug, Serialize)]
pub struct GraphSummary {
    pub chunks: Vec<ChunkSummary>,
    pub names: BTreeMap<String, ChunkIndex>,
}

impl GraphSummary {
    pub fn new(graph: &ChunkGraph, root: &Path) -> Self {
        let chunks = graph
            .iter()
            .map(|(index, chunk)| {
                let mut depends_on: Vec<_> = chunk.dependencies().collect();
                depends_on.sort_unstable();
                depends_on.dedup();
                let files = chunk
                    .parts
                    .iter()
                    .filter_map(|p| p.source_path())
                    .map(|path| display_relative(root, path))
                    .collect();
                ChunkSummary {
                    index,
                    name: chunk.name.clone(),
                    parts: chunk.len(),
                    files,
                    depends_on,
                }
            })
            .collect();

        let names = graph
            .names()
            .iter()
            .map(|(name, &index)| (name.clone(), index))
            .collect();

        Self { chunks, names }
    }
}

impl InspectCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let source = config.graph_source();
        let graph = source
            .load(&config.load_options())
            .context("Failed to load chunk graph")?;
        let summary = GraphSummary::new(&graph, &config.root);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!(
            "{} {} ({} chunks)",
            "→".blue(),
            source.to_string().cyan(),
            summary.chunks.len()
        );

        for chunk in &summary.chunks {
            let deps = if chunk.depends_on.is_empty() {
                String::new()
            } else {
                let list: Vec<_> = chunk.depends_on.iter().map(|d| d.to_string()).collect();
                format!(" -> [{}]", list.join(", "))
            };

            println!(
                "  {:>4}  {}  {}{}",
                chunk.index,
                chunk.name.as_deref().unwrap_or("-").bold(),
                format!("{} part(s)", chunk.parts).dimmed(),
                deps.yellow()
            );
            for file in &chunk.files {
                println!("          {}", file.dimmed());
            }
        }

        // Names that do not match the chunk's own display name
        for (name, &index) in &summary.names {
            let own = summary.chunks.get(index).and_then(|c| c.name.as_deref());
            if own != Some(name.as_str()) {
                println!("  {} {} -> {}", "alias".dimmed(), name, index);
            }
        }

        Ok(())
    }
}
