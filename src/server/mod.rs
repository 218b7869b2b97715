//! Chunk server
//!
//! Serves assembled chunk batches over HTTP:
//! - named entries and id batches below the configured public path
//! - optional reload of the chunk graph when build output changes

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use parking_lot::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::assembler::{assemble, AssembleError, AssemblyRequest};
use crate::chunkset::ChunkGraph;
use crate::cli::ServeOptions;
use crate::config::Config;
use crate::loader::{GraphSource, LoadOptions};
use crate::utils::hash_content;

pub use routes::{parse_asset_path, ChunkRoute};

/// Shared server state
pub struct ServerState {
    /// Current chunk graph; swapped wholesale on reload
    graph: RwLock<Arc<ChunkGraph>>,

    /// Prefix responses with the request as a comment
    banner: bool,
}

impl ServerState {
    pub fn new(graph: ChunkGraph, banner: bool) -> Self {
        Self {
            graph: RwLock::new(Arc::new(graph)),
            banner,
        }
    }

    /// Snapshot of the current graph
    pub fn graph(&self) -> Arc<ChunkGraph> {
        self.graph.read().clone()
    }

    /// Replace the graph for all subsequent requests
    pub fn replace_graph(&self, graph: ChunkGraph) {
        *self.graph.write() = Arc::new(graph);
    }
}

/// Build the router serving chunks under `public_path`
pub fn build_router(state: Arc<ServerState>, public_path: &str, cors: bool) -> Router {
    let route = format!("{}*asset", public_path);

    let router = Router::new()
        .route(&route, get(serve_chunk))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Chunk server
pub struct ChunkServer {
    /// Project configuration
    config: Arc<Config>,

    /// Server options
    options: ServeOptions,
}

impl ChunkServer {
    /// Create a new chunk server
    pub fn new(config: Arc<Config>, options: ServeOptions) -> Result<Self> {
        Ok(Self { config, options })
    }

    /// Load the graph and serve until the process is stopped
    pub async fn start(&self) -> Result<()> {
        let addr = resolve_addr(&self.options.host, self.options.port).await?;

        let source = self.config.graph_source();
        let load_options = self.config.load_options();
        let graph = source.load(&load_options)?;

        let state = Arc::new(ServerState::new(graph, self.config.server.banner));

        if self.options.watch {
            setup_graph_watcher(source, load_options, state.clone())?;
        }

        let app = build_router(
            state,
            &self.config.server.public_path,
            self.config.server.cors,
        );

        info!("Server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {}:{}", host, port))?
        .next()
        .with_context(|| format!("No address found for {}:{}", host, port))
}

/// Reload the graph whenever the chunk source changes
fn setup_graph_watcher(
    source: GraphSource,
    options: LoadOptions,
    state: Arc<ServerState>,
) -> Result<()> {
    let watch_path = source.watch_path();
    let mode = match source {
        GraphSource::Directory(_) => RecursiveMode::NonRecursive,
        GraphSource::Manifest(_) => RecursiveMode::Recursive,
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(100), tx)?;
    debouncer
        .watcher()
        .watch(&watch_path, mode)
        .with_context(|| format!("Failed to watch {}", watch_path.display()))?;

    debug!("Watching {} for changes", watch_path.display());

    // The debouncer is moved into the thread to keep it alive
    std::thread::spawn(move || {
        let _debouncer = debouncer;

        loop {
            match rx.recv() {
                Ok(Ok(events)) => {
                    if !events.is_empty() {
                        reload_graph(&source, &options, &state);
                    }
                }
                Ok(Err(e)) => {
                    error!("Watch error: {:?}", e);
                }
                Err(_) => break,
            }
        }
    });

    Ok(())
}

/// Rebuild the graph from `source`. On failure the previous graph stays in
/// place and `false` is returned.
fn reload_graph(source: &GraphSource, options: &LoadOptions, state: &ServerState) -> bool {
    match source.load(options) {
        Ok(graph) => {
            eprintln!("  {} Reloaded {} chunks", "↻".yellow(), graph.len());
            state.replace_graph(graph);
            true
        }
        Err(e) => {
            error!("Failed to reload chunk graph, keeping previous: {:#}", e);
            false
        }
    }
}

/// Serve an assembled chunk batch
async fn serve_chunk(
    State(state): State<Arc<ServerState>>,
    Path(asset): Path<String>,
) -> Response {
    let graph = state.graph();

    let request = match parse_asset_path(&asset, &graph) {
        Ok(ChunkRoute::Assemble(request)) => request,
        Ok(ChunkRoute::SourceMap) => {
            return ([(header::CONTENT_TYPE, "application/json")], "{}").into_response();
        }
        Ok(ChunkRoute::NotFound) => {
            return (StatusCode::NOT_FOUND, format!("Not a chunk: {}", asset)).into_response();
        }
        Err(e) => {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    debug!(?request, "assembling");

    // Part bodies may be read from disk
    let content = {
        let request = request.clone();
        tokio::task::spawn_blocking(move || assemble(&graph, &request)).await
    };

    match content {
        Ok(Ok(content)) => chunk_response(&request, content, state.banner),
        Ok(Err(e)) => assemble_error_response(&asset, e),
        Err(e) => {
            error!("Assembly task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Assembly failed").into_response()
        }
    }
}

fn chunk_response(request: &AssemblyRequest, content: Vec<u8>, banner: bool) -> Response {
    let mut body = Vec::with_capacity(content.len() + 64);
    if banner {
        match serde_json::to_string(request) {
            Ok(json) => body.extend_from_slice(format!("/** {} */\n", json).as_bytes()),
            Err(e) => warn!("Failed to serialize request banner: {}", e),
        }
    }
    body.extend_from_slice(&content);

    let etag = format!("\"{}\"", hash_content(&body));
    let headers = [
        (header::CONTENT_TYPE, request.content_type.mime().to_string()),
        (header::ETAG, etag),
    ];

    (headers, body).into_response()
}

fn assemble_error_response(asset: &str, err: AssembleError) -> Response {
    if err.is_not_found() {
        debug!("Chunk request {} failed: {}", asset, err);
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    }

    error!("Failed to assemble {}: {:#}", asset, anyhow::Error::from(err));
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to assemble chunks").into_response()
}
