//! dynbundle - assemble pre-built chunks into a single response
//!
//! Bundlers emit many small chunks; dynbundle concatenates any combination of
//! them, with or without their dependencies, so a page can load them in one
//! request.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dynbundle_lib::Cli;

/// Initialize the logging/tracing system
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "dynbundle=debug,dynbundle_lib=debug,tower_http=debug"
    } else {
        "dynbundle=info,dynbundle_lib=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    cli.execute().await
}
