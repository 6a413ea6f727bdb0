//! quickblob - Azure Blob Storage quickstart
//!
//! Creates a container, uploads a file, lists the container, downloads the
//! file and cleans up, printing each step to the console.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickblob::cli::Cli;
use quickblob::config;
use quickblob::error::Result;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug || debug_from_env());

    // Execute the command
    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting quickblob");

    let config = config::load_config(cli.config.as_deref()).await?;

    cli.execute(config).await
}

fn debug_from_env() -> bool {
    std::env::var("DEBUG")
        .map(|value| value.to_lowercase() == "true" || value == "1")
        .unwrap_or(false)
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "quickblob=debug" } else { "quickblob=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
