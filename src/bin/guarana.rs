//! CLI entry point.

use clap::Parser;
use guarana_gateway::cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guarana_gateway=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    Cli::parse().run().await
}
