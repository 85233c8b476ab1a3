// Numan Thabit 2025
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use grafana_ntfy_relay::{
    config::{CliArgs, Config},
    http,
    metrics::RelayMetrics,
    NtfyDispatcher, Relay,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = CliArgs::parse();
    let config = Config::from_cli(&cli)?;

    let dispatcher = NtfyDispatcher::new(&config.ntfy_url, &config.topic, config.dispatch_timeout)
        .context("failed to build ntfy dispatcher")?;
    info!(endpoint = %dispatcher.endpoint(), "forwarding alerts");

    let metrics = RelayMetrics::new()?;
    let relay = Relay::new(&config.auth_token, Arc::new(dispatcher), metrics);

    http::serve(config.listen, http::router(relay, config.http_trace)).await
}
