use anyhow::Result;
use clap::Parser;
use empresa_radar::config::Config;
use empresa_radar::dispatcher::Dispatcher;
use empresa_radar::resolver::{CityCache, CityResolver, IbgeClient};
use empresa_radar::server::{start_server, ApiState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    info!(
        "Data dir: {}, lookup concurrency: {}",
        config.data_dir.display(),
        config.effective_concurrency()
    );

    let lookup = IbgeClient::new(config.lookup_url.clone(), config.lookup_timeout())?;
    let resolver = CityResolver::new(Arc::new(lookup), Arc::new(CityCache::new()));
    let dispatcher = Dispatcher::new(
        config.data_dir.clone(),
        config.export_file.clone(),
        resolver,
        config.effective_concurrency(),
    );

    start_server(&config.bind_addr(), ApiState::new(dispatcher)).await?;
    Ok(())
}
