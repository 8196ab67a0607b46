mod cli;

use std::sync::Arc;

use adfetch::adlib::GraphClientFactory;
use adfetch::api::{self, AppState, models::DownloadRequest};
use adfetch::config::Config;
use adfetch::media::SnapshotDownloader;
use adfetch::normalize::Defaults;
use adfetch::observability;
use adfetch::pipeline::DownloadPipeline;
use adfetch::storage::StorageClient;
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use tracing::info;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();

    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
    observability::init_tracing(&config.telemetry.log_filter);

    match cli.command {
        Commands::Server(args) => {
            let address = args.address.unwrap_or(config.server.bind_addr);
            let pipeline = build_pipeline(&config)?;
            api::run(address, AppState::new(config, pipeline)).await?
        }
        Commands::Run(args) => run_once(&config, args).await?,
    }

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<DownloadPipeline, AnyError> {
    let storage = StorageClient::from_config(&config.media)?;
    info!(location = %storage.location, "Media storage ready");

    let clients = GraphClientFactory::new(config.adlib.clone());
    let media = SnapshotDownloader::new(&config.media, storage);

    Ok(DownloadPipeline::new(
        Arc::new(clients),
        Arc::new(media),
        Defaults::from(&config.adlib),
    ))
}

async fn run_once(config: &Config, args: RunArgs) -> Result<(), AnyError> {
    let body = tokio::fs::read(&args.request)
        .await
        .map_err(|e| format!("cannot read {}: {}", args.request.display(), e))?;

    let request: DownloadRequest = serde_json::from_slice(&body)?;
    let request = api::validate_request(request)?;

    let response = build_pipeline(config)?.run(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
