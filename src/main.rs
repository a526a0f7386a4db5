//! Traffic aggregator service entry point.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use traffic_aggregator::api::{create_router, AppState};
use traffic_aggregator::config::Config;
use traffic_aggregator::error::AggregatorError;
use traffic_aggregator::metrics;
use traffic_aggregator::traffic::{TomTomClient, TrafficAggregator, GRID_SIZE};
use traffic_aggregator::utils::shutdown_signal;

/// Area traffic congestion service.
#[derive(Parser, Debug)]
#[command(name = "traffic-aggregator")]
#[command(about = "Serves per-point congestion levels sampled around a coordinate")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Bind address (overrides HOST).
    #[arg(long)]
    host: Option<String>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Validate configuration and exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    // Initialize logging
    let filter = if args.verbose || config.verbose {
        EnvFilter::new("traffic_aggregator=debug,info")
    } else {
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(config.log_json.then(|| fmt::layer().json()))
        .with((!config.log_json).then(|| fmt::layer()))
        .with(filter)
        .init();

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(AggregatorError::InvalidConfig(e).into());
    }

    if args.check_config {
        info!("Configuration OK");
        info!("Flow URL: {}", config.tomtom_flow_url);
        info!("Timeout: {}ms", config.http_timeout_ms);
        info!("Concurrency: {}", config.max_concurrent_requests);
        info!("Default center: {}", config.default_center());
        return Ok(());
    }

    run(config).await?;
    Ok(())
}

/// Serve the HTTP API until a shutdown signal arrives.
async fn run(config: Config) -> traffic_aggregator::Result<()> {
    // Initialize metrics
    let prometheus = metrics::install_recorder();
    metrics::init_metrics();

    let client = TomTomClient::new(&config)?;
    let aggregator = TrafficAggregator::new(Arc::new(client), config.max_concurrent_requests);

    info!("Flow URL: {}", config.tomtom_flow_url);
    info!(
        "Grid: {} points, {} concurrent lookups, {}ms timeout",
        GRID_SIZE, config.max_concurrent_requests, config.http_timeout_ms
    );

    let state = AppState::new(aggregator, config.default_center()).with_metrics(prometheus);
    let router = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
