//! Retail Intelligence — interactive retail analytics backend.
//!
//! Main entry point: loads configuration, warms the dataset cache, and
//! serves the REST API.

use clap::Parser;
use retail_api::ApiServer;
use retail_core::config::AppConfig;
use retail_datasets::DatasetStore;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "retail-intel")]
#[command(about = "Retail analytics backend: filters, KPIs, RFM segmentation, what-if forecasting")]
#[command(version)]
struct Cli {
    /// Bind host (overrides config)
    #[arg(long, env = "RETAIL_INTEL__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "RETAIL_INTEL__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Directory holding the input workbooks (overrides config)
    #[arg(long, env = "RETAIL_INTEL__DATA__DATA_DIR")]
    data_dir: Option<String>,

    /// Skip the eager dataset load at startup
    #[arg(long, default_value_t = false)]
    lazy_load: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retail_intel=info,retail_datasets=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Retail Intelligence starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    info!(
        host = %config.api.host,
        http_port = config.api.http_port,
        data_dir = %config.data.data_dir,
        "configuration loaded"
    );

    let store = Arc::new(DatasetStore::new(config.data.clone()));

    // Warm the snapshot up front so the first request doesn't pay for the
    // disk load. Failure here is not fatal: the load is retried on demand
    // and surfaces per-request if the files stay unreadable.
    if !cli.lazy_load {
        match store.snapshot() {
            Ok(data) => info!(
                sales_rows = data.sales.rows.len(),
                forecast_rows = data.forecast.rows.len(),
                "datasets warmed"
            ),
            Err(e) => warn!(error = %e, "dataset warm-up failed, deferring to first request"),
        }
    }

    let server = ApiServer::new(config, store);

    info!("Retail Intelligence is ready to serve traffic");

    server.start_http().await?;

    Ok(())
}
