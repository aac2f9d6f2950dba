//! HTTP server assembly — routes, middleware, bind.

use crate::animation::AnimationFetcher;
use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use retail_core::config::AppConfig;
use retail_datasets::DatasetStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    store: Arc<DatasetStore>,
}

impl ApiServer {
    pub fn new(config: AppConfig, store: Arc<DatasetStore>) -> Self {
        Self { config, store }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            animations: Arc::new(AnimationFetcher::new(self.config.animation.timeout_secs)),
            config: self.config.clone(),
            start_time: Instant::now(),
        };

        Router::new()
            .route("/health", get(rest::health))
            .route("/v1/filters/options", get(rest::filter_options))
            .route("/v1/sales/query", post(rest::sales_query))
            .route("/v1/kpis", post(rest::kpis))
            .route("/v1/charts/sales", post(rest::sales_charts))
            .route("/v1/segments", get(rest::segments))
            .route("/v1/churn", post(rest::churn))
            .route("/v1/forecast/simulate", post(rest::simulate_forecast))
            .route("/v1/export/csv", post(rest::export_csv))
            .route("/v1/export/xlsx", post(rest::export_xlsx))
            .route("/v1/animation", get(rest::animation))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP server (blocks until shutdown).
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
