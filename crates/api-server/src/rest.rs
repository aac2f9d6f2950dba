//! REST handlers. Per the platform's error-handling design, handlers only
//! fail for unreadable inputs; degraded data (missing columns, empty
//! views) produces empty or zero results, never a fault.

use crate::animation::AnimationFetcher;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use retail_analytics::{charts, export, filter, SalesFilter};
use retail_analytics::{compute_kpis, compute_segments, segment_distribution, simulate};
use retail_core::config::AppConfig;
use retail_core::types::{
    ChurnRecord, ChurnSummary, CustomerRfmProfile, FilterOptions, ForecastPoint, KpiSummary,
    SalesRecord, SegmentCount, SimulatedForecastPoint,
};
use retail_core::RetailError;
use retail_datasets::DatasetStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// How many churned-customer rows the churn endpoint previews.
const CHURNED_PREVIEW_ROWS: usize = 10;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
    pub animations: Arc<AnimationFetcher>,
    pub config: AppConfig,
    pub start_time: Instant,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn dataset_error(e: RetailError) -> ApiError {
    error!(error = %e, "dataset snapshot unavailable");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "dataset_unavailable".to_string(),
            message: e.to_string(),
        }),
    )
}

fn export_error(e: RetailError) -> ApiError {
    error!(error = %e, "export serialization failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "export_failed".to_string(),
            message: e.to_string(),
        }),
    )
}

// ─── Operational ────────────────────────────────────────────────────────────

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        datasets_loaded: state.store.is_loaded(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ─── Filters & sales ────────────────────────────────────────────────────────

/// GET /v1/filters/options — selection lists for the filter controls.
pub async fn filter_options(
    State(state): State<AppState>,
) -> Result<Json<FilterOptions>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    Ok(Json(filter::filter_options(&data.sales.rows)))
}

/// POST /v1/sales/query — filtered rows plus their KPI summary.
pub async fn sales_query(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Json<SalesQueryResponse>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let rows = request.apply(&data.sales.rows);
    let kpis = compute_kpis(&rows);
    Ok(Json(SalesQueryResponse {
        row_count: rows.len(),
        kpis,
        rows,
    }))
}

/// POST /v1/kpis — KPI cards for the filtered view.
pub async fn kpis(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Json<KpiSummary>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let rows = request.apply(&data.sales.rows);
    Ok(Json(compute_kpis(&rows)))
}

/// POST /v1/charts/sales — chart series for the sales tab. A series whose
/// backing column is absent comes back empty rather than erroring.
pub async fn sales_charts(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Json<SalesChartsResponse>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let rows = request.apply(&data.sales.rows);

    let monthly_revenue = if data.sales.schema.has("order_date") {
        charts::monthly_revenue(&rows)
    } else {
        Vec::new()
    };
    let revenue_by_country = if data.sales.schema.has("country_name") {
        charts::revenue_by_country(&rows)
    } else {
        Vec::new()
    };

    Ok(Json(SalesChartsResponse {
        monthly_revenue,
        revenue_by_country,
    }))
}

// ─── Segmentation ───────────────────────────────────────────────────────────

/// GET /v1/segments — RFM profiles over the FULL dataset. Deliberately
/// takes no filter body: quintile bins need the whole population.
pub async fn segments(State(state): State<AppState>) -> Result<Json<SegmentsResponse>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let profiles = compute_segments(&data.sales.rows);
    let distribution = segment_distribution(&profiles);
    Ok(Json(SegmentsResponse {
        profiles,
        distribution,
    }))
}

// ─── Churn ──────────────────────────────────────────────────────────────────

/// POST /v1/churn — country-filtered churn summary plus a preview of
/// churned customers.
pub async fn churn(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Json<ChurnResponse>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let summary = request.restrict_churn(&data.churn_summary.rows, &data.churn_summary.schema);
    let by_country = charts::churn_by_country(&summary);
    let churned_preview = data
        .churned
        .rows
        .iter()
        .take(CHURNED_PREVIEW_ROWS)
        .cloned()
        .collect();
    Ok(Json(ChurnResponse {
        by_country,
        churned_preview,
    }))
}

// ─── Forecast & what-if ─────────────────────────────────────────────────────

/// POST /v1/forecast/simulate — the forecast series (country-restricted
/// when the table carries a country column) plus its what-if adjustment.
pub async fn simulate_forecast(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let country_filter = SalesFilter {
        countries: request.countries,
        ..SalesFilter::default()
    };
    let forecast = country_filter.restrict_forecast(&data.forecast.rows, &data.forecast.schema);
    let simulated = simulate(
        &forecast,
        request.growth_pct,
        request.churn_reduction_pct,
        request.discount_pct,
    );
    let has_confidence_interval =
        data.forecast.schema.has("lower_ci") && data.forecast.schema.has("upper_ci");

    Ok(Json(SimulateResponse {
        forecast,
        simulated,
        has_confidence_interval,
    }))
}

// ─── Export ─────────────────────────────────────────────────────────────────

/// POST /v1/export/csv — the filtered view as a CSV download.
pub async fn export_csv(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Response, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let rows = request.apply(&data.sales.rows);
    let body = export::to_csv(&rows).map_err(export_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"filtered_sales.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /v1/export/xlsx — the filtered view as a spreadsheet download.
pub async fn export_xlsx(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Response, ApiError> {
    let data = state.store.snapshot().map_err(dataset_error)?;
    let rows = request.apply(&data.sales.rows);
    let body = export::to_xlsx(&rows).map_err(export_error)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"filtered_sales.xlsx\"",
            ),
        ],
        body,
    )
        .into_response())
}

// ─── Decoration ─────────────────────────────────────────────────────────────

/// GET /v1/animation — the hero animation JSON, or null when disabled or
/// unreachable. Never an error status.
pub async fn animation(State(state): State<AppState>) -> Json<AnimationResponse> {
    let animation = if state.config.animation.enabled {
        state.animations.fetch(&state.config.animation.url).await
    } else {
        None
    };
    Json(AnimationResponse { animation })
}

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub datasets_loaded: bool,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct SalesQueryResponse {
    pub row_count: usize,
    pub kpis: KpiSummary,
    pub rows: Vec<SalesRecord>,
}

#[derive(Debug, Serialize)]
pub struct SalesChartsResponse {
    pub monthly_revenue: Vec<retail_core::types::MonthlyRevenuePoint>,
    pub revenue_by_country: Vec<retail_core::types::CountryRevenue>,
}

#[derive(Debug, Serialize)]
pub struct SegmentsResponse {
    pub profiles: Vec<CustomerRfmProfile>,
    pub distribution: Vec<SegmentCount>,
}

#[derive(Debug, Serialize)]
pub struct ChurnResponse {
    pub by_country: Vec<ChurnSummary>,
    pub churned_preview: Vec<ChurnRecord>,
}

/// What-if request. The slider bounds (growth −20..50, churn-reduction
/// 0..50, discount −10..10) are enforced by the UI controls; the engine
/// accepts any real values.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub growth_pct: f64,
    #[serde(default)]
    pub churn_reduction_pct: f64,
    #[serde(default)]
    pub discount_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub forecast: Vec<ForecastPoint>,
    pub simulated: Vec<SimulatedForecastPoint>,
    pub has_confidence_interval: bool,
}

#[derive(Debug, Serialize)]
pub struct AnimationResponse {
    pub animation: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
