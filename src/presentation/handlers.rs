// HTTP request handlers
use crate::application::chart_service::ChartError;
use crate::domain::chart_request::{ChartKind, ChartRequest};
use crate::domain::chart_series::{ChartSeries, MIN_CHART_WIDTH_PX, PX_PER_CATEGORY};
use crate::domain::flatten::{flatten_with_policy, FlatRecord, FlattenPolicy, FlattenReport};
use crate::domain::record_table::{query_table, TableQuery};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, error_response, respond};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DecodeQuery {
    pub strict: Option<bool>,
}

#[derive(Deserialize)]
pub struct ViewLoadRequest {
    pub kind: ChartKind,
    pub option: String,
}

#[derive(Deserialize)]
pub struct TableRequest {
    #[serde(default)]
    pub records: Vec<FlatRecord>,
    #[serde(flatten)]
    pub query: TableQuery,
}

#[derive(Serialize)]
struct DecodeResponse {
    records: Vec<FlatRecord>,
    report: FlattenReport,
}

#[derive(Serialize)]
struct SeriesResponse {
    #[serde(flatten)]
    chart: ChartSeries,
    min_width_px: u32,
}

fn parse_request(kind: &str, option: String) -> Result<ChartRequest, Response> {
    kind.parse::<ChartKind>()
        .map(|kind| ChartRequest::new(kind, option))
        .map_err(|e| error_response(StatusCode::NOT_FOUND, e))
}

fn chart_error_response(e: ChartError) -> Response {
    match e {
        ChartError::Backend(_) => {
            tracing::error!("Error fetching chart: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
        ChartError::Flatten(_) => {
            tracing::warn!("Rejected chart payload: {}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Flat records of one chart
pub async fn get_chart_records(
    Path((kind, option)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let request = match parse_request(&kind, option) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.chart_service.load_chart(&request).await {
        Ok(loaded) => respond(&loaded.records, accepts_brotli(&headers)).await,
        Err(e) => chart_error_response(e),
    }
}

/// One series per legend group on a shared category axis
pub async fn get_chart_series(
    Path((kind, option)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let request = match parse_request(&kind, option) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.chart_service.load_series(&request).await {
        Ok(chart) => {
            let min_width_px = chart.min_width_px(PX_PER_CATEGORY, MIN_CHART_WIDTH_PX);
            respond(&SeriesResponse { chart, min_width_px }, accepts_brotli(&headers)).await
        }
        Err(e) => chart_error_response(e),
    }
}

/// Stream a chart progressively (skeleton, series, completion)
pub async fn stream_chart(
    Path((kind, option)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let request = match parse_request(&kind, option) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let rx = state.streaming_service.stream_chart(request).await;
    stream_from_receiver(rx, accepts_brotli(&headers))
        .await
        .into_response()
}

/// Flatten a payload supplied by the client
pub async fn decode_payload(
    Query(query): Query<DecodeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Response {
    let policy = match query.strict {
        Some(true) => FlattenPolicy::Strict,
        Some(false) => FlattenPolicy::Lenient,
        None => state.default_policy,
    };

    match flatten_with_policy(&payload, policy) {
        Ok(flattened) => {
            let report = flattened.report.clone();
            let body = DecodeResponse {
                records: flattened.into_records(),
                report,
            };
            respond(&body, accepts_brotli(&headers)).await
        }
        Err(e) => {
            tracing::warn!("Rejected posted payload: {}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

/// Start (or restart) loading a chart into a view
pub async fn start_view_load(
    Path(view_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ViewLoadRequest>,
) -> Response {
    let request = ChartRequest::new(body.kind, body.option);
    let request_id = state.chart_service.start_view_load(&view_id, request).await;
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "view": view_id, "request_id": request_id })),
    )
        .into_response()
}

pub async fn get_view(
    Path(view_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.chart_service.view_state(&view_id).await {
        Some(view) => respond(&view, accepts_brotli(&headers)).await,
        None => error_response(StatusCode::NOT_FOUND, format!("unknown view '{}'", view_id)),
    }
}

pub async fn close_view(
    Path(view_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if state.chart_service.close_view(&view_id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, format!("unknown view '{}'", view_id))
    }
}

/// Search and sort records for table views
pub async fn query_records_table(headers: HeaderMap, Json(body): Json<TableRequest>) -> Response {
    let rows = query_table(&body.records, &body.query);
    respond(&rows, accepts_brotli(&headers)).await
}
