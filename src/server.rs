use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InvalidRecordError, SourceError};
use crate::models::{ReclamationRecord, StatsSummary};
use crate::source::{self, RecordSource};
use crate::stats;
use crate::trend::{self, DashboardMetrics};

pub type Clock = fn() -> NaiveDateTime;

#[derive(Debug, Clone)]
pub struct AppState {
    source: Arc<RecordSource>,
    clock: Clock,
}

impl AppState {
    pub fn new(source: RecordSource, clock: Clock) -> Self {
        Self {
            source: Arc::new(source),
            clock,
        }
    }
}

fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: StatsSummary,
    metrics: DashboardMetrics,
}

#[derive(Debug, Deserialize)]
struct TestParams {
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestEnvelope {
    source: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<ReclamationRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
    timestamp: String,
}

#[derive(Debug)]
pub enum ApiError {
    Source(SourceError),
    InvalidRecord(InvalidRecordError),
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

impl From<InvalidRecordError> for ApiError {
    fn from(err: InvalidRecordError) -> Self {
        Self::InvalidRecord(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::Source(err) => {
                tracing::error!(error = %err, "failed to fetch reclamation data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch reclamation data",
                    err.to_string(),
                )
            }
            Self::InvalidRecord(err) => {
                tracing::warn!(error = %err, "rejecting reclamation data");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Invalid reclamation record",
                    err.to_string(),
                )
            }
        };

        let body = ErrorBody {
            error,
            details,
            timestamp: timestamp(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/reclamations", get(reclamations))
        .route("/api/summary", get(summary))
        .route("/api/test", get(source_test))
        .with_state(state)
}

pub async fn run(bind: SocketAddr, source: RecordSource) -> anyhow::Result<()> {
    tracing::info!(source = %source.describe(), "serving reclamation data");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(AppState::new(source, utc_now))).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Backend is running",
    })
}

async fn reclamations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReclamationRecord>>, ApiError> {
    let records = state.source.fetch_all().await?;
    Ok(Json(records))
}

async fn summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    let records = state.source.fetch_all().await?;
    let now = (state.clock)();
    let summary = stats::compute_summary(&records, now)?;
    let metrics = trend::dashboard_metrics(&summary, now.date());
    Ok(Json(SummaryResponse { summary, metrics }))
}

async fn source_test(
    State(state): State<AppState>,
    Query(params): Query<TestParams>,
) -> Response {
    let real = params.mode.as_deref() == Some("real");
    let (label, fetched) = if real {
        (state.source.describe(), state.source.fetch_all().await)
    } else {
        ("Mock Data".to_string(), Ok(source::mock_records()))
    };

    match fetched {
        Ok(records) => Json(TestEnvelope {
            source: label,
            status: "success",
            record_count: Some(records.len()),
            data: Some(records),
            error: None,
            timestamp: timestamp(),
        })
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TestEnvelope {
                source: label,
                status: "error",
                data: None,
                record_count: None,
                error: Some(err.to_string()),
                timestamp: timestamp(),
            }),
        )
            .into_response(),
    }
}
