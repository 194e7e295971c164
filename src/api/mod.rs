//! REST API endpoints.
//!
//! Axum-based HTTP API serving league standings, gameweek results,
//! finances and a thin passthrough of upstream FPL data.
//!
//! Every `/api` response is wrapped in the same envelope:
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::ingest::IngestError;
use crate::models::{is_valid_gameweek, MAX_GAMEWEEK};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler result carrying an enveloped payload.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

/// Parse an optional `gw` query value, rejecting anything outside the season.
pub fn parse_gameweek(raw: Option<&str>) -> Result<Option<u32>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(gw) if is_valid_gameweek(gw) => Ok(Some(gw)),
        _ => Err(ApiError::BadRequest(format!(
            "gw must be between 1 and {}, got '{}'",
            MAX_GAMEWEEK, raw
        ))),
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/teams", get(routes::league::teams))
        .route("/api/standings", get(routes::league::standings))
        .route("/api/gameweeks", get(routes::league::gameweeks))
        .route("/api/captaincy", get(routes::league::captaincy))
        .route("/api/finances", get(routes::league::finances))
        .route("/api/gameweek", get(routes::gameweek::gameweek))
        .route("/api/bootstrap", get(routes::upstream::bootstrap))
        .route("/api/fixtures", get(routes::upstream::fixtures))
        .route("/api/live", get(routes::upstream::live))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
