//! Thin passthrough of upstream FPL data.

use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_gameweek, ApiError, ApiResponse, ApiResult};
use crate::fpl::{Fixture, LiveGameweek};

#[derive(Debug, Deserialize)]
pub struct GameweekQuery {
    pub gw: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: u32,
    pub name: String,
    pub deadline_time: Option<DateTime<Utc>>,
    pub finished: bool,
    pub is_current: bool,
    pub average_entry_score: i32,
    pub highest_score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct BootstrapSummary {
    pub current_gameweek: Option<u32>,
    pub finished_gameweeks: Vec<u32>,
    pub events: Vec<EventSummary>,
}

/// The gameweek calendar.
pub async fn bootstrap(State(state): State<AppState>) -> ApiResult<BootstrapSummary> {
    let bootstrap = state
        .api
        .bootstrap()
        .await
        .ok_or_else(|| ApiError::Internal("bootstrap unavailable".to_string()))?;

    let events = bootstrap
        .events
        .iter()
        .map(|e| EventSummary {
            id: e.id,
            name: e.name.clone(),
            deadline_time: e.deadline_time,
            finished: e.finished,
            is_current: e.is_current,
            average_entry_score: e.average_entry_score,
            highest_score: e.highest_score,
        })
        .collect();

    Ok(ApiResponse::ok(BootstrapSummary {
        current_gameweek: bootstrap.current_gameweek(),
        finished_gameweeks: bootstrap.finished_gameweeks(),
        events,
    }))
}

pub async fn fixtures(
    State(state): State<AppState>,
    Query(params): Query<GameweekQuery>,
) -> ApiResult<Vec<Fixture>> {
    let gw = parse_gameweek(params.gw.as_deref())?;
    let fixtures = state
        .api
        .fixtures(gw)
        .await
        .ok_or_else(|| ApiError::Internal("fixtures unavailable".to_string()))?;
    Ok(ApiResponse::ok(fixtures))
}

pub async fn live(
    State(state): State<AppState>,
    Query(params): Query<GameweekQuery>,
) -> ApiResult<LiveGameweek> {
    let gw = parse_gameweek(params.gw.as_deref())?
        .ok_or_else(|| ApiError::BadRequest("gw is required".to_string()))?;
    let live = state
        .api
        .live_gameweek(gw)
        .await
        .ok_or_else(|| ApiError::Internal(format!("GW{} live scores unavailable", gw)))?;
    Ok(ApiResponse::ok(live))
}
