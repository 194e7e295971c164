use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_gameweek, ApiError, ApiResponse, ApiResult};
use crate::calculate::{resolve_outcome, settle_gameweek};
use crate::models::{choose_gameweek, team_name, GameweekSettlement, Placing, RankedResult};

#[derive(Debug, Deserialize)]
pub struct GameweekParams {
    pub gw: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NamedResult {
    pub team_name: String,
    #[serde(flatten)]
    pub ranked: RankedResult,
}

#[derive(Debug, Serialize)]
pub struct GameweekResponse {
    pub gameweek: u32,
    pub name: String,
    pub deadline_time: Option<DateTime<Utc>>,
    pub finished: bool,
    pub top_score: Option<i32>,
    pub table: Vec<NamedResult>,
    pub winner: Option<Placing>,
    pub runner_up: Option<Placing>,
    pub last: Option<Placing>,
    pub captaincy_winner: Option<Placing>,
    pub settlement: GameweekSettlement,
}

/// One gameweek scored from picks and live points. Defaults to the current
/// gameweek.
pub async fn gameweek(
    State(state): State<AppState>,
    Query(params): Query<GameweekParams>,
) -> ApiResult<GameweekResponse> {
    let requested = parse_gameweek(params.gw.as_deref())?;

    let bootstrap = state
        .api
        .bootstrap()
        .await
        .ok_or_else(|| ApiError::Internal("bootstrap unavailable".to_string()))?;

    let gw = choose_gameweek(requested, bootstrap.current_gameweek())
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    let config = &state.config;
    let teams = &config.league.teams;
    let results = state.ingest.load_gameweek(teams, gw).await;
    let outcome = resolve_outcome(gw, bootstrap.is_finished(gw), &results);
    let settlement = settle_gameweek(&outcome, &config.finance);
    let event = bootstrap.event(gw);
    let top_score = outcome.top_score();

    let table = outcome
        .table
        .into_iter()
        .map(|ranked| NamedResult {
            team_name: team_name(teams, ranked.result.team_id),
            ranked,
        })
        .collect();

    Ok(ApiResponse::ok(GameweekResponse {
        gameweek: gw,
        name: event
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("Gameweek {}", gw)),
        deadline_time: event.and_then(|e| e.deadline_time),
        finished: outcome.finished,
        top_score,
        table,
        winner: outcome.winner,
        runner_up: outcome.runner_up,
        last: outcome.last,
        captaincy_winner: outcome.captaincy_winner,
        settlement,
    }))
}
