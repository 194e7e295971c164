//! Season-wide views: teams, standings, gameweek outcomes, captaincy, money.

use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{ApiError, ApiResponse, ApiResult};
use crate::ingest::LeagueSnapshot;
use crate::models::{CaptaincyEntry, GameweekOutcome, LeaderboardEntry, Settlement};

async fn snapshot(state: &AppState) -> Result<LeagueSnapshot, ApiError> {
    let config = &state.config;
    Ok(state
        .ingest
        .snapshot(&config.league, &config.finance)
        .await?)
}

#[derive(Debug, Serialize)]
pub struct TeamView {
    pub id: u64,
    pub name: String,
    pub manager: Option<String>,
    pub entry_name: Option<String>,
    pub overall_points: Option<i32>,
    pub overall_rank: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub league: String,
    pub teams: Vec<TeamView>,
}

/// Configured teams, enriched with their FPL entry where it can be fetched.
pub async fn teams(State(state): State<AppState>) -> ApiResult<TeamsResponse> {
    let league = &state.config.league;
    let entries = state.ingest.load_entries(&league.teams).await;

    let teams = league
        .teams
        .iter()
        .zip(entries)
        .map(|(team, entry)| TeamView {
            id: team.id.entry_id(),
            name: team.name.clone(),
            manager: team
                .manager
                .clone()
                .or_else(|| entry.as_ref().map(|e| e.manager_name())),
            entry_name: entry.as_ref().map(|e| e.name.clone()),
            overall_points: entry.as_ref().and_then(|e| e.summary_overall_points),
            overall_rank: entry.as_ref().and_then(|e| e.summary_overall_rank),
        })
        .collect();

    Ok(ApiResponse::ok(TeamsResponse {
        league: league.name.clone(),
        teams,
    }))
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub league: String,
    pub current_gameweek: Option<u32>,
    pub gameweeks_counted: usize,
    pub standings: Vec<LeaderboardEntry>,
}

pub async fn standings(State(state): State<AppState>) -> ApiResult<StandingsResponse> {
    let snap = snapshot(&state).await?;
    Ok(ApiResponse::ok(StandingsResponse {
        league: snap.league,
        current_gameweek: snap.current_gameweek,
        gameweeks_counted: snap.outcomes.len(),
        standings: snap.leaderboard,
    }))
}

#[derive(Debug, Serialize)]
pub struct GameweeksResponse {
    pub gameweeks: Vec<GameweekOutcome>,
}

pub async fn gameweeks(State(state): State<AppState>) -> ApiResult<GameweeksResponse> {
    let snap = snapshot(&state).await?;
    Ok(ApiResponse::ok(GameweeksResponse {
        gameweeks: snap.outcomes,
    }))
}

#[derive(Debug, Serialize)]
pub struct CaptaincyResponse {
    pub captaincy: Vec<CaptaincyEntry>,
}

pub async fn captaincy(State(state): State<AppState>) -> ApiResult<CaptaincyResponse> {
    let snap = snapshot(&state).await?;
    Ok(ApiResponse::ok(CaptaincyResponse {
        captaincy: snap.captaincy,
    }))
}

pub async fn finances(State(state): State<AppState>) -> ApiResult<Settlement> {
    let snap = snapshot(&state).await?;
    Ok(ApiResponse::ok(snap.settlement))
}
