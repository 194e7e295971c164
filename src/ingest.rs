//! Ingestion: upstream payloads to per-gameweek records.
//!
//! Every upstream call for a team or gameweek is independent, so they are
//! fanned out and awaited together. A failed call only blanks its own slice:
//! the affected team gets zeros for that gameweek and siblings are unaffected.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{aggregate, captaincy_table, resolve_outcome, settle_season};
use crate::config::{FinanceConfig, LeagueConfig};
use crate::fpl::{
    Bootstrap, EntryHistory, EntryPicks, EntrySummary, FantasyApi, HistoryGameweek, LiveGameweek,
};
use crate::models::{
    CaptaincyEntry, GameweekOutcome, GameweekResult, LeaderboardEntry, Settlement, Team, TeamId,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Upstream data unavailable: {0}")]
    Unavailable(&'static str),
}

/// Gameweeks whose picks are fetched at the same time.
const GAMEWEEK_CONCURRENCY: usize = 4;

/// C+VC: captain points with the captain's multiplier, plus the
/// vice-captain's raw points.
pub fn captaincy_points(picks: &EntryPicks, live: &LiveGameweek) -> i32 {
    let captain = picks
        .captain()
        .map(|c| live.points_for(c.element) * c.multiplier as i32)
        .unwrap_or(0);
    let vice = picks
        .vice_captain()
        .map(|v| live.points_for(v.element))
        .unwrap_or(0);
    captain + vice
}

/// Base record from a history row. Hits are deducted from points.
pub fn result_from_history(team: TeamId, row: &HistoryGameweek) -> GameweekResult {
    GameweekResult::new(
        team,
        row.event,
        row.points - row.event_transfers_cost,
        0,
        row.points_on_bench,
    )
    .with_hits(row.event_transfers_cost)
}

/// Base record from the summary embedded in a picks response.
pub fn result_from_picks(team: TeamId, gameweek: u32, picks: &EntryPicks) -> GameweekResult {
    let h = &picks.entry_history;
    GameweekResult::new(
        team,
        gameweek,
        h.points - h.event_transfers_cost,
        0,
        h.points_on_bench,
    )
    .with_hits(h.event_transfers_cost)
}

/// Every gameweek in an entry's history as records. C+VC is zero here; it
/// needs picks and live scores.
pub fn normalize_history(team: TeamId, history: &EntryHistory) -> Vec<GameweekResult> {
    history
        .current
        .iter()
        .map(|row| {
            let result = result_from_history(team, row);
            match history.chip_for(row.event) {
                Some(chip) => result.with_chip(chip),
                None => result,
            }
        })
        .collect()
}

/// The gameweek in progress, or the latest finished one.
pub fn current_gameweek(bootstrap: &Bootstrap) -> Option<u32> {
    bootstrap.current_gameweek()
}

pub fn finished_gameweeks(bootstrap: &Bootstrap) -> Vec<u32> {
    bootstrap.finished_gameweeks()
}

/// Gameweeks that count towards standings and money: every finished one,
/// plus the current one when `include_live` is set.
pub fn counted_gameweeks(bootstrap: &Bootstrap, include_live: bool) -> Vec<u32> {
    let mut gameweeks = finished_gameweeks(bootstrap);
    if include_live {
        if let Some(current) = current_gameweek(bootstrap) {
            if !gameweeks.contains(&current) {
                gameweeks.push(current);
            }
        }
    }
    gameweeks
}

/// Combine whatever arrived for one team and gameweek into a record.
///
/// History is preferred for points; picks and live scores supply C+VC.
/// Anything missing counts as zero.
pub fn merge_result(
    team: TeamId,
    gameweek: u32,
    history: Option<&EntryHistory>,
    picks: Option<&EntryPicks>,
    live: Option<&LiveGameweek>,
) -> GameweekResult {
    let row = history.and_then(|h| h.current.iter().find(|r| r.event == gameweek));

    let mut result = match (row, picks) {
        (Some(row), _) => result_from_history(team, row),
        (None, Some(picks)) => result_from_picks(team, gameweek, picks),
        (None, None) => GameweekResult::empty(team, gameweek),
    };

    let chip = history
        .and_then(|h| h.chip_for(gameweek))
        .map(str::to_string)
        .or_else(|| picks.and_then(|p| p.active_chip.clone()));
    if let Some(chip) = chip {
        result = result.with_chip(chip);
    }

    if let (Some(picks), Some(live)) = (picks, live) {
        result.captaincy_points = captaincy_points(picks, live);
    }

    result
}

/// Picks for every team plus live scores for one gameweek.
struct GameweekPicks {
    gameweek: u32,
    live: Option<LiveGameweek>,
    picks: Vec<Option<EntryPicks>>,
}

/// Fetches league data through a [`FantasyApi`].
#[derive(Clone)]
pub struct LeagueIngest {
    api: Arc<dyn FantasyApi>,
}

impl LeagueIngest {
    pub fn new(api: Arc<dyn FantasyApi>) -> Self {
        Self { api }
    }

    /// Entry summaries for every team, in team order.
    pub async fn load_entries(&self, teams: &[Team]) -> Vec<Option<EntrySummary>> {
        join_all(teams.iter().map(|t| self.api.entry(t.id))).await
    }

    /// Season histories for every team, in team order.
    pub async fn load_histories(&self, teams: &[Team]) -> Vec<Option<EntryHistory>> {
        join_all(teams.iter().map(|t| self.api.entry_history(t.id))).await
    }

    async fn load_picks(&self, teams: &[Team], gameweek: u32) -> GameweekPicks {
        let live = self.api.live_gameweek(gameweek);
        let picks = join_all(teams.iter().map(|t| self.api.picks(t.id, gameweek)));
        let (live, picks) = tokio::join!(live, picks);

        debug!(
            "GW{}: picks for {}/{} teams, live scores {}",
            gameweek,
            picks.iter().filter(|p| p.is_some()).count(),
            teams.len(),
            if live.is_some() { "ok" } else { "missing" }
        );

        GameweekPicks {
            gameweek,
            live,
            picks,
        }
    }

    /// Records for one gameweek from picks and live scores alone.
    pub async fn load_gameweek(&self, teams: &[Team], gameweek: u32) -> Vec<GameweekResult> {
        let data = self.load_picks(teams, gameweek).await;
        teams
            .iter()
            .zip(&data.picks)
            .map(|(team, picks)| {
                merge_result(team.id, gameweek, None, picks.as_ref(), data.live.as_ref())
            })
            .collect()
    }

    /// Records for every team in each of `gameweeks`, keyed by gameweek.
    pub async fn load_season(
        &self,
        teams: &[Team],
        gameweeks: &[u32],
    ) -> BTreeMap<u32, Vec<GameweekResult>> {
        info!(
            "Loading {} gameweeks for {} teams",
            gameweeks.len(),
            teams.len()
        );

        let histories_fut = self.load_histories(teams);
        let picks_fut = stream::iter(gameweeks.iter().copied())
            .map(|gw| self.load_picks(teams, gw))
            .buffer_unordered(GAMEWEEK_CONCURRENCY)
            .collect::<Vec<GameweekPicks>>();
        let (histories, all_picks) = tokio::join!(histories_fut, picks_fut);

        let mut season = BTreeMap::new();
        for data in all_picks {
            let results = teams
                .iter()
                .zip(&histories)
                .zip(&data.picks)
                .map(|((team, history), picks)| {
                    merge_result(
                        team.id,
                        data.gameweek,
                        history.as_ref(),
                        picks.as_ref(),
                        data.live.as_ref(),
                    )
                })
                .collect();
            season.insert(data.gameweek, results);
        }
        season
    }

    /// Fetch everything the league needs and score it.
    pub async fn snapshot(
        &self,
        league: &LeagueConfig,
        finance: &FinanceConfig,
    ) -> Result<LeagueSnapshot, IngestError> {
        let bootstrap = self
            .api
            .bootstrap()
            .await
            .ok_or(IngestError::Unavailable("bootstrap"))?;
        let gameweeks = counted_gameweeks(&bootstrap, league.include_live_gameweek);
        let season = self.load_season(&league.teams, &gameweeks).await;
        Ok(LeagueSnapshot::build(&bootstrap, league, finance, &season))
    }
}

/// The league scored over every counted gameweek.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueSnapshot {
    pub league: String,
    pub current_gameweek: Option<u32>,
    pub teams: Vec<Team>,
    pub outcomes: Vec<GameweekOutcome>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub captaincy: Vec<CaptaincyEntry>,
    pub settlement: Settlement,
}

impl LeagueSnapshot {
    /// Rank each gameweek, aggregate the season and settle the pot.
    pub fn build(
        bootstrap: &Bootstrap,
        league: &LeagueConfig,
        finance: &FinanceConfig,
        season: &BTreeMap<u32, Vec<GameweekResult>>,
    ) -> Self {
        let outcomes: Vec<GameweekOutcome> = season
            .iter()
            .map(|(&gw, results)| resolve_outcome(gw, bootstrap.is_finished(gw), results))
            .collect();

        let leaderboard = aggregate(&league.teams, &outcomes);
        let captaincy = captaincy_table(&league.teams, &outcomes);
        let settlement = settle_season(&league.teams, &leaderboard, &outcomes, finance);

        info!(
            "Scored {} gameweeks for {} teams",
            outcomes.len(),
            league.teams.len()
        );

        Self {
            league: league.name.clone(),
            current_gameweek: current_gameweek(bootstrap),
            teams: league.teams.clone(),
            outcomes,
            leaderboard,
            captaincy,
            settlement,
        }
    }
}
