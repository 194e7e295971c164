//! # FPL League
//!
//! A dashboard backend for a private Fantasy Premier League mini-league:
//! gameweek winners with tie-breaks, season standings and the league pot.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (teams, gameweek results, placings, money)
//! - **fetch**: HTTP fetcher with an on-disk TTL cache
//! - **fpl**: FPL API client behind the `FantasyApi` trait
//! - **ingest**: Concurrent loading and normalization of upstream data
//! - **calculate**: Ranking, leaderboard aggregation and settlement
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod fpl;
pub mod ingest;
pub mod models;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "1d", "6h", "30m", "90s").
/// A bare number is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86_400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
