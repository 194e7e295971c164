//! Derived statistics models.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// Season aggregates for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    /// Gameweek wins (shared wins included)
    pub wins: u32,

    /// Gameweek runner-up finishes
    pub seconds: u32,

    /// Gameweek last places
    pub lasts: u32,

    /// Gameweeks topping the C+VC table
    pub captaincy_wins: u32,

    /// Net points across all counted gameweeks
    pub total_points: i32,

    pub total_captaincy_points: i32,

    pub total_bench_points: i32,

    /// Points lost to transfer hits
    pub total_hits: i32,

    pub gameweeks_played: u32,
}

impl TeamStats {
    /// Average net points per gameweek played.
    pub fn average_points(&self) -> f64 {
        if self.gameweeks_played == 0 {
            0.0
        } else {
            self.total_points as f64 / self.gameweeks_played as f64
        }
    }

    /// Whether the team has no placing of any kind.
    pub fn has_no_placings(&self) -> bool {
        self.wins == 0 && self.seconds == 0 && self.lasts == 0 && self.captaincy_wins == 0
    }
}

/// One row of the season leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Standard competition position (1, 2, 2, 4)
    pub position: u32,

    pub team_id: TeamId,

    pub team_name: String,

    #[serde(flatten)]
    pub stats: TeamStats,

    /// Rounded to one decimal place
    pub average_points: f64,
}

impl LeaderboardEntry {
    pub fn new(team_id: TeamId, team_name: String, stats: TeamStats) -> Self {
        let average_points = (stats.average_points() * 10.0).round() / 10.0;
        Self {
            position: 0,
            team_id,
            team_name,
            stats,
            average_points,
        }
    }
}

/// One row of the season captaincy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptaincyEntry {
    pub position: u32,
    pub team_id: TeamId,
    pub team_name: String,
    pub total_captaincy_points: i32,
    pub total_points: i32,
    pub captaincy_wins: u32,
}
