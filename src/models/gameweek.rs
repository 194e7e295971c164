//! Per-gameweek records and resolved outcomes.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// Last gameweek of a Premier League season.
pub const MAX_GAMEWEEK: u32 = 38;

/// Whether a gameweek number is inside the season.
pub fn is_valid_gameweek(gameweek: u32) -> bool {
    (1..=MAX_GAMEWEEK).contains(&gameweek)
}

/// Why no gameweek could be chosen for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameweekChoiceError {
    #[error("Gameweek {0} has not started")]
    NotStarted(u32),

    #[error("Season has not started")]
    SeasonNotStarted,
}

/// Pick the gameweek to show: the requested one, or the current one when
/// none was asked for. Gameweeks past the current one have no data yet.
pub fn choose_gameweek(
    requested: Option<u32>,
    current: Option<u32>,
) -> Result<u32, GameweekChoiceError> {
    match (requested, current) {
        (Some(gw), Some(current)) if gw > current => Err(GameweekChoiceError::NotStarted(gw)),
        (Some(gw), _) => Ok(gw),
        (None, Some(current)) => Ok(current),
        (None, None) => Err(GameweekChoiceError::SeasonNotStarted),
    }
}

/// One team's score for one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekResult {
    pub team_id: TeamId,

    pub gameweek: u32,

    /// Points after hits are deducted
    pub points: i32,

    /// Captain (with multiplier) plus vice-captain points
    pub captaincy_points: i32,

    /// Points left on the bench
    pub bench_points: i32,

    /// Transfer cost deducted this gameweek
    #[serde(default)]
    pub hits: i32,

    /// Chip played this gameweek, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip: Option<String>,
}

impl GameweekResult {
    /// Create a new result with no hits and no chip.
    pub fn new(
        team_id: TeamId,
        gameweek: u32,
        points: i32,
        captaincy_points: i32,
        bench_points: i32,
    ) -> Self {
        Self {
            team_id,
            gameweek,
            points,
            captaincy_points,
            bench_points,
            hits: 0,
            chip: None,
        }
    }

    /// A zeroed result for a team whose data could not be fetched.
    pub fn empty(team_id: TeamId, gameweek: u32) -> Self {
        Self::new(team_id, gameweek, 0, 0, 0)
    }

    /// Builder method to record a transfer hit.
    pub fn with_hits(mut self, hits: i32) -> Self {
        self.hits = hits;
        self
    }

    /// Builder method to record the active chip.
    pub fn with_chip(mut self, chip: impl Into<String>) -> Self {
        self.chip = Some(chip.into());
        self
    }

    /// The tie-break key: (points, captaincy, bench).
    pub fn tiebreak_key(&self) -> (i32, i32, i32) {
        (self.points, self.captaincy_points, self.bench_points)
    }
}

/// A resolved place: one team, or a genuine tie that was not forced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "teams", rename_all = "snake_case")]
pub enum Placing {
    Sole(TeamId),
    Tied(Vec<TeamId>),
}

impl Placing {
    /// Build a placing from a group of equal teams.
    pub fn from_group(mut teams: Vec<TeamId>) -> Option<Self> {
        match teams.len() {
            0 => None,
            1 => Some(Placing::Sole(teams[0])),
            _ => {
                teams.sort();
                Some(Placing::Tied(teams))
            }
        }
    }

    /// All teams sharing this place.
    pub fn teams(&self) -> Vec<TeamId> {
        match self {
            Placing::Sole(id) => vec![*id],
            Placing::Tied(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, team: TeamId) -> bool {
        match self {
            Placing::Sole(id) => *id == team,
            Placing::Tied(ids) => ids.contains(&team),
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Placing::Tied(_))
    }

    /// Number of teams sharing this place.
    pub fn len(&self) -> usize {
        match self {
            Placing::Sole(_) => 1,
            Placing::Tied(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A result with its position in the gameweek table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Standard competition position (1, 2, 2, 4)
    pub position: u32,

    /// Whether another team shares this position on all tie-break keys
    pub tied: bool,

    #[serde(flatten)]
    pub result: GameweekResult,
}

/// The ranked table and resolved placings for one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekOutcome {
    pub gameweek: u32,

    /// Whether the gameweek is finished upstream
    pub finished: bool,

    pub table: Vec<RankedResult>,

    pub winner: Option<Placing>,

    pub runner_up: Option<Placing>,

    pub last: Option<Placing>,

    pub captaincy_winner: Option<Placing>,
}

impl GameweekOutcome {
    /// The result recorded for a team, if it played this gameweek.
    pub fn result_for(&self, team: TeamId) -> Option<&GameweekResult> {
        self.table
            .iter()
            .map(|r| &r.result)
            .find(|r| r.team_id == team)
    }

    /// Highest points scored this gameweek.
    pub fn top_score(&self) -> Option<i32> {
        self.table.iter().map(|r| r.result.points).max()
    }
}
