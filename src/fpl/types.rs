//! FPL API response types.
//!
//! Only the fields the dashboard reads are modelled; everything else in the
//! upstream payloads is ignored. Most fields default so a schema tweak
//! upstream degrades to zeros instead of a parse failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── bootstrap-static ────────────────────────────────────────────────────────

/// The season calendar. Clubs and players in the same payload are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub events: Vec<FplEvent>,
}

/// A gameweek as FPL calls it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FplEvent {
    pub id: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub deadline_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub finished: bool,

    /// Bonus points confirmed and scores final
    #[serde(default)]
    pub data_checked: bool,

    #[serde(default)]
    pub is_current: bool,

    #[serde(default)]
    pub is_next: bool,

    #[serde(default)]
    pub average_entry_score: i32,

    #[serde(default)]
    pub highest_score: Option<i32>,
}

impl Bootstrap {
    /// The gameweek in progress, or the most recent finished one.
    pub fn current_gameweek(&self) -> Option<u32> {
        self.events
            .iter()
            .find(|e| e.is_current)
            .or_else(|| self.events.iter().filter(|e| e.finished).max_by_key(|e| e.id))
            .map(|e| e.id)
    }

    /// Ids of every finished gameweek, ascending.
    pub fn finished_gameweeks(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .events
            .iter()
            .filter(|e| e.finished)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn event(&self, gameweek: u32) -> Option<&FplEvent> {
        self.events.iter().find(|e| e.id == gameweek)
    }

    pub fn is_finished(&self, gameweek: u32) -> bool {
        self.event(gameweek).is_some_and(|e| e.finished)
    }
}

// ── entry/{id}/ ─────────────────────────────────────────────────────────────

/// A manager's entry summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: u64,

    /// Team name
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub player_first_name: String,

    #[serde(default)]
    pub player_last_name: String,

    #[serde(default)]
    pub summary_overall_points: Option<i32>,

    #[serde(default)]
    pub summary_overall_rank: Option<u64>,

    #[serde(default)]
    pub current_event: Option<u32>,
}

impl EntrySummary {
    pub fn manager_name(&self) -> String {
        format!("{} {}", self.player_first_name, self.player_last_name)
            .trim()
            .to_string()
    }
}

// ── entry/{id}/history/ ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryHistory {
    #[serde(default)]
    pub current: Vec<HistoryGameweek>,

    #[serde(default)]
    pub chips: Vec<ChipPlay>,
}

/// One row of an entry's season history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryGameweek {
    pub event: u32,

    /// Gross gameweek points, before transfer cost
    #[serde(default)]
    pub points: i32,

    #[serde(default)]
    pub total_points: i32,

    #[serde(default)]
    pub rank: Option<u64>,

    #[serde(default)]
    pub event_transfers: u32,

    #[serde(default)]
    pub event_transfers_cost: i32,

    #[serde(default)]
    pub points_on_bench: i32,

    /// In tenths of a million
    #[serde(default)]
    pub bank: i64,

    #[serde(default)]
    pub value: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChipPlay {
    pub name: String,
    pub event: u32,
}

impl EntryHistory {
    /// Chip played in a gameweek, if any.
    pub fn chip_for(&self, gameweek: u32) -> Option<&str> {
        self.chips
            .iter()
            .find(|c| c.event == gameweek)
            .map(|c| c.name.as_str())
    }
}

// ── entry/{id}/event/{gw}/picks/ ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPicks {
    #[serde(default)]
    pub active_chip: Option<String>,

    #[serde(default)]
    pub entry_history: PicksHistory,

    #[serde(default)]
    pub picks: Vec<Pick>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PicksHistory {
    #[serde(default)]
    pub event: u32,

    #[serde(default)]
    pub points: i32,

    #[serde(default)]
    pub points_on_bench: i32,

    #[serde(default)]
    pub event_transfers_cost: i32,
}

/// One squad slot. Positions 1-11 start, 12-15 are the bench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pick {
    pub element: u32,

    #[serde(default)]
    pub position: u32,

    /// 0 benched, 1 playing, 2 captain, 3 triple captain
    #[serde(default)]
    pub multiplier: u32,

    #[serde(default)]
    pub is_captain: bool,

    #[serde(default)]
    pub is_vice_captain: bool,
}

impl EntryPicks {
    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_captain)
    }

    pub fn vice_captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.is_vice_captain)
    }
}

// ── event/{gw}/live/ ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveGameweek {
    #[serde(default)]
    pub elements: Vec<LiveElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveElement {
    pub id: u32,

    #[serde(default)]
    pub stats: LiveStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveStats {
    #[serde(default)]
    pub total_points: i32,

    #[serde(default)]
    pub minutes: u32,
}

impl LiveGameweek {
    /// Raw (unmultiplied) points for a player; zero when unknown.
    pub fn points_for(&self, element: u32) -> i32 {
        self.elements
            .iter()
            .find(|e| e.id == element)
            .map(|e| e.stats.total_points)
            .unwrap_or(0)
    }
}

// ── fixtures/ ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,

    #[serde(default)]
    pub event: Option<u32>,

    #[serde(default)]
    pub team_h: u32,

    #[serde(default)]
    pub team_a: u32,

    #[serde(default)]
    pub team_h_score: Option<u32>,

    #[serde(default)]
    pub team_a_score: Option<u32>,

    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub started: Option<bool>,

    #[serde(default)]
    pub finished: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOTSTRAP: &str = r#"{
        "events": [
            {"id": 1, "name": "Gameweek 1", "deadline_time": "2025-08-15T17:30:00Z",
             "finished": true, "data_checked": true, "is_current": false, "is_next": false,
             "average_entry_score": 54, "highest_score": 127},
            {"id": 2, "name": "Gameweek 2", "deadline_time": "2025-08-22T17:30:00Z",
             "finished": false, "is_current": true, "is_next": false,
             "average_entry_score": 0, "highest_score": null},
            {"id": 3, "name": "Gameweek 3", "finished": false, "is_current": false, "is_next": true}
        ],
        "teams": [{"id": 1, "name": "Arsenal", "short_name": "ARS", "strength": 5}],
        "elements": [{"id": 7, "web_name": "Saka", "team": 1, "element_type": 3,
                      "total_points": 11, "now_cost": 100, "form": "5.5"}]
    }"#;

    #[test]
    fn test_parse_bootstrap() {
        let bootstrap: Bootstrap = serde_json::from_str(BOOTSTRAP).unwrap();

        assert_eq!(bootstrap.events.len(), 3);
        assert_eq!(bootstrap.current_gameweek(), Some(2));
        assert_eq!(bootstrap.finished_gameweeks(), vec![1]);
        assert!(bootstrap.is_finished(1));
        assert!(!bootstrap.is_finished(2));
        assert_eq!(bootstrap.event(1).unwrap().highest_score, Some(127));
    }

    #[test]
    fn test_current_gameweek_falls_back_to_last_finished() {
        let bootstrap = Bootstrap {
            events: vec![
                FplEvent {
                    id: 37,
                    finished: true,
                    ..Default::default()
                },
                FplEvent {
                    id: 38,
                    finished: true,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(bootstrap.current_gameweek(), Some(38));
        assert_eq!(Bootstrap::default().current_gameweek(), None);
    }

    #[test]
    fn test_parse_history() {
        let json = r#"{
            "current": [
                {"event": 1, "points": 66, "total_points": 66, "rank": 1200000, "rank_sort": 1,
                 "overall_rank": 1200000, "bank": 5, "value": 1000, "event_transfers": 0,
                 "event_transfers_cost": 0, "points_on_bench": 7},
                {"event": 2, "points": 58, "total_points": 120, "rank": null,
                 "event_transfers": 2, "event_transfers_cost": 4, "points_on_bench": 1}
            ],
            "past": [],
            "chips": [{"name": "wildcard", "time": "2025-08-20T10:00:00Z", "event": 2}]
        }"#;
        let history: EntryHistory = serde_json::from_str(json).unwrap();

        assert_eq!(history.current.len(), 2);
        assert_eq!(history.current[1].event_transfers_cost, 4);
        assert_eq!(history.current[0].points_on_bench, 7);
        assert_eq!(history.chip_for(2), Some("wildcard"));
        assert_eq!(history.chip_for(1), None);
    }

    #[test]
    fn test_parse_picks() {
        let json = r#"{
            "active_chip": "3xc",
            "automatic_subs": [],
            "entry_history": {"event": 5, "points": 80, "total_points": 300,
                              "points_on_bench": 3, "event_transfers_cost": 0},
            "picks": [
                {"element": 10, "position": 1, "multiplier": 1, "is_captain": false, "is_vice_captain": false},
                {"element": 11, "position": 2, "multiplier": 3, "is_captain": true, "is_vice_captain": false},
                {"element": 12, "position": 3, "multiplier": 1, "is_captain": false, "is_vice_captain": true}
            ]
        }"#;
        let picks: EntryPicks = serde_json::from_str(json).unwrap();

        assert_eq!(picks.active_chip.as_deref(), Some("3xc"));
        assert_eq!(picks.captain().unwrap().element, 11);
        assert_eq!(picks.captain().unwrap().multiplier, 3);
        assert_eq!(picks.vice_captain().unwrap().element, 12);
        assert_eq!(picks.entry_history.points_on_bench, 3);
    }

    #[test]
    fn test_live_points_for() {
        let json = r#"{"elements": [
            {"id": 11, "stats": {"minutes": 90, "total_points": 12, "goals_scored": 1}, "explain": []},
            {"id": 12, "stats": {"minutes": 0, "total_points": 0}}
        ]}"#;
        let live: LiveGameweek = serde_json::from_str(json).unwrap();

        assert_eq!(live.points_for(11), 12);
        assert_eq!(live.points_for(12), 0);
        assert_eq!(live.points_for(99), 0);
    }

    #[test]
    fn test_parse_fixture() {
        let json = r#"[{"id": 1, "event": 1, "team_h": 1, "team_a": 2, "team_h_score": 2,
                        "team_a_score": 0, "kickoff_time": "2025-08-15T19:00:00Z",
                        "started": true, "finished": true, "stats": []}]"#;
        let fixtures: Vec<Fixture> = serde_json::from_str(json).unwrap();

        assert_eq!(fixtures[0].team_h_score, Some(2));
        assert!(fixtures[0].finished);
    }

    #[test]
    fn test_manager_name() {
        let entry = EntrySummary {
            id: 1,
            player_first_name: "Jo".to_string(),
            player_last_name: "Bloggs".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.manager_name(), "Jo Bloggs");
    }
}
