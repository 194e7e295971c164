//! League member model.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// A team in the mini-league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// FPL entry id
    pub id: TeamId,

    /// Display name shown on the dashboard
    pub name: String,

    /// Manager's name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
}

impl Team {
    /// Create a new Team.
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manager: None,
        }
    }
}

/// Look up a team's display name, falling back to its id.
pub fn team_name(teams: &[Team], id: TeamId) -> String {
    teams
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_deserialize_with_manager() {
        let team: Team =
            toml::from_str("id = 101\nname = \"Haaland Globetrotters\"\nmanager = \"Sam Jones\"")
                .unwrap();
        assert_eq!(team.id, TeamId::new(101));
        assert_eq!(team.manager.as_deref(), Some("Sam Jones"));
        assert!(Team::new(101u64, "Haaland Globetrotters").manager.is_none());
    }

    #[test]
    fn test_team_name_lookup() {
        let teams = vec![Team::new(1u64, "Alpha"), Team::new(2u64, "Bravo")];
        assert_eq!(team_name(&teams, TeamId::new(2)), "Bravo");
        assert_eq!(team_name(&teams, TeamId::new(3)), "3");
    }

    #[test]
    fn test_team_deserialize_without_manager() {
        let team: Team = toml::from_str("id = 7\nname = \"Seven\"").unwrap();
        assert_eq!(team.id, TeamId::new(7));
        assert!(team.manager.is_none());
    }
}
