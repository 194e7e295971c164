//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A league member, identified by its FPL entry id.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(u64);

impl TeamId {
    /// Create a new TeamId from an FPL entry id.
    pub fn new(entry_id: u64) -> Self {
        Self(entry_id)
    }

    /// The raw entry id, as used in upstream URLs.
    pub fn entry_id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TeamId({})", self.0)
    }
}

impl From<u64> for TeamId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for TeamId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_id_display() {
        let id = TeamId::new(1234567);
        assert_eq!(format!("{}", id), "1234567");
    }

    #[test]
    fn test_team_id_debug() {
        let id = TeamId::new(42);
        assert_eq!(format!("{:?}", id), "TeamId(42)");
    }

    #[test]
    fn test_team_id_serializes_as_number() {
        let id = TeamId::new(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");

        let parsed: TeamId = serde_json::from_str("99").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_team_id_from_str() {
        assert_eq!(" 17 ".parse::<TeamId>().unwrap(), TeamId::new(17));
        assert!("abc".parse::<TeamId>().is_err());
    }

    #[test]
    fn test_team_id_ordering() {
        assert!(TeamId::new(1) < TeamId::new(2));
    }
}
