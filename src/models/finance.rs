//! Financial settlement models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TeamId;

/// Money movements for one team across the season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamFinances {
    pub team_id: TeamId,

    pub team_name: String,

    /// Season buy-in plus every gameweek buy-in
    pub buy_ins: Decimal,

    /// Last-place penalties
    pub penalties: Decimal,

    /// Weekly prizes won
    pub winnings: Decimal,

    /// End-of-season prize by final standing
    pub prize_money: Decimal,

    /// winnings - buy_ins - penalties + prize_money
    pub net: Decimal,
}

impl TeamFinances {
    pub fn new(team_id: TeamId, team_name: String) -> Self {
        Self {
            team_id,
            team_name,
            ..Default::default()
        }
    }

    /// Recompute `net` from the other columns.
    pub fn recompute_net(&mut self) {
        self.net = self.winnings - self.buy_ins - self.penalties + self.prize_money;
    }
}

/// A single payout or charge within a gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub team_id: TeamId,
    pub kind: AwardKind,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    Winner,
    RunnerUp,
    Captaincy,
    LastPlacePenalty,
}

impl AwardKind {
    /// Penalties are charged rather than paid.
    pub fn is_penalty(&self) -> bool {
        matches!(self, AwardKind::LastPlacePenalty)
    }
}

/// How one gameweek's pot was split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekSettlement {
    pub gameweek: u32,

    /// Gameweek buy-ins collected from every team
    pub collected: Decimal,

    pub awards: Vec<Award>,
}

impl GameweekSettlement {
    /// Prize money paid out this gameweek.
    pub fn paid_out(&self) -> Decimal {
        self.awards
            .iter()
            .filter(|a| !a.kind.is_penalty())
            .map(|a| a.amount)
            .sum()
    }

    /// Penalties charged this gameweek.
    pub fn penalties(&self) -> Decimal {
        self.awards
            .iter()
            .filter(|a| a.kind.is_penalty())
            .map(|a| a.amount)
            .sum()
    }
}

/// League-wide pot totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PotSummary {
    /// Buy-ins and penalties paid in
    pub collected: Decimal,

    /// Weekly prizes and season prizes paid out
    pub paid_out: Decimal,

    /// collected - paid_out
    pub balance: Decimal,
}

/// Full season settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub gameweeks_settled: u32,

    /// Season prizes follow current standings until the season is complete
    pub provisional: bool,

    pub teams: Vec<TeamFinances>,
    pub gameweeks: Vec<GameweekSettlement>,
    pub pot: PotSummary,
}

impl Settlement {
    pub fn for_team(&self, team: TeamId) -> Option<&TeamFinances> {
        self.teams.iter().find(|t| t.team_id == team)
    }
}
