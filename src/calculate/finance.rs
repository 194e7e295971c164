//! Pot splits and season settlement.
//!
//! All amounts are `Decimal`. A tied placing shares its prize equally,
//! rounded to pennies; a tied last place charges every tied team the full
//! penalty.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::FinanceConfig;
use crate::models::{
    Award, AwardKind, GameweekOutcome, GameweekSettlement, LeaderboardEntry, Placing,
    PotSummary, Settlement, Team, TeamFinances, TeamId, MAX_GAMEWEEK,
};

/// Split `amount` evenly `ways` ways, rounded to two decimal places.
pub fn split_amount(amount: Decimal, ways: usize) -> Decimal {
    if ways == 0 {
        return Decimal::ZERO;
    }
    (amount / Decimal::from(ways as u64))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn share(awards: &mut Vec<Award>, placing: Option<&Placing>, kind: AwardKind, prize: Decimal) {
    let Some(placing) = placing else {
        return;
    };
    if prize.is_zero() {
        return;
    }
    let amount = if kind.is_penalty() {
        prize
    } else {
        split_amount(prize, placing.len())
    };
    awards.extend(placing.teams().into_iter().map(|team_id| Award {
        team_id,
        kind,
        amount,
    }));
}

/// Split one gameweek's pot between winner, runner-up, captaincy winner
/// and last place.
pub fn settle_gameweek(outcome: &GameweekOutcome, config: &FinanceConfig) -> GameweekSettlement {
    let mut awards = Vec::new();
    share(&mut awards, outcome.winner.as_ref(), AwardKind::Winner, config.winner_prize);
    share(
        &mut awards,
        outcome.runner_up.as_ref(),
        AwardKind::RunnerUp,
        config.runner_up_prize,
    );
    share(
        &mut awards,
        outcome.captaincy_winner.as_ref(),
        AwardKind::Captaincy,
        config.captaincy_prize,
    );
    share(
        &mut awards,
        outcome.last.as_ref(),
        AwardKind::LastPlacePenalty,
        config.last_place_penalty,
    );

    GameweekSettlement {
        gameweek: outcome.gameweek,
        collected: config.gameweek_buy_in * Decimal::from(outcome.table.len() as u64),
        awards,
    }
}

/// Season prize per team from the leaderboard.
///
/// Teams sharing a position pool the prizes for the places they occupy and
/// split the pool evenly.
pub fn season_prize_money(
    leaderboard: &[LeaderboardEntry],
    config: &FinanceConfig,
) -> HashMap<TeamId, Decimal> {
    let mut prizes = HashMap::new();
    let prize_at = |index: usize| config.season_prizes.get(index).copied().unwrap_or_default();

    let mut start = 0;
    while start < leaderboard.len() {
        let position = leaderboard[start].position;
        let end = leaderboard[start..]
            .iter()
            .position(|e| e.position != position)
            .map_or(leaderboard.len(), |offset| start + offset);

        let pool: Decimal = (start..end).map(prize_at).sum();
        let amount = split_amount(pool, end - start);
        for entry in &leaderboard[start..end] {
            prizes.insert(entry.team_id, amount);
        }
        start = end;
    }

    prizes
}

/// Settle the season so far.
///
/// Every team pays the season buy-in plus a gameweek buy-in for each
/// settled gameweek it appears in. Prize money is by current standing and
/// is provisional until every gameweek of the season is settled.
pub fn settle_season(
    teams: &[Team],
    leaderboard: &[LeaderboardEntry],
    outcomes: &[GameweekOutcome],
    config: &FinanceConfig,
) -> Settlement {
    let gameweeks: Vec<GameweekSettlement> = outcomes
        .iter()
        .map(|o| settle_gameweek(o, config))
        .collect();
    let prizes = season_prize_money(leaderboard, config);

    let mut finances: Vec<TeamFinances> = teams
        .iter()
        .map(|team| {
            let mut f = TeamFinances::new(team.id, team.name.clone());
            let played = outcomes
                .iter()
                .filter(|o| o.result_for(team.id).is_some())
                .count();
            f.buy_ins = config.season_buy_in + config.gameweek_buy_in * Decimal::from(played as u64);

            for award in gameweeks.iter().flat_map(|g| &g.awards) {
                if award.team_id != team.id {
                    continue;
                }
                if award.kind.is_penalty() {
                    f.penalties += award.amount;
                } else {
                    f.winnings += award.amount;
                }
            }

            f.prize_money = prizes.get(&team.id).copied().unwrap_or_default();
            f.recompute_net();
            f
        })
        .collect();

    // Leaderboard order, so the table reads top-down
    let order: HashMap<TeamId, usize> = leaderboard
        .iter()
        .enumerate()
        .map(|(i, e)| (e.team_id, i))
        .collect();
    finances.sort_by_key(|f| order.get(&f.team_id).copied().unwrap_or(usize::MAX));

    let season_buy_ins = config.season_buy_in * Decimal::from(teams.len() as u64);
    let collected = season_buy_ins
        + gameweeks.iter().map(|g| g.collected + g.penalties()).sum::<Decimal>();
    let paid_out = finances.iter().map(|f| f.winnings + f.prize_money).sum::<Decimal>();

    let gameweeks_settled = outcomes.len() as u32;
    Settlement {
        gameweeks_settled,
        provisional: gameweeks_settled < MAX_GAMEWEEK,
        teams: finances,
        gameweeks,
        pot: PotSummary {
            collected,
            paid_out,
            balance: collected - paid_out,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::{aggregate, resolve_outcome};
    use crate::models::GameweekResult;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn config() -> FinanceConfig {
        FinanceConfig {
            season_buy_in: dec!(30),
            gameweek_buy_in: dec!(2),
            winner_prize: dec!(5),
            runner_up_prize: dec!(3),
            captaincy_prize: dec!(2),
            last_place_penalty: dec!(1),
            season_prizes: vec![dec!(50), dec!(20)],
        }
    }

    fn teams() -> Vec<Team> {
        vec![
            Team::new(1u64, "Alpha"),
            Team::new(2u64, "Bravo"),
            Team::new(3u64, "Charlie"),
            Team::new(4u64, "Delta"),
        ]
    }

    fn gw(gameweek: u32, rows: &[(u64, i32, i32, i32)]) -> GameweekOutcome {
        let results: Vec<GameweekResult> = rows
            .iter()
            .map(|&(team, points, captaincy, bench)| {
                GameweekResult::new(TeamId::new(team), gameweek, points, captaincy, bench)
            })
            .collect();
        resolve_outcome(gameweek, true, &results)
    }

    #[test]
    fn test_split_amount() {
        assert_eq!(split_amount(dec!(5), 1), dec!(5));
        assert_eq!(split_amount(dec!(5), 2), dec!(2.50));
        assert_eq!(split_amount(dec!(10), 3), dec!(3.33));
        assert_eq!(split_amount(dec!(5), 0), Decimal::ZERO);
    }

    #[test]
    fn test_settle_gameweek() {
        let outcome = gw(1, &[(1, 70, 20, 0), (2, 60, 30, 0), (3, 50, 10, 0), (4, 40, 8, 0)]);
        let settlement = settle_gameweek(&outcome, &config());

        assert_eq!(settlement.collected, dec!(8));
        assert_eq!(settlement.paid_out(), dec!(10));
        assert_eq!(settlement.penalties(), dec!(1));

        let kinds: Vec<(u64, AwardKind)> = settlement
            .awards
            .iter()
            .map(|a| (a.team_id.entry_id(), a.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (1, AwardKind::Winner),
                (2, AwardKind::RunnerUp),
                (2, AwardKind::Captaincy),
                (4, AwardKind::LastPlacePenalty),
            ]
        );
    }

    #[test]
    fn test_tied_winner_splits_prize() {
        let outcome = gw(1, &[(1, 70, 20, 3), (2, 70, 20, 3), (3, 50, 10, 0), (4, 40, 8, 0)]);
        let settlement = settle_gameweek(&outcome, &config());

        let winner_awards: Vec<&Award> = settlement
            .awards
            .iter()
            .filter(|a| a.kind == AwardKind::Winner)
            .collect();
        assert_eq!(winner_awards.len(), 2);
        assert!(winner_awards.iter().all(|a| a.amount == dec!(2.50)));
    }

    #[test]
    fn test_tied_last_place_each_pays_penalty() {
        let outcome = gw(1, &[(1, 70, 20, 3), (2, 60, 20, 3), (3, 40, 8, 0), (4, 40, 8, 0)]);
        let settlement = settle_gameweek(&outcome, &config());
        assert_eq!(settlement.penalties(), dec!(2));
    }

    #[test]
    fn test_zero_prize_produces_no_award() {
        let mut cfg = config();
        cfg.captaincy_prize = Decimal::ZERO;
        let outcome = gw(1, &[(1, 70, 20, 0), (2, 60, 30, 0), (3, 50, 10, 0)]);
        let settlement = settle_gameweek(&outcome, &cfg);
        assert!(settlement
            .awards
            .iter()
            .all(|a| a.kind != AwardKind::Captaincy));
    }

    #[test]
    fn test_net_for_team_without_placings() {
        let mut cfg = config();
        cfg.season_prizes = vec![dec!(50)];
        let outcomes = vec![
            gw(1, &[(1, 70, 20, 0), (2, 60, 30, 0), (3, 55, 10, 0), (4, 40, 8, 0)]),
            gw(2, &[(1, 72, 26, 0), (2, 65, 10, 0), (3, 58, 9, 0), (4, 30, 8, 0)]),
        ];
        let league = teams();
        let board = aggregate(&league, &outcomes);
        let settlement = settle_season(&league, &board, &outcomes, &cfg);

        let charlie_stats = &board.iter().find(|e| e.team_id == TeamId::new(3)).unwrap().stats;
        assert!(charlie_stats.has_no_placings());

        let charlie = settlement.for_team(TeamId::new(3)).unwrap();
        assert_eq!(charlie.net, -(cfg.season_buy_in + cfg.gameweek_buy_in * dec!(2)));
        assert_eq!(charlie.net, dec!(-34));
    }

    #[test]
    fn test_settle_season_totals() {
        let cfg = config();
        let outcomes = vec![
            gw(1, &[(1, 70, 20, 0), (2, 60, 30, 0), (3, 55, 10, 0), (4, 40, 8, 0)]),
            gw(2, &[(1, 72, 26, 0), (2, 65, 10, 0), (3, 58, 9, 0), (4, 30, 8, 0)]),
        ];
        let league = teams();
        let board = aggregate(&league, &outcomes);
        let settlement = settle_season(&league, &board, &outcomes, &cfg);

        assert_eq!(settlement.gameweeks_settled, 2);
        assert!(settlement.provisional);

        // Alpha: two wins + one captaincy, first place prize
        let alpha = settlement.for_team(TeamId::new(1)).unwrap();
        assert_eq!(alpha.winnings, dec!(12));
        assert_eq!(alpha.prize_money, dec!(50));
        assert_eq!(alpha.buy_ins, dec!(34));
        assert_eq!(alpha.net, dec!(28));

        // Delta: last twice
        let delta = settlement.for_team(TeamId::new(4)).unwrap();
        assert_eq!(delta.penalties, dec!(2));
        assert_eq!(delta.net, dec!(-36));

        // Table follows the leaderboard
        assert_eq!(settlement.teams[0].team_id, TeamId::new(1));

        // 4 x 30 + 8 x 2 gameweek buy-ins + 2 penalties
        assert_eq!(settlement.pot.collected, dec!(138));
        // 2 x (5 + 3 + 2) weekly + 70 season
        assert_eq!(settlement.pot.paid_out, dec!(90));
        assert_eq!(settlement.pot.balance, dec!(48));
    }

    #[test]
    fn test_tied_season_position_pools_prizes() {
        let cfg = config();
        let outcomes = vec![gw(1, &[(1, 60, 20, 2), (2, 60, 20, 2), (3, 50, 10, 0), (4, 40, 8, 0)])];
        let league = teams();
        let board = aggregate(&league, &outcomes);
        let prizes = season_prize_money(&board, &cfg);

        // (50 + 20) / 2
        assert_eq!(prizes[&TeamId::new(1)], dec!(35));
        assert_eq!(prizes[&TeamId::new(2)], dec!(35));
        assert_eq!(prizes[&TeamId::new(3)], Decimal::ZERO);
    }

    #[test]
    fn test_no_outcomes_only_season_buy_in() {
        let cfg = config();
        let league = teams();
        let board = aggregate(&league, &[]);
        let settlement = settle_season(&league, &board, &[], &cfg);

        // Everyone shares first place on zero points
        for team in &settlement.teams {
            assert_eq!(team.buy_ins, dec!(30));
            assert_eq!(team.prize_money, dec!(17.50));
        }
    }
}
