//! Season aggregation.

use std::cmp::Ordering;

use crate::models::{CaptaincyEntry, GameweekOutcome, LeaderboardEntry, Placing, Team, TeamStats};

use super::competition_positions;

/// Season totals for one team over the given outcomes.
pub fn team_stats(team: &Team, outcomes: &[GameweekOutcome]) -> TeamStats {
    let mut stats = TeamStats::default();

    for outcome in outcomes {
        if let Some(result) = outcome.result_for(team.id) {
            stats.total_points += result.points;
            stats.total_captaincy_points += result.captaincy_points;
            stats.total_bench_points += result.bench_points;
            stats.total_hits += result.hits;
            stats.gameweeks_played += 1;
        }

        let placed = |p: &Option<Placing>| {
            p.as_ref().is_some_and(|p| p.contains(team.id))
        };
        if placed(&outcome.winner) {
            stats.wins += 1;
        }
        if placed(&outcome.runner_up) {
            stats.seconds += 1;
        }
        if placed(&outcome.last) {
            stats.lasts += 1;
        }
        if placed(&outcome.captaincy_winner) {
            stats.captaincy_wins += 1;
        }
    }

    stats
}

/// Season order: total points, then captaincy, then bench (descending).
fn compare_totals(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.total_captaincy_points.cmp(&a.total_captaincy_points))
        .then_with(|| b.total_bench_points.cmp(&a.total_bench_points))
}

/// Build the season leaderboard for every configured team.
///
/// Teams without any recorded result get a zeroed row.
pub fn aggregate(teams: &[Team], outcomes: &[GameweekOutcome]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = teams
        .iter()
        .map(|team| LeaderboardEntry::new(team.id, team.name.clone(), team_stats(team, outcomes)))
        .collect();

    entries.sort_by(|a, b| compare_totals(&a.stats, &b.stats).then_with(|| a.team_id.cmp(&b.team_id)));

    let positions = competition_positions(&entries, |a, b| {
        compare_totals(&a.stats, &b.stats) == Ordering::Equal
    });
    for (entry, position) in entries.iter_mut().zip(positions) {
        entry.position = position;
    }

    entries
}

/// Season captaincy table: total C+VC points, then total points.
pub fn captaincy_table(teams: &[Team], outcomes: &[GameweekOutcome]) -> Vec<CaptaincyEntry> {
    let mut entries: Vec<CaptaincyEntry> = teams
        .iter()
        .map(|team| {
            let stats = team_stats(team, outcomes);
            CaptaincyEntry {
                position: 0,
                team_id: team.id,
                team_name: team.name.clone(),
                total_captaincy_points: stats.total_captaincy_points,
                total_points: stats.total_points,
                captaincy_wins: stats.captaincy_wins,
            }
        })
        .collect();

    let key = |e: &CaptaincyEntry| (e.total_captaincy_points, e.total_points);
    entries.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.team_id.cmp(&b.team_id)));

    let positions = competition_positions(&entries, |a, b| key(a) == key(b));
    for (entry, position) in entries.iter_mut().zip(positions) {
        entry.position = position;
    }

    entries
}
