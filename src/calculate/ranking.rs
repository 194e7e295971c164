//! Gameweek tie-break ranking.
//!
//! Results are ordered by points, then captaincy (C+VC) points, then bench
//! points, all descending. Teams equal on all three keys are a genuine tie
//! and are reported as [`Placing::Tied`] rather than split arbitrarily.

use std::cmp::Ordering;

use crate::models::{GameweekOutcome, GameweekResult, Placing, RankedResult};

use super::competition_positions;

/// Main table order: points, captaincy points, bench points (descending).
pub fn compare_results(a: &GameweekResult, b: &GameweekResult) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.captaincy_points.cmp(&a.captaincy_points))
        .then_with(|| b.bench_points.cmp(&a.bench_points))
}

/// Captaincy pot order: captaincy points, then gameweek points (descending).
pub fn compare_captaincy(a: &GameweekResult, b: &GameweekResult) -> Ordering {
    b.captaincy_points
        .cmp(&a.captaincy_points)
        .then_with(|| b.points.cmp(&a.points))
}

/// Sort by `cmp` and split into runs of equal results.
///
/// Team id is only used to make the order within a tie stable.
fn grouped_by<F>(results: &[GameweekResult], cmp: F) -> Vec<Vec<&GameweekResult>>
where
    F: Fn(&GameweekResult, &GameweekResult) -> Ordering,
{
    let mut sorted: Vec<&GameweekResult> = results.iter().collect();
    sorted.sort_by(|a, b| cmp(a, b).then_with(|| a.team_id.cmp(&b.team_id)));

    let mut groups: Vec<Vec<&GameweekResult>> = Vec::new();
    for result in sorted {
        match groups.last_mut() {
            Some(group) if cmp(group[0], result) == Ordering::Equal => group.push(result),
            _ => groups.push(vec![result]),
        }
    }
    groups
}

fn placing(group: &[&GameweekResult]) -> Option<Placing> {
    Placing::from_group(group.iter().map(|r| r.team_id).collect())
}

/// Groups of teams that cannot be separated, best first.
pub fn tie_groups(results: &[GameweekResult]) -> Vec<Vec<&GameweekResult>> {
    grouped_by(results, compare_results)
}

/// Full gameweek table with competition positions.
pub fn rank_gameweek(results: &[GameweekResult]) -> Vec<RankedResult> {
    let ordered: Vec<(&GameweekResult, bool)> = tie_groups(results)
        .into_iter()
        .flat_map(|group| {
            let tied = group.len() > 1;
            group.into_iter().map(move |r| (r, tied))
        })
        .collect();

    let positions = competition_positions(&ordered, |a, b| {
        compare_results(a.0, b.0) == Ordering::Equal
    });

    ordered
        .into_iter()
        .zip(positions)
        .map(|((result, tied), position)| RankedResult {
            position,
            tied,
            result: result.clone(),
        })
        .collect()
}

/// The gameweek winner after all tie-breaks.
pub fn gameweek_winner(results: &[GameweekResult]) -> Option<Placing> {
    tie_groups(results).first().and_then(|g| placing(g))
}

/// Second place; needs at least two separable groups.
pub fn gameweek_runner_up(results: &[GameweekResult]) -> Option<Placing> {
    tie_groups(results).get(1).and_then(|g| placing(g))
}

/// Last place: lowest points, then lowest captaincy, then lowest bench.
///
/// Only reported with three or more separable groups, so no team is
/// both runner-up and last in the same gameweek.
pub fn gameweek_last(results: &[GameweekResult]) -> Option<Placing> {
    let groups = tie_groups(results);
    if groups.len() < 3 {
        return None;
    }
    groups.last().and_then(|g| placing(g))
}

/// Best C+VC score, tie-broken by gameweek points.
pub fn captaincy_winner(results: &[GameweekResult]) -> Option<Placing> {
    grouped_by(results, compare_captaincy)
        .first()
        .and_then(|g| placing(g))
}

/// Rank a gameweek and resolve every placing.
pub fn resolve_outcome(gameweek: u32, finished: bool, results: &[GameweekResult]) -> GameweekOutcome {
    GameweekOutcome {
        gameweek,
        finished,
        table: rank_gameweek(results),
        winner: gameweek_winner(results),
        runner_up: gameweek_runner_up(results),
        last: gameweek_last(results),
        captaincy_winner: captaincy_winner(results),
    }
}
