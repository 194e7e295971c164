//! Scoring engine.
//!
//! Turns normalized per-gameweek records into league results:
//! - Gameweek tables and tie-broken placings
//! - Season leaderboard and captaincy table
//! - Weekly pot splits and season settlement

pub mod finance;
pub mod leaderboard;
pub mod ranking;

pub use finance::{settle_gameweek, settle_season, split_amount};
pub use leaderboard::{aggregate, captaincy_table};
pub use ranking::{
    captaincy_winner, compare_captaincy, compare_results, gameweek_last, gameweek_runner_up,
    gameweek_winner, rank_gameweek, resolve_outcome, tie_groups,
};

/// Standard competition positions (1, 2, 2, 4) for an already sorted slice.
///
/// `same` decides whether two neighbours share a position.
pub fn competition_positions<T, F>(sorted: &[T], same: F) -> Vec<u32>
where
    F: Fn(&T, &T) -> bool,
{
    let mut positions = Vec::with_capacity(sorted.len());
    for (i, item) in sorted.iter().enumerate() {
        let position = match i.checked_sub(1) {
            Some(prev) if same(&sorted[prev], item) => positions[prev],
            _ => i as u32 + 1,
        };
        positions.push(position);
    }
    positions
}
