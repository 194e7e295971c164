//! Core data models for the league dashboard.

mod finance;
mod gameweek;
mod ids;
mod stats;
mod team;

pub use finance::*;
pub use gameweek::*;
pub use ids::*;
pub use stats::*;
pub use team::*;
