//! Configuration loading and validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Team;
use crate::parse_duration;

/// Most teams a mini-league dashboard is sized for.
pub const MAX_TEAMS: usize = 10;

/// Prefix for environment overrides, e.g. `FPL_LEAGUE__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "FPL_LEAGUE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to layer config sources: {0}")]
    SourceError(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream fantasy API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the FPL API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Directory for cached upstream responses
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// How long a cached response stays fresh (e.g. "5m", "1h")
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://fantasy.premierleague.com/api".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/cache")
}

fn default_cache_ttl() -> String {
    "5m".to_string()
}

fn default_user_agent() -> String {
    format!("fpl-league/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            cache_dir: default_cache_dir(),
            cache_ttl: default_cache_ttl(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Parsed cache TTL; falls back to five minutes when unparsable.
    pub fn cache_ttl(&self) -> Duration {
        parse_duration(&self.cache_ttl).unwrap_or(Duration::from_secs(300))
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// The mini-league being tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    #[serde(default = "default_league_name")]
    pub name: String,

    /// Count the in-progress gameweek in standings and finances
    #[serde(default)]
    pub include_live_gameweek: bool,

    #[serde(default)]
    pub teams: Vec<Team>,
}

fn default_league_name() -> String {
    "Mini League".to_string()
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            name: default_league_name(),
            include_live_gameweek: false,
            teams: Vec::new(),
        }
    }
}

/// Money rules for the league pot. Amounts are in the league's currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// Paid once per team at the start of the season
    #[serde(default = "default_season_buy_in")]
    pub season_buy_in: Decimal,

    /// Paid by every team for every settled gameweek
    #[serde(default = "default_gameweek_buy_in")]
    pub gameweek_buy_in: Decimal,

    #[serde(default = "default_winner_prize")]
    pub winner_prize: Decimal,

    #[serde(default = "default_runner_up_prize")]
    pub runner_up_prize: Decimal,

    /// Paid to the best C+VC score each gameweek
    #[serde(default = "default_captaincy_prize")]
    pub captaincy_prize: Decimal,

    /// Charged to the gameweek's last place
    #[serde(default = "default_last_place_penalty")]
    pub last_place_penalty: Decimal,

    /// Paid by final leaderboard position, first place first
    #[serde(default = "default_season_prizes")]
    pub season_prizes: Vec<Decimal>,
}

fn default_season_buy_in() -> Decimal {
    dec!(30)
}

fn default_gameweek_buy_in() -> Decimal {
    dec!(2)
}

fn default_winner_prize() -> Decimal {
    dec!(5)
}

fn default_runner_up_prize() -> Decimal {
    dec!(3)
}

fn default_captaincy_prize() -> Decimal {
    dec!(2)
}

fn default_last_place_penalty() -> Decimal {
    dec!(1)
}

fn default_season_prizes() -> Vec<Decimal> {
    vec![dec!(150), dec!(75), dec!(40)]
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            season_buy_in: default_season_buy_in(),
            gameweek_buy_in: default_gameweek_buy_in(),
            winner_prize: default_winner_prize(),
            runner_up_prize: default_runner_up_prize(),
            captaincy_prize: default_captaincy_prize(),
            last_place_penalty: default_last_place_penalty(),
            season_prizes: default_season_prizes(),
        }
    }
}

impl FinanceConfig {
    /// All configured amounts, labelled, for validation.
    fn amounts(&self) -> Vec<(&'static str, Decimal)> {
        let mut amounts = vec![
            ("season_buy_in", self.season_buy_in),
            ("gameweek_buy_in", self.gameweek_buy_in),
            ("winner_prize", self.winner_prize),
            ("runner_up_prize", self.runner_up_prize),
            ("captaincy_prize", self.captaincy_prize),
            ("last_place_penalty", self.last_place_penalty),
        ];
        amounts.extend(self.season_prizes.iter().map(|p| ("season_prizes", *p)));
        amounts
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub league: LeagueConfig,

    #[serde(default)]
    pub finance: FinanceConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
            league: LeagueConfig::default(),
            finance: FinanceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the TOML file (if present) with `FPL_LEAGUE__*` environment
    /// variables layered on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if parse_duration(&self.api.cache_ttl).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Unparsable cache_ttl: {:?}",
                self.api.cache_ttl
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let teams = &self.league.teams;
        if teams.is_empty() {
            return Err(ConfigError::ValidationError(
                "League must have at least one team".to_string(),
            ));
        }
        if teams.len() > MAX_TEAMS {
            return Err(ConfigError::ValidationError(format!(
                "League has {} teams, at most {} are supported",
                teams.len(),
                MAX_TEAMS
            )));
        }

        let mut seen = HashSet::new();
        for team in teams {
            if !seen.insert(team.id) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate team id {}",
                    team.id
                )));
            }
        }

        if let Some((name, amount)) = self
            .finance
            .amounts()
            .into_iter()
            .find(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
        {
            return Err(ConfigError::ValidationError(format!(
                "{} must not be negative (got {})",
                name, amount
            )));
        }

        Ok(())
    }
}
