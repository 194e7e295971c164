//! Fantasy Premier League API client.
//!
//! Fetches the season calendar, entry histories, picks, live scores and
//! fixtures from the public FPL API. All FPL specifics are isolated in this
//! module so endpoint changes are easy to fix.
//!
//! The [`FantasyApi`] trait is the seam the rest of the crate depends on.
//! Its methods return `None` on any failure; the failure is logged here and
//! callers substitute defaults.

mod types;

pub use types::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use url::Url;

use crate::fetch::{FetchError, Fetcher};
use crate::models::TeamId;

/// Read access to the fantasy API, failures flattened to `None`.
#[async_trait]
pub trait FantasyApi: Send + Sync {
    /// `bootstrap-static/`
    async fn bootstrap(&self) -> Option<Bootstrap>;

    /// `entry/{id}/`
    async fn entry(&self, team: TeamId) -> Option<EntrySummary>;

    /// `entry/{id}/history/`
    async fn entry_history(&self, team: TeamId) -> Option<EntryHistory>;

    /// `entry/{id}/event/{gw}/picks/`
    async fn picks(&self, team: TeamId, gameweek: u32) -> Option<EntryPicks>;

    /// `event/{gw}/live/`
    async fn live_gameweek(&self, gameweek: u32) -> Option<LiveGameweek>;

    /// `fixtures/`, optionally filtered to one gameweek
    async fn fixtures(&self, gameweek: Option<u32>) -> Option<Vec<Fixture>>;
}

/// FPL API client.
pub struct FplClient {
    fetcher: Fetcher,
    api_base: String,
}

impl FplClient {
    /// Create a new FPL client.
    pub fn new(fetcher: Fetcher, api_base: String) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        Self { fetcher, api_base }
    }

    /// Build an endpoint URL. FPL paths always end with a slash.
    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let url_str = format!("{}/{}", self.api_base, path.trim_start_matches('/'));
        Url::parse(&url_str).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url_str, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        self.fetcher.fetch_json(&url).await
    }

    pub async fn fetch_bootstrap(&self) -> Result<Bootstrap, FetchError> {
        let bootstrap: Bootstrap = self.get("bootstrap-static/").await?;
        info!("FPL: bootstrap has {} gameweeks", bootstrap.events.len());
        Ok(bootstrap)
    }

    pub async fn fetch_entry(&self, team: TeamId) -> Result<EntrySummary, FetchError> {
        self.get(&format!("entry/{}/", team.entry_id())).await
    }

    pub async fn fetch_entry_history(&self, team: TeamId) -> Result<EntryHistory, FetchError> {
        self.get(&format!("entry/{}/history/", team.entry_id()))
            .await
    }

    pub async fn fetch_picks(&self, team: TeamId, gameweek: u32) -> Result<EntryPicks, FetchError> {
        self.get(&format!("entry/{}/event/{}/picks/", team.entry_id(), gameweek))
            .await
    }

    pub async fn fetch_live_gameweek(&self, gameweek: u32) -> Result<LiveGameweek, FetchError> {
        self.get(&format!("event/{}/live/", gameweek)).await
    }

    pub async fn fetch_fixtures(&self, gameweek: Option<u32>) -> Result<Vec<Fixture>, FetchError> {
        match gameweek {
            Some(gw) => self.get(&format!("fixtures/?event={}", gw)).await,
            None => self.get("fixtures/").await,
        }
    }
}

/// Log a failed upstream call and flatten it to `None`.
fn or_none<T>(what: &str, result: Result<T, FetchError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("FPL: {} unavailable: {}", what, e);
            None
        }
    }
}

#[async_trait]
impl FantasyApi for FplClient {
    async fn bootstrap(&self) -> Option<Bootstrap> {
        or_none("bootstrap", self.fetch_bootstrap().await)
    }

    async fn entry(&self, team: TeamId) -> Option<EntrySummary> {
        or_none(&format!("entry {}", team), self.fetch_entry(team).await)
    }

    async fn entry_history(&self, team: TeamId) -> Option<EntryHistory> {
        or_none(
            &format!("history for entry {}", team),
            self.fetch_entry_history(team).await,
        )
    }

    async fn picks(&self, team: TeamId, gameweek: u32) -> Option<EntryPicks> {
        or_none(
            &format!("GW{} picks for entry {}", gameweek, team),
            self.fetch_picks(team, gameweek).await,
        )
    }

    async fn live_gameweek(&self, gameweek: u32) -> Option<LiveGameweek> {
        or_none(
            &format!("GW{} live scores", gameweek),
            self.fetch_live_gameweek(gameweek).await,
        )
    }

    async fn fixtures(&self, gameweek: Option<u32>) -> Option<Vec<Fixture>> {
        or_none("fixtures", self.fetch_fixtures(gameweek).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetcherConfig;

    fn client(base: &str) -> FplClient {
        let fetcher = Fetcher::new(FetcherConfig::default()).unwrap();
        FplClient::new(fetcher, base.to_string())
    }

    #[test]
    fn test_endpoint_building() {
        let c = client("https://fantasy.premierleague.com/api/");
        assert_eq!(
            c.endpoint("entry/123/history/").unwrap().as_str(),
            "https://fantasy.premierleague.com/api/entry/123/history/"
        );
        assert_eq!(
            c.endpoint("/fixtures/?event=4").unwrap().as_str(),
            "https://fantasy.premierleague.com/api/fixtures/?event=4"
        );
    }

    #[test]
    fn test_endpoint_invalid_base() {
        let c = client("not a url");
        assert!(matches!(
            c.endpoint("bootstrap-static/"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_or_none() {
        assert_eq!(or_none("thing", Ok::<_, FetchError>(5)), Some(5));
        let err = FetchError::HttpStatus {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(or_none::<u32>("thing", Err(err)), None);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_none() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let fetcher = Fetcher::new(FetcherConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        // Nothing listens on port 9
        let c = FplClient::new(fetcher, "http://127.0.0.1:9/api".to_string());

        assert!(c.bootstrap().await.is_none());
        assert!(c.entry_history(TeamId::new(1)).await.is_none());
    }
}
