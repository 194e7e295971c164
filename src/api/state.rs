use std::sync::Arc;

use crate::config::AppConfig;
use crate::fpl::FantasyApi;
use crate::ingest::LeagueIngest;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn FantasyApi>,
    pub ingest: LeagueIngest,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(api: Arc<dyn FantasyApi>, config: Arc<AppConfig>) -> Self {
        Self {
            ingest: LeagueIngest::new(api.clone()),
            api,
            config,
        }
    }
}
