//! HTTP fetching with caching.
//!
//! Fetches JSON documents from the upstream API and caches the raw bodies
//! locally for a short TTL, so a burst of dashboard requests costs one
//! upstream call per URL.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ApiConfig;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata stored alongside a cached body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_length: usize,
    pub expires_at: DateTime<Utc>,
}

impl CacheMetadata {
    fn new(url: &Url, content_length: usize, ttl: Duration) -> Self {
        let fetched_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        Self {
            url: url.to_string(),
            fetched_at,
            content_length,
            expires_at: fetched_at + ttl,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Where a URL's body and metadata live on disk.
struct CachePaths {
    body: PathBuf,
    meta: PathBuf,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory to cache raw responses
    pub cache_dir: PathBuf,

    /// How long cached content is considered fresh
    pub cache_ttl: Duration,

    /// Maximum body size to accept (bootstrap-static is a few MB)
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            cache_ttl: Duration::from_secs(300),
            max_content_size: 20 * 1024 * 1024,
            timeout: Duration::from_secs(15),
            user_agent: format!("fpl-league/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&ApiConfig> for FetcherConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            cache_dir: api.cache_dir.clone(),
            cache_ttl: api.cache_ttl(),
            timeout: Duration::from_secs(api.timeout_seconds),
            user_agent: api.user_agent.clone(),
            ..Default::default()
        }
    }
}

/// HTTP fetcher with local caching.
///
/// A fresh cached body is served without touching the network. When the
/// upstream call fails, an expired body is served instead of the error.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("fpl-league")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch and decode a JSON document.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let body = self.fetch_body(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_body(&self, url: &Url) -> Result<String, FetchError> {
        let paths = self.cache_paths(url);
        let cached = Self::read_cache(&paths).await;

        if let Some((meta, body)) = &cached {
            if meta.is_fresh(Utc::now()) {
                debug!("Serving {} from cache", url);
                return Ok(body.clone());
            }
        }

        match self.download(url).await {
            Ok(body) => {
                if let Err(e) = self.write_cache(url, &paths, &body).await {
                    warn!("Failed to cache {}: {}", url, e);
                }
                Ok(body)
            }
            Err(e) => match cached {
                Some((meta, body)) => {
                    warn!(
                        "Upstream failed for {} ({}), serving copy from {}",
                        url, e, meta.fetched_at
                    );
                    Ok(body)
                }
                None => Err(e),
            },
        }
    }

    /// Cached metadata and body, if both are present and the body is JSON.
    async fn read_cache(paths: &CachePaths) -> Option<(CacheMetadata, String)> {
        let meta = fs::read_to_string(&paths.meta).await.ok()?;
        let meta: CacheMetadata = serde_json::from_str(&meta).ok()?;
        let body = fs::read_to_string(&paths.body).await.ok()?;
        if serde_json::from_str::<serde::de::IgnoredAny>(&body).is_err() {
            debug!("Ignoring unreadable cache entry for {}", meta.url);
            return None;
        }
        Some((meta, body))
    }

    async fn download(&self, url: &Url) -> Result<String, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        if body.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: body.len(),
                max_size: self.config.max_content_size,
            });
        }

        // FPL serves an HTML page while the game is updating
        serde_json::from_str::<serde::de::IgnoredAny>(&body)?;

        Ok(body)
    }

    async fn write_cache(&self, url: &Url, paths: &CachePaths, body: &str) -> Result<(), FetchError> {
        if let Some(parent) = paths.body.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Body first: a reader pairing new metadata with an old body still
        // gets valid JSON.
        write_atomic(&paths.body, body.as_bytes()).await?;

        let meta = CacheMetadata::new(url, body.len(), self.config.cache_ttl);
        write_atomic(&paths.meta, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(())
    }

    /// `{cache_dir}/{host}/{hash}.json` plus a `.meta.json` sidecar.
    fn cache_paths(&self, url: &Url) -> CachePaths {
        let dir = self
            .config
            .cache_dir
            .join(url.host_str().unwrap_or("unknown"));
        let hash = Self::url_hash(url);
        CachePaths {
            body: dir.join(format!("{}.json", hash)),
            meta: dir.join(format!("{}.meta.json", hash)),
        }
    }

    /// First 8 bytes of the URL's SHA-256, hex encoded.
    fn url_hash(url: &Url) -> String {
        let digest = Sha256::digest(url.as_str().as_bytes());
        hex::encode(&digest[..8])
    }
}

/// Write to a sibling temp file, then rename over `path`, so concurrent
/// readers never see a partial file.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), FetchError> {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let tmp = path.with_extension(format!(
        "{}.{}.tmp",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> FetcherConfig {
        FetcherConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            cache_ttl: Duration::from_secs(3600),
            max_content_size: 1024 * 1024,
            timeout: Duration::from_secs(2),
            user_agent: "test-agent".to_string(),
        }
    }

    async fn seed_cache(fetcher: &Fetcher, url: &Url, body: &str, expires_at: DateTime<Utc>) {
        let paths = fetcher.cache_paths(url);
        fs::create_dir_all(paths.body.parent().unwrap()).await.unwrap();
        fs::write(&paths.body, body).await.unwrap();

        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at: expires_at - chrono::Duration::minutes(5),
            content_length: body.len(),
            expires_at,
        };
        fs::write(&paths.meta, serde_json::to_string(&meta).unwrap())
            .await
            .unwrap();
    }

    #[test]
    fn test_url_hash() {
        let url1 = Url::parse("https://example.com/entry/1/").unwrap();
        let url2 = Url::parse("https://example.com/entry/2/").unwrap();

        let hash1 = Fetcher::url_hash(&url1);
        assert_ne!(hash1, Fetcher::url_hash(&url2));
        assert_eq!(hash1.len(), 16);
    }

    #[test]
    fn test_cache_paths() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        let url = Url::parse("https://fantasy.premierleague.com/api/bootstrap-static/").unwrap();
        let paths = fetcher.cache_paths(&url);

        assert!(paths.body.starts_with(temp_dir.path().join("fantasy.premierleague.com")));
        assert!(paths.body.to_string_lossy().ends_with(".json"));
        assert!(paths.meta.to_string_lossy().ends_with(".meta.json"));
        assert_eq!(paths.body.parent(), paths.meta.parent());
    }

    #[test]
    fn test_metadata_freshness() {
        let url = Url::parse("https://example.com/").unwrap();
        let meta = CacheMetadata::new(&url, 10, Duration::from_secs(60));

        assert!(meta.is_fresh(meta.fetched_at));
        assert!(!meta.is_fresh(meta.fetched_at + chrono::Duration::seconds(61)));
        assert_eq!(meta.content_length, 10);
    }

    #[tokio::test]
    async fn test_fresh_cache_is_served_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        // Nothing listens on port 9
        let url = Url::parse("http://127.0.0.1:9/api/entry/1/").unwrap();
        let expires = Utc::now() + chrono::Duration::minutes(5);
        seed_cache(&fetcher, &url, r#"{"id": 1, "name": "Cached"}"#, expires).await;

        let value: serde_json::Value = fetcher.fetch_json(&url).await.unwrap();
        assert_eq!(value["name"], "Cached");
    }

    #[tokio::test]
    async fn test_stale_cache_served_when_upstream_fails() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        let url = Url::parse("http://127.0.0.1:9/api/entry/2/").unwrap();
        let expired = Utc::now() - chrono::Duration::hours(2);
        seed_cache(&fetcher, &url, r#"{"id": 2}"#, expired).await;

        let value: serde_json::Value = fetcher.fetch_json(&url).await.unwrap();
        assert_eq!(value["id"], 2);
    }

    #[tokio::test]
    async fn test_no_cache_and_no_upstream_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        let url = Url::parse("http://127.0.0.1:9/api/entry/3/").unwrap();
        let result = fetcher.fetch_json::<serde_json::Value>(&url).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn test_truncated_fresh_body_falls_through_to_download() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        let url = Url::parse("http://127.0.0.1:9/api/entry/5/").unwrap();
        let expires = Utc::now() + chrono::Duration::minutes(5);
        seed_cache(&fetcher, &url, r#"{"id": 1, "na"#, expires).await;

        assert!(Fetcher::read_cache(&fetcher.cache_paths(&url)).await.is_none());

        // The download is attempted (and fails) instead of a parse error
        let result = fetcher.fetch_json::<serde_json::Value>(&url).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn test_write_cache_round_trip_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        let url = Url::parse("https://fantasy.premierleague.com/api/event/1/live/").unwrap();
        let paths = fetcher.cache_paths(&url);
        fetcher
            .write_cache(&url, &paths, r#"{"elements": []}"#)
            .await
            .unwrap();
        fetcher
            .write_cache(&url, &paths, r#"{"elements": [1]}"#)
            .await
            .unwrap();

        let (meta, body) = Fetcher::read_cache(&paths).await.unwrap();
        assert_eq!(body, r#"{"elements": [1]}"#);
        assert!(meta.is_fresh(Utc::now()));

        let mut entries = fs::read_dir(paths.body.parent().unwrap()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        assert_eq!(names.len(), 2, "{:?}", names);
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }

    #[tokio::test]
    async fn test_concurrent_writers_never_expose_partial_body() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(Fetcher::new(test_config(&temp_dir)).unwrap());
        let url = Url::parse("https://fantasy.premierleague.com/api/bootstrap-static/").unwrap();
        let body = format!(r#"{{"events": [{}]}}"#, vec!["1"; 20_000].join(","));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let (fetcher, url, body) = (fetcher.clone(), url.clone(), body.clone());
            handles.push(tokio::spawn(async move {
                let paths = fetcher.cache_paths(&url);
                for _ in 0..10 {
                    fetcher.write_cache(&url, &paths, &body).await.unwrap();
                    if let Some((_, cached)) = Fetcher::read_cache(&paths).await {
                        assert_eq!(cached.len(), body.len());
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir)).unwrap();

        let url = Url::parse("http://127.0.0.1:9/api/entry/4/").unwrap();
        let paths = fetcher.cache_paths(&url);
        fs::create_dir_all(paths.body.parent().unwrap()).await.unwrap();
        fs::write(&paths.body, "{}").await.unwrap();
        fs::write(&paths.meta, "not json").await.unwrap();

        assert!(Fetcher::read_cache(&paths).await.is_none());
    }

    #[test]
    fn test_fetcher_config_from_api_config() {
        let mut api = ApiConfig::default();
        api.cache_ttl = "10m".to_string();
        api.timeout_seconds = 7;

        let config = FetcherConfig::from(&api);
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.cache_dir, PathBuf::from("./data/cache"));
    }
}
