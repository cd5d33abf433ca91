//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults,
//! so a bare `cargo run --bin api` works against a local SQLite file. The
//! feed source list is static for the lifetime of the process.

pub mod sources;

pub use sources::{FeedSource, default_sources};

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Environment variable names. Keeping them public lets tests and the
/// binaries refer to them.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_FEEDS_FILE: &str = "FEEDS_FILE";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_FETCH_CONCURRENCY: &str = "FETCH_CONCURRENCY";
pub const ENV_FETCH_DELAY_MS: &str = "FETCH_DELAY_MS";
pub const ENV_INGEST_INTERVAL_SECS: &str = "INGEST_INTERVAL_SECS";
pub const ENV_INGEST_ON_STARTUP: &str = "INGEST_ON_STARTUP";
pub const ENV_CLEANUP_INTERVAL_SECS: &str = "CLEANUP_INTERVAL_SECS";
pub const ENV_RETENTION_DAYS: &str = "RETENTION_DAYS";
pub const ENV_ENHANCE_INTERVAL_SECS: &str = "ENHANCE_INTERVAL_SECS";
pub const ENV_ENHANCE_BATCH_SIZE: &str = "ENHANCE_BATCH_SIZE";
pub const ENV_VALIDATOR_URL: &str = "VALIDATOR_URL";
pub const ENV_VALIDATOR_TIMEOUT_SECS: &str = "VALIDATOR_TIMEOUT_SECS";
pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const ENV_GNEWS_API_KEY: &str = "GNEWS_API_KEY";
pub const ENV_NEWSDATA_API_KEY: &str = "NEWSDATA_API_KEY";
pub const ENV_THENEWSAPI_KEY: &str = "THENEWSAPI_KEY";

/// Default development values used when environment variables are absent.
const DEFAULT_DATABASE_URL: &str = "sqlite://data/feedwire.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4000";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_CONCURRENCY: usize = 4;
const DEFAULT_FETCH_DELAY_MS: u64 = 250;
const DEFAULT_INGEST_INTERVAL_SECS: u64 = 30 * 60;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_RETENTION_DAYS: u32 = 7;
/// Upper bound on any retention horizon, about a century.
pub const MAX_RETENTION_DAYS: u32 = 36_500;
const DEFAULT_ENHANCE_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_ENHANCE_BATCH_SIZE: u32 = 20;
const DEFAULT_VALIDATOR_TIMEOUT_SECS: u64 = 15;

/// Per-source fetch behaviour for one ingestion cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub concurrency: usize,
    pub delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            delay: Duration::from_millis(DEFAULT_FETCH_DELAY_MS),
        }
    }
}

/// API keys of the fallback news providers. A missing key disables the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub newsapi_org: Option<String>,
    pub gnews: Option<String>,
    pub newsdata_io: Option<String>,
    pub thenewsapi: Option<String>,
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    database_url: String,
    bind_addr: String,
    sources: Vec<FeedSource>,
    fetch: FetchSettings,
    ingest_interval: Duration,
    ingest_on_startup: bool,
    cleanup_interval: Duration,
    retention_days: u32,
    enhance_interval: Duration,
    enhance_batch_size: u32,
    validator_url: Option<String>,
    validator_timeout: Duration,
    provider_keys: ProviderKeys,
}

impl Config {
    /// Create a config with development defaults for everything except the
    /// database and bind address.
    pub fn new(database_url: impl Into<String>, bind_addr: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr: bind_addr.into(),
            sources: default_sources(),
            fetch: FetchSettings::default(),
            ingest_interval: Duration::from_secs(DEFAULT_INGEST_INTERVAL_SECS),
            ingest_on_startup: true,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            retention_days: DEFAULT_RETENTION_DAYS,
            enhance_interval: Duration::from_secs(DEFAULT_ENHANCE_INTERVAL_SECS),
            enhance_batch_size: DEFAULT_ENHANCE_BATCH_SIZE,
            validator_url: None,
            validator_timeout: Duration::from_secs(DEFAULT_VALIDATOR_TIMEOUT_SECS),
            provider_keys: ProviderKeys::default(),
        }
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var(ENV_DATABASE_URL).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let sources = match non_empty_var(ENV_FEEDS_FILE) {
            Some(path) => sources::load_sources_file(Path::new(&path))?,
            None => default_sources(),
        };

        let concurrency: usize = parse_var(ENV_FETCH_CONCURRENCY, DEFAULT_FETCH_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_FETCH_CONCURRENCY,
                reason: "must be at least 1".to_string(),
            });
        }

        let retention_days: u32 = parse_var(ENV_RETENTION_DAYS, DEFAULT_RETENTION_DAYS)?;
        if retention_days > MAX_RETENTION_DAYS {
            return Err(ConfigError::InvalidValue {
                field: ENV_RETENTION_DAYS,
                reason: format!("must be at most {MAX_RETENTION_DAYS}"),
            });
        }

        let fetch = FetchSettings {
            timeout: Duration::from_secs(parse_var(
                ENV_FETCH_TIMEOUT_SECS,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            concurrency,
            delay: Duration::from_millis(parse_var(ENV_FETCH_DELAY_MS, DEFAULT_FETCH_DELAY_MS)?),
        };

        Ok(Self {
            database_url,
            bind_addr,
            sources,
            fetch,
            ingest_interval: Duration::from_secs(parse_var(
                ENV_INGEST_INTERVAL_SECS,
                DEFAULT_INGEST_INTERVAL_SECS,
            )?),
            ingest_on_startup: parse_var(ENV_INGEST_ON_STARTUP, true)?,
            cleanup_interval: Duration::from_secs(parse_var(
                ENV_CLEANUP_INTERVAL_SECS,
                DEFAULT_CLEANUP_INTERVAL_SECS,
            )?),
            retention_days,
            enhance_interval: Duration::from_secs(parse_var(
                ENV_ENHANCE_INTERVAL_SECS,
                DEFAULT_ENHANCE_INTERVAL_SECS,
            )?),
            enhance_batch_size: parse_var(ENV_ENHANCE_BATCH_SIZE, DEFAULT_ENHANCE_BATCH_SIZE)?,
            validator_url: non_empty_var(ENV_VALIDATOR_URL),
            validator_timeout: Duration::from_secs(parse_var(
                ENV_VALIDATOR_TIMEOUT_SECS,
                DEFAULT_VALIDATOR_TIMEOUT_SECS,
            )?),
            provider_keys: ProviderKeys {
                newsapi_org: non_empty_var(ENV_NEWSAPI_KEY),
                gnews: non_empty_var(ENV_GNEWS_API_KEY),
                newsdata_io: non_empty_var(ENV_NEWSDATA_API_KEY),
                thenewsapi: non_empty_var(ENV_THENEWSAPI_KEY),
            },
        })
    }

    /// Database connection string (SQLite URL).
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Feed sources consumed by every ingestion cycle, in configuration order.
    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }
    pub fn fetch(&self) -> &FetchSettings {
        &self.fetch
    }
    pub fn ingest_interval(&self) -> Duration {
        self.ingest_interval
    }
    pub fn ingest_on_startup(&self) -> bool {
        self.ingest_on_startup
    }
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }
    /// Articles whose `created_at` is older than this many days are swept.
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }
    pub fn enhance_interval(&self) -> Duration {
        self.enhance_interval
    }
    pub fn enhance_batch_size(&self) -> u32 {
        self.enhance_batch_size
    }
    /// Credibility validator endpoint; `None` disables enhancement.
    pub fn validator_url(&self) -> Option<&str> {
        self.validator_url.as_deref()
    }
    pub fn validator_timeout(&self) -> Duration {
        self.validator_timeout
    }
    pub fn provider_keys(&self) -> &ProviderKeys {
        &self.provider_keys
    }

    pub fn with_sources(mut self, sources: Vec<FeedSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchSettings) -> Self {
        self.fetch = fetch;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                field: key,
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read feed sources from {path}: {reason}")]
    Sources { path: String, reason: String },
}
