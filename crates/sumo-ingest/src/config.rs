//! Importer configuration
//!
//! Settings come from the environment (optionally seeded from a `.env`
//! file) with typed defaults, and are validated once at load.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use sumo_common::types::{BashoId, Division};

// ============================================================================
// Source API Defaults
// ============================================================================

pub const DEFAULT_SUMO_API_BASE_URL: &str = "https://sumo-api.com";

pub const DEFAULT_SUMO_API_TIMEOUT_SECS: u64 = 30;

/// Minimum gap between two requests to the source API.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;

/// Consecutive unassigned ids after which the catalog crawl stops.
pub const DEFAULT_MAX_CONSECUTIVE_MISSES: u32 = 100;

/// Ids scanned past the source-reported total.
pub const DEFAULT_CRAWL_OVERSCAN: u32 = 1000;

/// Attempts per request when the failure is transient.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First pause between attempts; doubles on each retry.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

// ============================================================================
// Job Defaults
// ============================================================================

pub const DEFAULT_BASHO_FROM_YEAR: u32 = 1958;

pub const DEFAULT_BOUTS_FROM_YEAR: u32 = 2023;

pub const DEFAULT_TO_YEAR: u32 = 2025;

pub const DEFAULT_LATEST_BASHO: &str = "202509";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub source: SourceConfig,
    pub jobs: JobConfig,
}

/// Connection settings for the source API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub request_delay_ms: u64,
    pub max_consecutive_misses: u32,
    pub crawl_overscan: u32,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub user_agent: String,
}

/// Period ranges and divisions covered by the batch jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub basho_from_year: u32,
    pub bouts_from_year: u32,
    pub to_year: u32,
    pub latest_basho: BashoId,
    pub bout_divisions: Vec<Division>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SUMO_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_SUMO_API_TIMEOUT_SECS,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            max_consecutive_misses: DEFAULT_MAX_CONSECUTIVE_MISSES,
            crawl_overscan: DEFAULT_CRAWL_OVERSCAN,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            user_agent: format!("sumomine-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SourceConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause before retry number `attempt` (1-based).
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

impl JobConfig {
    /// Default ranges and divisions, ending at `latest_basho`.
    pub fn new(latest_basho: BashoId) -> Self {
        Self {
            basho_from_year: DEFAULT_BASHO_FROM_YEAR,
            bouts_from_year: DEFAULT_BOUTS_FROM_YEAR,
            to_year: DEFAULT_TO_YEAR,
            latest_basho,
            bout_divisions: vec![Division::Makuuchi],
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{key}: {e}")),
        Err(_) => Ok(None),
    }
}

impl IngestConfig {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Build from the current environment without reading `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        let latest_basho = match env_parse("IMPORT_LATEST_BASHO")? {
            Some(latest) => latest,
            None => DEFAULT_LATEST_BASHO.parse()?,
        };
        let mut config = Self {
            source: SourceConfig::default(),
            jobs: JobConfig::new(latest_basho),
        };
        let source = &mut config.source;
        let jobs = &mut config.jobs;

        if let Ok(url) = std::env::var("SUMO_API_BASE_URL") {
            source.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(v) = env_parse("SUMO_API_TIMEOUT_SECS")? {
            source.timeout_secs = v;
        }
        if let Some(v) = env_parse("SUMO_API_REQUEST_DELAY_MS")? {
            source.request_delay_ms = v;
        }
        if let Some(v) = env_parse("SUMO_API_MAX_CONSECUTIVE_MISSES")? {
            source.max_consecutive_misses = v;
        }
        if let Some(v) = env_parse("SUMO_API_CRAWL_OVERSCAN")? {
            source.crawl_overscan = v;
        }
        if let Some(v) = env_parse("SUMO_API_MAX_RETRIES")? {
            source.max_retries = v;
        }
        if let Some(v) = env_parse("SUMO_API_RETRY_BACKOFF_MS")? {
            source.retry_backoff_ms = v;
        }

        if let Some(v) = env_parse("IMPORT_BASHO_FROM_YEAR")? {
            jobs.basho_from_year = v;
        }
        if let Some(v) = env_parse("IMPORT_BOUTS_FROM_YEAR")? {
            jobs.bouts_from_year = v;
        }
        if let Some(v) = env_parse("IMPORT_TO_YEAR")? {
            jobs.to_year = v;
        }
        if let Ok(raw) = std::env::var("IMPORT_BOUT_DIVISIONS") {
            jobs.bout_divisions = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source.base_url.is_empty() {
            anyhow::bail!("SUMO_API_BASE_URL cannot be empty");
        }
        if self.source.max_consecutive_misses == 0 {
            anyhow::bail!("SUMO_API_MAX_CONSECUTIVE_MISSES must be greater than 0");
        }
        if self.source.max_retries == 0 {
            anyhow::bail!("SUMO_API_MAX_RETRIES must be at least 1");
        }
        if self.jobs.basho_from_year > self.jobs.to_year {
            anyhow::bail!(
                "IMPORT_BASHO_FROM_YEAR ({}) is after IMPORT_TO_YEAR ({})",
                self.jobs.basho_from_year,
                self.jobs.to_year
            );
        }
        if self.jobs.bouts_from_year > self.jobs.to_year {
            anyhow::bail!(
                "IMPORT_BOUTS_FROM_YEAR ({}) is after IMPORT_TO_YEAR ({})",
                self.jobs.bouts_from_year,
                self.jobs.to_year
            );
        }
        if self.jobs.bout_divisions.is_empty() {
            anyhow::bail!("IMPORT_BOUT_DIVISIONS must name at least one division");
        }
        if self.source.request_delay_ms == 0 {
            tracing::warn!("Request delay is 0 - the source API may throttle this client");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "SUMO_API_BASE_URL",
        "SUMO_API_REQUEST_DELAY_MS",
        "SUMO_API_MAX_RETRIES",
        "IMPORT_BOUTS_FROM_YEAR",
        "IMPORT_TO_YEAR",
        "IMPORT_LATEST_BASHO",
        "IMPORT_BOUT_DIVISIONS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.source.request_delay(), Duration::from_millis(100));
        assert_eq!(config.source.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.source.max_consecutive_misses, 100);
        assert_eq!(config.source.crawl_overscan, 1000);
        assert_eq!(config.jobs.latest_basho.as_str(), DEFAULT_LATEST_BASHO);
        assert_eq!(config.jobs.bout_divisions, vec![Division::Makuuchi]);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("SUMO_API_BASE_URL", "http://localhost:9999/");
        std::env::set_var("SUMO_API_REQUEST_DELAY_MS", "250");
        std::env::set_var("IMPORT_LATEST_BASHO", "202411");
        std::env::set_var("IMPORT_BOUT_DIVISIONS", "Makuuchi, juryo");

        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.source.base_url, "http://localhost:9999");
        assert_eq!(config.source.request_delay_ms, 250);
        assert_eq!(config.jobs.latest_basho.as_str(), "202411");
        assert_eq!(
            config.jobs.bout_divisions,
            vec![Division::Makuuchi, Division::Juryo]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        clear_env();
        std::env::set_var("IMPORT_LATEST_BASHO", "2025-09");
        assert!(IngestConfig::from_env().is_err());
        clear_env();

        std::env::set_var("IMPORT_LATEST_BASHO", "202513");
        assert!(IngestConfig::from_env().is_err());
        clear_env();

        std::env::set_var("SUMO_API_MAX_RETRIES", "0");
        assert!(IngestConfig::from_env().is_err());
        clear_env();

        std::env::set_var("IMPORT_BOUTS_FROM_YEAR", "2030");
        std::env::set_var("IMPORT_TO_YEAR", "2025");
        assert!(IngestConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_retry_backoff_doubles() {
        let source = SourceConfig {
            retry_backoff_ms: 200,
            ..SourceConfig::default()
        };
        assert_eq!(source.retry_backoff(1), Duration::from_millis(200));
        assert_eq!(source.retry_backoff(3), Duration::from_millis(800));
        assert_eq!(
            SourceConfig { retry_backoff_ms: u64::MAX, ..source }.retry_backoff(4),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn test_job_config_new_uses_defaults() {
        let jobs = JobConfig::new("202401".parse().unwrap());
        assert_eq!(jobs.latest_basho.as_str(), "202401");
        assert_eq!(jobs.bouts_from_year, DEFAULT_BOUTS_FROM_YEAR);
        assert_eq!(jobs.bout_divisions, vec![Division::Makuuchi]);
    }
}
