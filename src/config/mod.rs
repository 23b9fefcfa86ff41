//! Environment-driven configuration.
//!
//! Store credentials are required and their absence is fatal. Every other
//! setting has a default that matches the observed deployment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::Datelike;

use crate::error::ConfigError;
use crate::models::YearRange;

pub const DEFAULT_WORLD_BANK_BASE_URL: &str = "https://api.worldbank.org/v2";
pub const DEFAULT_OWID_CO2_URL: &str =
    "https://raw.githubusercontent.com/owid/co2-data/master/owid-co2-data.csv";
pub const DEFAULT_OWID_ENERGY_URL: &str =
    "https://raw.githubusercontent.com/owid/energy-data/master/owid-energy-data.csv";

/// Deployment environment name (`production`, `sandbox`, ...).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Connection credentials for the canonical store.
#[derive(Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub database_password: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &self.database_url)
            .field("database_password", &"<redacted>")
            .finish()
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_password: required("DATABASE_PASSWORD")?,
        })
    }
}

/// Upstream endpoints used to build source adapters.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub world_bank_base_url: String,
    pub owid_co2_url: String,
    pub owid_energy_url: String,
    pub local_data_dir: PathBuf,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            world_bank_base_url: DEFAULT_WORLD_BANK_BASE_URL.to_string(),
            owid_co2_url: DEFAULT_OWID_CO2_URL.to_string(),
            owid_energy_url: DEFAULT_OWID_ENERGY_URL.to_string(),
            local_data_dir: PathBuf::from("data"),
        }
    }
}

/// Tunables for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub environment: String,
    pub scoring_year: i32,
    pub years: YearRange,
    pub fetch_concurrency: usize,
    pub request_timeout: Duration,
    pub retry_delay: Duration,
    /// Extra attempts after a source's first failure.
    pub retry_max_retries: usize,
    pub page_delay: Duration,
    pub write_batch_size: usize,
    pub qa_missing_threshold: f64,
    pub endpoints: SourceEndpoints,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let current_year = chrono::Utc::now().year();
        Self {
            environment: "sandbox".to_string(),
            scoring_year: current_year - 1,
            years: YearRange::new(2000, current_year),
            fetch_concurrency: 4,
            request_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(3),
            retry_max_retries: 1,
            page_delay: Duration::from_millis(250),
            write_batch_size: 500,
            qa_missing_threshold: 0.5,
            endpoints: SourceEndpoints::default(),
        }
    }
}

impl PipelineConfig {
    /// Build the run configuration from the process environment.
    ///
    /// Optional values that are present but unparsable are rejected rather
    /// than silently replaced by defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_year = optional("MIN_YEAR", defaults.years.start)?;
        let max_year = optional("MAX_YEAR", defaults.years.end)?;
        if min_year > max_year {
            return Err(ConfigError::Invalid {
                key: "MIN_YEAR",
                value: format!("{} > MAX_YEAR {}", min_year, max_year),
            });
        }

        let fetch_concurrency: usize = optional("FETCH_CONCURRENCY", defaults.fetch_concurrency)?;
        let write_batch_size: usize = optional("WRITE_BATCH_SIZE", defaults.write_batch_size)?;
        if fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "FETCH_CONCURRENCY",
                value: "0".to_string(),
            });
        }
        if write_batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "WRITE_BATCH_SIZE",
                value: "0".to_string(),
            });
        }

        let qa_missing_threshold: f64 =
            optional("QA_MISSING_THRESHOLD", defaults.qa_missing_threshold)?;
        if !(0.0..=1.0).contains(&qa_missing_threshold) {
            return Err(ConfigError::Invalid {
                key: "QA_MISSING_THRESHOLD",
                value: qa_missing_threshold.to_string(),
            });
        }

        Ok(Self {
            environment: get_environment(),
            scoring_year: optional("SCORING_YEAR", defaults.scoring_year)?,
            years: YearRange::new(min_year, max_year),
            fetch_concurrency,
            request_timeout: Duration::from_secs(optional(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            retry_delay: Duration::from_secs(optional(
                "RETRY_DELAY_SECS",
                defaults.retry_delay.as_secs(),
            )?),
            retry_max_retries: optional("RETRY_MAX_RETRIES", defaults.retry_max_retries)?,
            page_delay: Duration::from_millis(optional(
                "PAGE_DELAY_MS",
                defaults.page_delay.as_millis() as u64,
            )?),
            write_batch_size,
            qa_missing_threshold,
            endpoints: SourceEndpoints {
                world_bank_base_url: env::var("WORLD_BANK_BASE_URL")
                    .unwrap_or(defaults.endpoints.world_bank_base_url),
                owid_co2_url: env::var("OWID_CO2_URL").unwrap_or(defaults.endpoints.owid_co2_url),
                owid_energy_url: env::var("OWID_ENERGY_URL")
                    .unwrap_or(defaults.endpoints.owid_energy_url),
                local_data_dir: env::var("LOCAL_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.endpoints.local_data_dir),
            },
        })
    }

    pub fn with_scoring_year(mut self, scoring_year: i32) -> Self {
        self.scoring_year = scoring_year;
        self
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn optional<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}
