//! Unit tests for configuration defaults

use chrono::Datelike;
use report_card::config::{PipelineConfig, StoreConfig};
use report_card::error::ConfigError;

#[test]
fn defaults_score_the_previous_year() {
    let config = PipelineConfig::default();
    let current = chrono::Utc::now().year();

    assert_eq!(config.scoring_year, current - 1);
    assert_eq!(config.years.start, 2000);
    assert_eq!(config.years.end, current);
    assert_eq!(config.retry_max_retries, 1);
    assert_eq!(config.retry_delay.as_secs(), 3);
    assert!(config.fetch_concurrency > 0);
}

#[test]
fn scoring_year_can_be_overridden() {
    let config = PipelineConfig::default().with_scoring_year(2019);

    assert_eq!(config.scoring_year, 2019);
}

#[test]
fn store_password_is_redacted_in_debug_output() {
    let config = StoreConfig {
        database_url: "postgres://report@localhost/report".to_string(),
        database_password: "hunter2".to_string(),
    };

    let rendered = format!("{:?}", config);

    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("localhost"));
}

#[test]
fn missing_config_names_the_variable() {
    assert_eq!(
        ConfigError::Missing("DATABASE_URL").to_string(),
        "required configuration DATABASE_URL is not set"
    );
}
