//! Paginated JSON API adapter (World Bank v2 indicator API).
//!
//! `GET {base}/country/all/indicator/{series}?format=json&per_page=N&page=P&date=START:END`
//! returns `[meta, rows]`. Rows carry `countryiso3code`, `date` and a nullable `value`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::SourceError;
use crate::indicators::parser::{parse_iso3, parse_value, parse_year};
use crate::models::{SourceRecord, YearRange};
use crate::services::source::{FetchRequest, SourceAdapter};

pub const WORLD_BANK_LABEL: &str = "WORLD_BANK";

/// Hard stop for runaway pagination when the meta block is missing.
const MAX_PAGES: u32 = 500;

/// Series requested by the health probe.
const PROBE_SERIES: &str = "SP.POP.TOTL";

pub struct WorldBankAdapter {
    label: String,
    client: reqwest::Client,
    base_url: String,
    series: String,
    per_page: u32,
    page_delay: Duration,
}

impl WorldBankAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, series: impl Into<String>) -> Self {
        Self {
            label: WORLD_BANK_LABEL.to_string(),
            client,
            base_url: base_url.into(),
            series: series.into(),
            per_page: 1000,
            page_delay: Duration::from_millis(250),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Delay inserted between consecutive page requests.
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    fn page_url(&self, series: &str, page: u32, per_page: u32, years: Option<YearRange>) -> Result<Url, SourceError> {
        let raw = format!(
            "{}/country/all/indicator/{}",
            self.base_url.trim_end_matches('/'),
            series
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| SourceError::Unavailable(format!("invalid URL {}: {}", raw, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("format", "json")
                .append_pair("per_page", &per_page.to_string())
                .append_pair("page", &page.to_string());
            if let Some(years) = years {
                query.append_pair("date", &years.to_string());
            }
        }
        Ok(url)
    }

    async fn get_page(&self, url: Url) -> Result<Page, SourceError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "GET {} returned HTTP {}",
                url, status
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("invalid JSON from {}: {}", url, e)))?;
        Page::from_json(body)
    }
}

#[async_trait]
impl SourceAdapter for WorldBankAdapter {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>, SourceError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let url = self.page_url(&self.series, page, self.per_page, Some(request.years))?;
            let batch = self.get_page(url).await?;
            let row_count = batch.rows.len();

            for row in &batch.rows {
                if let Some(record) = parse_row(row) {
                    if request.accepts(&record.iso3, record.year) {
                        records.push(record);
                    }
                }
            }

            debug!(
                series = %self.series,
                page = page,
                rows = row_count,
                "Fetched page {} of {}",
                page,
                self.series
            );

            let last_page = batch.pages.map(|pages| page >= pages).unwrap_or(false);
            if row_count == 0 || row_count < self.per_page as usize || last_page || page >= MAX_PAGES {
                break;
            }

            page += 1;
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(records)
    }

    async fn probe(&self) -> Option<bool> {
        let url = match self.page_url(PROBE_SERIES, 1, 1, None) {
            Ok(url) => url,
            Err(_) => return Some(false),
        };
        Some(self.get_page(url).await.is_ok())
    }
}

/// One decoded response page.
#[derive(Debug)]
struct Page {
    pages: Option<u32>,
    rows: Vec<Value>,
}

impl Page {
    fn from_json(body: Value) -> Result<Self, SourceError> {
        let Value::Array(mut parts) = body else {
            return Err(SourceError::Parse("expected a JSON array payload".to_string()));
        };

        let meta = parts.first().cloned().unwrap_or(Value::Null);
        if let Some(message) = meta.get("message") {
            return Err(SourceError::Parse(format!("upstream error payload: {}", message)));
        }
        let pages = meta.get("pages").and_then(as_u32);

        let rows = if parts.len() > 1 {
            match parts.swap_remove(1) {
                Value::Array(rows) => rows,
                Value::Null => Vec::new(),
                other => {
                    return Err(SourceError::Parse(format!(
                        "expected row array, got {}",
                        other
                    )))
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self { pages, rows })
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Null or missing values are absent, not zero.
fn parse_row(row: &Value) -> Option<SourceRecord> {
    let iso3 = row
        .get("countryiso3code")
        .and_then(Value::as_str)
        .and_then(parse_iso3)?;
    let year = row.get("date").and_then(Value::as_str).and_then(parse_year)?;
    let value = match row.get("value")? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_value(s),
        _ => None,
    }?;
    Some(SourceRecord::new(iso3, year, value))
}
