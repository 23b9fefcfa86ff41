//! Remote and local CSV adapters.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::SourceError;
use crate::models::SourceRecord;
use crate::services::csv::{parse_document, CsvFormat};
use crate::services::source::{FetchRequest, SourceAdapter};

/// A remote CSV body downloaded at most once per run.
///
/// Several indicators read different columns of the same dataset, so their
/// adapters share one `RemoteDocument`. A failed download leaves the cell
/// empty and the next call tries again.
#[derive(Debug)]
pub struct RemoteDocument {
    url: String,
    client: reqwest::Client,
    body: OnceCell<Arc<str>>,
}

impl RemoteDocument {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            client,
            body: OnceCell::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn text(&self) -> Result<Arc<str>, SourceError> {
        self.body
            .get_or_try_init(|| async {
                debug!(url = %self.url, "Downloading CSV document");
                let response = self.client.get(&self.url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::Unavailable(format!(
                        "GET {} returned HTTP {}",
                        self.url, status
                    )));
                }
                let body = response.text().await?;
                Ok::<_, SourceError>(Arc::from(body))
            })
            .await
            .cloned()
    }
}

pub struct RemoteCsvAdapter {
    label: String,
    document: Arc<RemoteDocument>,
    format: CsvFormat,
}

impl RemoteCsvAdapter {
    pub fn new(label: impl Into<String>, document: Arc<RemoteDocument>, format: CsvFormat) -> Self {
        Self {
            label: label.into(),
            document,
            format,
        }
    }
}

#[async_trait]
impl SourceAdapter for RemoteCsvAdapter {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>, SourceError> {
        let text = self.document.text().await?;
        parse_document(&text, &self.format, request)
    }
}

pub struct LocalCsvAdapter {
    label: String,
    path: PathBuf,
    format: CsvFormat,
}

impl LocalCsvAdapter {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, format: CsvFormat) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl SourceAdapter for LocalCsvAdapter {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::Unavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        parse_document(&text, &self.format, request)
    }
}
