use std::path::{Path, PathBuf};

use reqwest::header::ACCEPT;

use crate::config::ApiConfig;
use crate::error::SourceError;
use crate::models::ReclamationRecord;

/// Where reclamation records come from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Http(HttpSource),
    JsonFile(PathBuf),
    CsvFile(PathBuf),
    Mock,
}

impl RecordSource {
    pub async fn fetch_all(&self) -> Result<Vec<ReclamationRecord>, SourceError> {
        let records = match self {
            Self::Http(source) => source.fetch_all().await?,
            Self::JsonFile(path) => load_json(path).await?,
            Self::CsvFile(path) => load_csv(path).await?,
            Self::Mock => mock_records(),
        };

        tracing::info!(
            source = %self.describe(),
            count = records.len(),
            "fetched reclamation records"
        );
        Ok(records)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(source) => source.config.url.clone(),
            Self::JsonFile(path) | Self::CsvFile(path) => path.display().to_string(),
            Self::Mock => "mock data".to_string(),
        }
    }
}

/// Client for the upstream reclamation API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpSource {
    pub fn new(config: ApiConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SourceError::Http {
                url: config.url.clone(),
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Retries transport failures and 5xx up to `retries` times.
    pub async fn fetch_all(&self) -> Result<Vec<ReclamationRecord>, SourceError> {
        let attempts = 1 + u32::from(self.config.retries());
        let mut attempt = 1;

        loop {
            match self.fetch_once().await {
                Ok(records) => return Ok(records),
                Err(err) if attempt < attempts && is_retryable(&err) => {
                    tracing::warn!(attempt, error = %err, "upstream fetch failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self) -> Result<Vec<ReclamationRecord>, SourceError> {
        let url = &self.config.url;
        tracing::debug!(%url, "requesting reclamation records");

        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        decode_records(&body, url)
    }

    fn transport_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                url: self.config.url.clone(),
                seconds: self.config.timeout().as_secs(),
            }
        } else {
            SourceError::Http {
                url: self.config.url.clone(),
                message: err.to_string(),
            }
        }
    }
}

fn is_retryable(err: &SourceError) -> bool {
    match err {
        SourceError::Http { .. } | SourceError::Timeout { .. } => true,
        SourceError::Status { status, .. } => *status >= 500,
        _ => false,
    }
}

pub fn decode_records(body: &str, origin: &str) -> Result<Vec<ReclamationRecord>, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Decode {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

async fn read_file(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })
}

async fn load_json(path: &Path) -> Result<Vec<ReclamationRecord>, SourceError> {
    let body = read_file(path).await?;
    decode_records(&body, &path.display().to_string())
}

/// Expects a header row with `date,product,customer,reason`.
async fn load_csv(path: &Path) -> Result<Vec<ReclamationRecord>, SourceError> {
    let contents = read_file(path).await?;
    let mut reader = csv::Reader::from_reader(contents.as_bytes());
    let mut records = Vec::new();

    for result in reader.deserialize::<ReclamationRecord>() {
        let record = result.map_err(|source| SourceError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

pub fn mock_records() -> Vec<ReclamationRecord> {
    vec![
        ReclamationRecord::new(
            "2024-12-15",
            "Sample Product A",
            "Test Customer",
            "Quality Issue - Minor defect",
        ),
        ReclamationRecord::new(
            "2024-12-10",
            "Sample Product B",
            "Demo Customer",
            "Packaging - Damaged during shipping",
        ),
        ReclamationRecord::new(
            "2024-12-05",
            "Sample Product C",
            "Preview Customer",
            "Functionality - Not working as expected",
        ),
    ]
}
