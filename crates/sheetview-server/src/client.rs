use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use sheetview_core::{BatchValues, RawCell, RawGrid};
use thiserror::Error;

use crate::config::Config;

/// Errors raised by a spreadsheet transport
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the spreadsheet API itself
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}

/// Resolves a batch of ranges to raw cell values in a single call
#[async_trait]
pub trait SpreadsheetClient: Send + Sync {
    /// Read every range in `range_keys` from one spreadsheet.
    /// The result is keyed by the requested range strings.
    async fn get_batch_data(
        &self,
        spreadsheet_id: &str,
        range_keys: &[String],
    ) -> Result<BatchValues, ClientError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Google Sheets `values:batchGet` transport
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl GoogleSheetsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        access_token: Option<String>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http,
            base_url,
            api_key,
            access_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            config.sheets_api_base.clone(),
            config.sheets_api_key.clone(),
            config.sheets_access_token.clone(),
        )
    }

    /// `{base}/v4/spreadsheets/{id}/values:batchGet`, with the id encoded as
    /// a single path segment
    fn batch_get_url(&self, spreadsheet_id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .push(spreadsheet_id)
            .push("values:batchGet");
        Ok(url)
    }
}

#[async_trait]
impl SpreadsheetClient for GoogleSheetsClient {
    async fn get_batch_data(
        &self,
        spreadsheet_id: &str,
        range_keys: &[String],
    ) -> Result<BatchValues, ClientError> {
        let url = self.batch_get_url(spreadsheet_id)?;

        let mut query: Vec<(&str, &str)> =
            range_keys.iter().map(|key| ("ranges", key.as_str())).collect();
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let mut request = self.http.get(url).query(&query);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Requesting {} ranges from {}", range_keys.len(), spreadsheet_id);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        parse_batch_response(range_keys, &body)
    }
}

fn api_error(status: reqwest::StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Map a `batchGet` body onto the requested keys.
///
/// The API answers with the resolved range (`DB!A4:A57`) rather than the
/// requested one, but keeps request order, so ranges are matched by position.
fn parse_batch_response(range_keys: &[String], body: &str) -> Result<BatchValues, ClientError> {
    let response: BatchGetResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    if response.value_ranges.len() > range_keys.len() {
        return Err(ClientError::Malformed(format!(
            "expected at most {} value ranges, got {}",
            range_keys.len(),
            response.value_ranges.len()
        )));
    }

    Ok(range_keys
        .iter()
        .zip(response.value_ranges)
        .map(|(key, range)| (key.clone(), grid_from_json(range.values)))
        .collect())
}

fn grid_from_json(values: Vec<Vec<serde_json::Value>>) -> RawGrid {
    values
        .into_iter()
        .map(|row| row.into_iter().map(cell_from_json).collect())
        .collect()
}

fn cell_from_json(value: serde_json::Value) -> RawCell {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
