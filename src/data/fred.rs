//! FRED API integration for macro and index series.

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::SeriesSource;
use crate::error::{FactorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const API_KEY_VAR: &str = "FRED_API_KEY";

const OBS_LIMIT: usize = 100_000;

/// Connection settings for FRED, passed explicitly to the client.
#[derive(Clone)]
pub struct FredConfig {
    pub api_key: String,
    pub base_url: String,
}

impl FredConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the API key from the environment (after loading `.env`).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_key(std::env::var(API_KEY_VAR).ok())
    }

    /// A missing or blank key is a `MissingCredential` error.
    pub fn from_key(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FactorError::MissingCredential(API_KEY_VAR.to_string()))?;
        Ok(Self::new(api_key))
    }
}

impl std::fmt::Debug for FredConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug)]
pub struct FredClient {
    client: Client,
    config: FredConfig,
}

impl FredClient {
    pub fn new(config: FredConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(FredConfig::from_env()?))
    }
}

impl SeriesSource for FredClient {
    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        debug!(series_id, %start, %end, "requesting FRED observations");

        let start = start.to_string();
        let end = end.to_string();
        let limit = OBS_LIMIT.to_string();
        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.config.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(|e| FactorError::retrieval(series_id, format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(series_id, status, &body));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| FactorError::retrieval(series_id, format!("invalid response: {e}")))?;

        parse_observations(series_id, body)
    }

    fn name(&self) -> &'static str {
        "fred"
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

fn parse_observations(series_id: &str, body: ObservationsResponse) -> Result<Vec<(NaiveDate, f64)>> {
    let mut out = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
            FactorError::retrieval(series_id, format!("invalid date '{}': {e}", obs.date))
        })?;
        out.push((date, value));
    }
    out.sort_by_key(|(d, _)| *d);
    Ok(out)
}

/// FRED reports unknown series and bad keys as 400 with a JSON message.
fn status_error(series_id: &str, status: StatusCode, body: &str) -> FactorError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error_message)
        .unwrap_or_else(|_| "no error message".to_string());
    FactorError::retrieval(series_id, format!("status {status}: {detail}"))
}

/// FRED marks missing values with `"."`.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
