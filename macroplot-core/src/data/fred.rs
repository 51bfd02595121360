//! FRED observations provider.
//!
//! Fetches one series from the `fred/series/observations` endpoint per call.
//! A single attempt is made; there is no retry or backoff. FRED marks
//! observations without data with the value `"."`, which becomes `None` here.

use super::provider::{DataError, ObservationProvider, ObservationRequest};
use crate::series::{Observation, SeriesId, SeriesTable};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Default FRED observations endpoint.
pub const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Token FRED uses for "no data" in the value field.
pub const MISSING_VALUE_TOKEN: &str = ".";

/// `fred/series/observations` response body (JSON file type).
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// Error body FRED returns with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct FredErrorBody {
    error_code: Option<u16>,
    error_message: Option<String>,
}

/// FRED REST API provider.
pub struct FredProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl FredProvider {
    /// Provider against the public FRED endpoint with the transport's default timeout.
    pub fn new() -> Result<Self, DataError> {
        Self::with_endpoint(FRED_OBSERVATIONS_URL, None)
    }

    pub fn with_endpoint(endpoint: &str, timeout: Option<Duration>) -> Result<Self, DataError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("macroplot/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, request: &ObservationRequest) -> Result<String, DataError> {
        let start = request.observation_start.format("%Y-%m-%d").to_string();
        let query = [
            ("series_id", request.series_id.as_str()),
            ("api_key", request.api_key.as_str()),
            ("file_type", "json"),
            ("observation_start", start.as_str()),
            ("sort_order", request.sort_order.as_str()),
        ];

        tracing::debug!(
            series = %request.series_id,
            endpoint = %self.endpoint,
            observation_start = %start,
            sort_order = %request.sort_order,
            "requesting observations"
        );

        // The URL carries the API key, so it is stripped from transport errors.
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    DataError::NetworkUnreachable(e.without_url().to_string())
                } else {
                    DataError::Transport(e.without_url().to_string())
                }
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        Ok(body)
    }
}

impl ObservationProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, request: &ObservationRequest) -> Result<SeriesTable, DataError> {
        let body = self.send(request)?;
        let table = parse_observations(request.series_id, &body)?;
        tracing::debug!(
            series = %request.series_id,
            rows = table.len(),
            present = table.present_count(),
            "parsed observations"
        );
        Ok(table)
    }
}

/// Coerce a FRED value string to a number.
///
/// Anything that is not a finite number (the `"."` placeholder, blanks, `NaN`)
/// is reported as missing rather than as an error or zero.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == MISSING_VALUE_TOKEN {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an observations JSON body into a date-ordered table.
pub fn parse_observations(series: SeriesId, body: &str) -> Result<SeriesTable, DataError> {
    let resp: ObservationsResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormat(format!("failed to parse response for {series}: {e}"))
    })?;

    let observations = resp
        .observations
        .into_iter()
        .map(|raw| {
            let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|e| {
                DataError::ResponseFormat(format!("invalid date '{}' for {series}: {e}", raw.date))
            })?;
            Ok(Observation::new(date, parse_value(&raw.value)))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    Ok(SeriesTable::new(series, observations))
}

/// Map a non-success status and body to a `DataError`.
fn status_error(status: u16, body: &str) -> DataError {
    let message = serde_json::from_str::<FredErrorBody>(body)
        .ok()
        .and_then(|b| {
            b.error_message.map(|m| match b.error_code {
                Some(code) if code != status => format!("{m} (error code {code})"),
                _ => m,
            })
        })
        .unwrap_or_else(|| "no error message in response".to_string());

    match status {
        401 | 403 => DataError::AuthenticationRejected { status, message },
        429 => DataError::RateLimited,
        _ => DataError::HttpStatus { status, message },
    }
}
