//! Observation provider trait and structured error types.
//!
//! The ObservationProvider trait abstracts over where series come from (the
//! FRED REST API in production) so the pipeline can be driven by mocks in tests.

use crate::series::{SeriesId, SeriesTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured error types for fetching a series.
///
/// These are displayable as a single status line.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("rate limited by provider (HTTP 429)")]
    RateLimited,

    #[error("API key rejected (HTTP {status}): {message}")]
    AuthenticationRejected { status: u16, message: String },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Order in which the provider is asked to return observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one observations request needs.
#[derive(Clone, PartialEq, Eq)]
pub struct ObservationRequest {
    pub series_id: SeriesId,
    pub api_key: String,
    pub observation_start: NaiveDate,
    pub sort_order: SortOrder,
}

// Keep the key out of logs and panic messages.
impl fmt::Debug for ObservationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationRequest")
            .field("series_id", &self.series_id)
            .field("api_key", &"<redacted>")
            .field("observation_start", &self.observation_start)
            .field("sort_order", &self.sort_order)
            .finish()
    }
}

/// Trait for observation sources.
///
/// One call is one request; implementations do not retry.
pub trait ObservationProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch every observation of one series from `observation_start` onward.
    fn fetch(&self, request: &ObservationRequest) -> Result<SeriesTable, DataError>;
}

/// Status callback for per-series fetches.
pub trait FetchProgress {
    /// Called before a series is requested.
    fn on_fetch_start(&self, series: SeriesId, index: usize, total: usize);

    /// Called when a series fetch failed and was degraded to an empty table.
    fn on_fetch_failed(&self, series: SeriesId, error: &DataError);
}

/// Progress sink that discards everything.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_fetch_start(&self, _series: SeriesId, _index: usize, _total: usize) {}

    fn on_fetch_failed(&self, _series: SeriesId, _error: &DataError) {}
}
