//! Pipeline configuration.
//!
//! Everything the run needs (credential, endpoint, date range, which series to
//! chart and how) lives in one `PipelineConfig`. The built-in defaults describe
//! the unemployment vs. PCE inflation chart; a TOML file can override any of it.

use chrono::NaiveDate;
use macroplot_core::data::{ObservationRequest, SortOrder, FRED_OBSERVATIONS_URL};
use macroplot_core::SeriesId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Value that marks the API key as "not configured".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_FRED_API_KEY_HERE";

/// API key compiled into the binary. Replace it with a key from
/// <https://fred.stlouisfed.org/docs/api/api_key.html>, or set `api_key`
/// in a config file.
pub const DEFAULT_API_KEY: &str = API_KEY_PLACEHOLDER;

/// Default chart artifact, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "economic_comparison_plot.svg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no FRED API key configured; obtain one at \
         https://fred.stlouisfed.org/docs/api/api_key.html and set `api_key` \
         in the config file (or DEFAULT_API_KEY)"
    )]
    MissingApiKey,

    #[error("no series configured")]
    NoSeries,

    #[error("series {0} is configured more than once")]
    DuplicateSeries(SeriesId),

    #[error("dual-axis chart needs exactly 2 series, {0} configured")]
    UnsupportedSeriesCount(usize),

    #[error("invalid color '{color}' for {series}: expected #RRGGBB")]
    InvalidColor { series: SeriesId, color: String },

    #[error("chart size must be non-zero, got {width}x{height}")]
    InvalidChartSize { width: u32, height: u32 },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// How a series line is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// Render descriptor for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub id: SeriesId,
    /// Legend entry.
    pub label: String,
    /// Y-axis description.
    pub axis_label: String,
    /// `#RRGGBB`.
    pub color: String,
    pub line: LineStyle,
}

impl SeriesStyle {
    /// Parse `color` into RGB components.
    pub fn rgb(&self) -> Result<(u8, u8, u8), ConfigError> {
        parse_hex_color(&self.color).ok_or_else(|| ConfigError::InvalidColor {
            series: self.id,
            color: self.color.clone(),
        })
    }
}

/// Figure settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub x_label: String,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "US Labor Market (Unemployment) vs. Inflation (PCE Index) | 2000-Present"
                .to_string(),
            x_label: "Date".to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            width: 1200,
            height: 600,
        }
    }
}

/// Full run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub api_key: String,
    pub endpoint: String,
    pub observation_start: NaiveDate,
    pub sort_order: SortOrder,
    /// Per-request timeout. Unset means the HTTP client's default.
    pub request_timeout_secs: Option<u64>,
    /// Also write the merged table as CSV here.
    pub csv_output: Option<PathBuf>,
    /// Series in chart order: the first goes on the primary axis.
    pub series: Vec<SeriesStyle>,
    pub chart: ChartConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            endpoint: FRED_OBSERVATIONS_URL.to_string(),
            observation_start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            sort_order: SortOrder::Asc,
            request_timeout_secs: None,
            csv_output: None,
            series: vec![
                SeriesStyle {
                    id: SeriesId::Unrate,
                    label: "Unemployment Rate".to_string(),
                    axis_label: "Unemployment Rate (%)".to_string(),
                    color: "#008080".to_string(),
                    line: LineStyle::Solid,
                },
                SeriesStyle {
                    id: SeriesId::Pcepi,
                    label: "PCE Price Index".to_string(),
                    axis_label: "PCE Price Index (Index Value)".to_string(),
                    color: "#B22222".to_string(),
                    line: LineStyle::Dashed,
                },
            ],
            chart: ChartConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// True when the key is blank or still the placeholder.
    pub fn api_key_missing(&self) -> bool {
        let key = self.api_key.trim();
        key.is_empty() || key == API_KEY_PLACEHOLDER
    }

    /// Check the configuration before any network activity.
    ///
    /// The API key is checked first so a missing credential is always the
    /// reported problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key_missing() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.series.is_empty() {
            return Err(ConfigError::NoSeries);
        }

        let mut seen = HashSet::new();
        for style in &self.series {
            if !seen.insert(style.id) {
                return Err(ConfigError::DuplicateSeries(style.id));
            }
            style.rgb()?;
        }

        if self.series.len() != 2 {
            return Err(ConfigError::UnsupportedSeriesCount(self.series.len()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::InvalidChartSize {
                width: self.chart.width,
                height: self.chart.height,
            });
        }
        Ok(())
    }

    pub fn series_ids(&self) -> Vec<SeriesId> {
        self.series.iter().map(|s| s.id).collect()
    }

    /// The observations request for one series.
    pub fn request_for(&self, series_id: SeriesId) -> ObservationRequest {
        ObservationRequest {
            series_id,
            api_key: self.api_key.trim().to_string(),
            observation_start: self.observation_start,
            sort_order: self.sort_order,
        }
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
