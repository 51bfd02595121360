//! macroplot runner: configuration, pipeline orchestration, chart rendering.
//!
//! This crate builds on `macroplot-core` to provide:
//! - `PipelineConfig` with built-in defaults, TOML loading, and validation
//! - The pipeline: credential check, per-series fetch, all-or-nothing policy,
//!   inner join, render
//! - The dual-axis SVG chart
//! - CSV export of the merged table
//! - Console status reporting

pub mod chart;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod progress;

pub use chart::{render_chart, ChartError};
pub use config::{
    ChartConfig, ConfigError, LineStyle, PipelineConfig, SeriesStyle, API_KEY_PLACEHOLDER,
    DEFAULT_OUTPUT,
};
pub use export::{export_merged_csv, save_merged_csv};
pub use pipeline::{collect_series, run_pipeline, PipelineError, PipelineReport};
pub use progress::{PipelineProgress, StdoutProgress};
