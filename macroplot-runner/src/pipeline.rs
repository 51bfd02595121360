//! Pipeline orchestration: validate → fetch → merge → render.
//!
//! There is one abort point before any network traffic (missing credential)
//! and one after fetching (not every configured series returned data). In both
//! cases nothing is written to disk.

use crate::chart::{render_chart, ChartError};
use crate::config::{ConfigError, PipelineConfig};
use crate::export::save_merged_csv;
use crate::progress::PipelineProgress;
use macroplot_core::data::{fetch_series, inner_join, MergedTable, ObservationProvider};
use macroplot_core::{SeriesId, SeriesTable};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "could not fetch all required data series ({fetched} of {required}); missing: {}",
        join_ids(.missing)
    )]
    InsufficientSeries {
        fetched: usize,
        required: usize,
        missing: Vec<SeriesId>,
    },

    #[error("failed to render chart: {0}")]
    Chart(#[from] ChartError),

    #[error("failed to export merged table: {0:#}")]
    Export(anyhow::Error),
}

impl PipelineError {
    /// Configuration problems are reported as critical.
    pub fn is_critical(&self) -> bool {
        matches!(self, PipelineError::Config(_))
    }
}

fn join_ids(ids: &[SeriesId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a successful run produced.
#[derive(Debug)]
pub struct PipelineReport {
    /// Row count per fetched series, in configured order.
    pub fetched: Vec<(SeriesId, usize)>,
    pub merged: MergedTable,
    pub chart_path: PathBuf,
    pub csv_path: Option<PathBuf>,
}

/// Fetch every configured series, failing unless all of them returned data.
///
/// Tables come back in configured order.
pub fn collect_series(
    config: &PipelineConfig,
    provider: &dyn ObservationProvider,
    progress: &dyn PipelineProgress,
) -> Result<Vec<SeriesTable>, PipelineError> {
    let ids = config.series_ids();
    let total = ids.len();
    let mut tables = Vec::with_capacity(total);
    let mut missing = Vec::new();

    for (i, id) in ids.iter().enumerate() {
        progress.on_fetch_start(*id, i, total);
        let table = fetch_series(provider, &config.request_for(*id), progress);
        if table.is_empty() {
            missing.push(*id);
        } else {
            progress.on_series_fetched(*id, table.len());
            tables.push(table);
        }
    }

    if !missing.is_empty() {
        return Err(PipelineError::InsufficientSeries {
            fetched: tables.len(),
            required: total,
            missing,
        });
    }
    Ok(tables)
}

/// Run the whole pipeline with `provider` as the data source.
pub fn run_pipeline(
    config: &PipelineConfig,
    provider: &dyn ObservationProvider,
    progress: &dyn PipelineProgress,
) -> Result<PipelineReport, PipelineError> {
    config.validate()?;

    let ids = config.series_ids();
    progress.on_run_start(&ids);
    tracing::info!(provider = provider.name(), series = %join_ids(&ids), "pipeline started");

    let tables = collect_series(config, provider, progress)?;
    let fetched: Vec<(SeriesId, usize)> = tables.iter().map(|t| (t.id(), t.len())).collect();

    let merged = inner_join(&tables);
    tracing::info!(
        inputs = ?fetched,
        rows = merged.len(),
        "series merged"
    );
    progress.on_merged(merged.len());

    render_chart(&merged, &config.series, &config.chart)?;
    progress.on_chart_saved(&config.chart.output);

    let csv_path = match &config.csv_output {
        Some(path) => {
            save_merged_csv(&merged, path).map_err(PipelineError::Export)?;
            progress.on_csv_saved(path);
            Some(path.clone())
        }
        None => None,
    };

    Ok(PipelineReport {
        fetched,
        merged,
        chart_path: config.chart.output.clone(),
        csv_path,
    })
}
