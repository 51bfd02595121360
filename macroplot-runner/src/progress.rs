//! Console status reporting for a pipeline run.

use macroplot_core::data::{DataError, FetchProgress};
use macroplot_core::SeriesId;
use std::path::Path;

/// Callbacks for every status line a run produces.
pub trait PipelineProgress: FetchProgress {
    /// Called once before any series is fetched.
    fn on_run_start(&self, series: &[SeriesId]);

    /// Called when a series returned data.
    fn on_series_fetched(&self, series: SeriesId, rows: usize);

    /// Called after the join with the number of complete rows.
    fn on_merged(&self, rows: usize);

    /// Called after the chart file is written.
    fn on_chart_saved(&self, path: &Path);

    /// Called after the CSV export is written.
    fn on_csv_saved(&self, path: &Path);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_fetch_start(&self, series: SeriesId, index: usize, total: usize) {
        println!("[{}/{}] Fetching {series}...", index + 1, total);
    }

    fn on_fetch_failed(&self, series: SeriesId, error: &DataError) {
        println!(
            "ERROR: Failed to fetch data for {series}. \
             Ensure your FRED API key is valid and there is internet connectivity."
        );
        println!("Details: {error}");
    }
}

impl PipelineProgress for StdoutProgress {
    fn on_run_start(&self, _series: &[SeriesId]) {
        println!("--- Starting Economic Data Pipeline ---");
    }

    fn on_series_fetched(&self, series: SeriesId, _rows: usize) {
        println!("Status: Fetched {series} successfully.");
    }

    fn on_merged(&self, rows: usize) {
        println!(
            "\nCleaning Status: Data merged and missing values dropped. \
             Total observations: {rows}."
        );
    }

    fn on_chart_saved(&self, path: &Path) {
        println!(
            "\nVisualization complete. Plot saved as '{}'.",
            path.display()
        );
    }

    fn on_csv_saved(&self, path: &Path) {
        println!("Merged table written to '{}'.", path.display());
    }
}
