use chrono::NaiveDate;
use macroplot_core::data::{DataError, FetchProgress, ObservationProvider, ObservationRequest};
use macroplot_core::{Observation, SeriesId, SeriesTable};
use macroplot_runner::{
    collect_series, run_pipeline, ChartConfig, ConfigError, PipelineConfig, PipelineError,
    PipelineProgress,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Serves canned tables and counts requests. Series without an entry fail.
struct MockProvider {
    tables: HashMap<SeriesId, Vec<Observation>>,
    calls: AtomicUsize,
    keys_seen: Mutex<Vec<String>>,
}

impl MockProvider {
    fn new(tables: HashMap<SeriesId, Vec<Observation>>) -> Self {
        Self {
            tables,
            calls: AtomicUsize::new(0),
            keys_seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObservationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, request: &ObservationRequest) -> Result<SeriesTable, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys_seen.lock().unwrap().push(request.api_key.clone());
        match self.tables.get(&request.series_id) {
            Some(obs) => Ok(SeriesTable::new(request.series_id, obs.clone())),
            None => Err(DataError::HttpStatus {
                status: 400,
                message: "Bad Request.  The series does not exist.".into(),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl FetchProgress for RecordingProgress {
    fn on_fetch_start(&self, series: SeriesId, index: usize, total: usize) {
        self.push(format!("start {series} {}/{total}", index + 1));
    }

    fn on_fetch_failed(&self, series: SeriesId, error: &DataError) {
        self.push(format!("failed {series}: {error}"));
    }
}

impl PipelineProgress for RecordingProgress {
    fn on_run_start(&self, series: &[SeriesId]) {
        self.push(format!("run {}", series.len()));
    }

    fn on_series_fetched(&self, series: SeriesId, rows: usize) {
        self.push(format!("fetched {series} {rows}"));
    }

    fn on_merged(&self, rows: usize) {
        self.push(format!("merged {rows}"));
    }

    fn on_chart_saved(&self, path: &Path) {
        self.push(format!("chart {}", path.display()));
    }

    fn on_csv_saved(&self, path: &Path) {
        self.push(format!("csv {}", path.display()));
    }
}

fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        api_key: "test-key".into(),
        chart: ChartConfig {
            output: dir.join("economic_comparison_plot.svg"),
            ..ChartConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn scenario_tables() -> HashMap<SeriesId, Vec<Observation>> {
    HashMap::from([
        (
            SeriesId::Unrate,
            vec![
                Observation::new(d("2020-01-01"), Some(5.0)),
                Observation::new(d("2020-02-01"), None),
            ],
        ),
        (
            SeriesId::Pcepi,
            vec![
                Observation::new(d("2020-01-01"), Some(100.0)),
                Observation::new(d("2020-02-01"), Some(101.0)),
            ],
        ),
    ])
}

#[test]
fn placeholder_key_aborts_without_requests() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        api_key: macroplot_runner::API_KEY_PLACEHOLDER.into(),
        ..config_in(dir.path())
    };
    let provider = MockProvider::new(scenario_tables());
    let progress = RecordingProgress::default();

    let err = run_pipeline(&config, &provider, &progress).unwrap_err();

    assert!(matches!(err, PipelineError::Config(ConfigError::MissingApiKey)));
    assert!(err.is_critical());
    assert_eq!(provider.calls(), 0);
    assert!(progress.lines().is_empty());
    assert!(!config.chart.output.exists());
}

#[test]
fn one_missing_series_aborts_without_chart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut tables = scenario_tables();
    tables.remove(&SeriesId::Pcepi);
    let provider = MockProvider::new(tables);
    let progress = RecordingProgress::default();

    let err = run_pipeline(&config, &provider, &progress).unwrap_err();

    match &err {
        PipelineError::InsufficientSeries {
            fetched,
            required,
            missing,
        } => {
            assert_eq!(*fetched, 1);
            assert_eq!(*required, 2);
            assert_eq!(missing, &vec![SeriesId::Pcepi]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Both series were still attempted.
    assert_eq!(provider.calls(), 2);
    assert!(!config.chart.output.exists());

    let lines = progress.lines();
    assert!(lines.contains(&"fetched UNRATE 2".to_string()));
    assert!(lines.iter().any(|l| l.starts_with("failed PCEPI")));
    assert!(!lines.iter().any(|l| l.starts_with("merged")));
}

#[test]
fn empty_series_counts_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut tables = scenario_tables();
    tables.insert(SeriesId::Unrate, vec![]);
    let provider = MockProvider::new(tables);
    let progress = RecordingProgress::default();

    let err = collect_series(&config, &provider, &progress).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InsufficientSeries { fetched: 1, .. }
    ));
}

#[test]
fn scenario_merges_to_single_row_and_writes_chart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = MockProvider::new(scenario_tables());
    let progress = RecordingProgress::default();

    let report = run_pipeline(&config, &provider, &progress).unwrap();

    assert_eq!(provider.calls(), 2);
    assert!(provider
        .keys_seen
        .lock()
        .unwrap()
        .iter()
        .all(|k| k == "test-key"));

    assert_eq!(
        report.fetched,
        vec![(SeriesId::Unrate, 2), (SeriesId::Pcepi, 2)]
    );
    assert_eq!(report.merged.len(), 1);
    assert_eq!(report.merged.rows()[0].date, d("2020-01-01"));
    assert_eq!(report.merged.rows()[0].values, vec![5.0, 100.0]);

    assert_eq!(report.chart_path, config.chart.output);
    assert!(report.chart_path.exists());
    assert!(report.csv_path.is_none());

    let lines = progress.lines();
    assert_eq!(lines.first().map(String::as_str), Some("run 2"));
    assert!(lines.contains(&"merged 1".to_string()));
    assert!(lines.last().unwrap().starts_with("chart "));
}

#[test]
fn csv_export_written_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path: PathBuf = dir.path().join("merged.csv");
    let config = PipelineConfig {
        csv_output: Some(csv_path.clone()),
        ..config_in(dir.path())
    };
    let provider = MockProvider::new(scenario_tables());
    let progress = RecordingProgress::default();

    let report = run_pipeline(&config, &provider, &progress).unwrap();

    assert_eq!(report.csv_path.as_deref(), Some(csv_path.as_path()));
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("2020-01-01,5,100"));
}

#[test]
fn no_overlapping_dates_fails_at_render() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = MockProvider::new(HashMap::from([
        (
            SeriesId::Unrate,
            vec![Observation::new(d("2020-01-01"), Some(3.5))],
        ),
        (
            SeriesId::Pcepi,
            vec![Observation::new(d("2021-01-01"), Some(110.0))],
        ),
    ]));
    let progress = RecordingProgress::default();

    let err = run_pipeline(&config, &provider, &progress).unwrap_err();
    assert!(matches!(err, PipelineError::Chart(_)));
    assert!(progress.lines().contains(&"merged 0".to_string()));
    assert!(!config.chart.output.exists());
}

#[test]
fn oversized_values_fail_at_render() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut tables = scenario_tables();
    tables.insert(
        SeriesId::Unrate,
        vec![
            Observation::new(d("2020-01-01"), Some(1.7e308)),
            Observation::new(d("2020-02-01"), Some(1.0)),
        ],
    );
    let provider = MockProvider::new(tables);
    let progress = RecordingProgress::default();

    let err = run_pipeline(&config, &provider, &progress).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Chart(macroplot_runner::ChartError::Range(SeriesId::Unrate))
    ));
    assert!(!config.chart.output.exists());
}
