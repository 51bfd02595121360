//! CSV export of the merged table.

use std::path::Path;

use anyhow::{Context, Result};
use macroplot_core::data::MergedTable;

/// Serialize a merged table as CSV: a `date` column followed by one column
/// per series, named by its FRED code.
pub fn export_merged_csv(table: &MergedTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let header: Vec<&str> = std::iter::once("date")
        .chain(table.columns().iter().map(|id| id.as_str()))
        .collect();
    wtr.write_record(&header)?;

    for row in table.rows() {
        let record: Vec<String> = std::iter::once(row.date.format("%Y-%m-%d").to_string())
            .chain(row.values.iter().map(|v| v.to_string()))
            .collect();
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the merged table to `path`, overwriting any existing file.
pub fn save_merged_csv(table: &MergedTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let csv = export_merged_csv(table)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
