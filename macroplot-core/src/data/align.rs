//! Multi-series date alignment.
//!
//! Given tables for several series, keep only the dates where every series has
//! a value. Nothing is interpolated or forward-filled: a date missing from any
//! table, or carrying a missing value in any table, is dropped.

use crate::series::{Observation, SeriesId, SeriesTable};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One aligned date. `values[i]` belongs to `MergedTable::columns()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Inner join of several series on date.
///
/// Every row has a finite value for every column, and rows are strictly
/// ascending by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedTable {
    columns: Vec<SeriesId>,
    rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn columns(&self) -> &[SeriesId] {
        &self.columns
    }

    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, id: SeriesId) -> Option<usize> {
        self.columns.iter().position(|c| *c == id)
    }

    /// `(date, value)` points for one column, in date order.
    pub fn points(&self, id: SeriesId) -> Vec<(NaiveDate, f64)> {
        match self.column_index(id) {
            Some(i) => self.rows.iter().map(|r| (r.date, r.values[i])).collect(),
            None => Vec::new(),
        }
    }

    /// Minimum and maximum of one column.
    pub fn value_range(&self, id: SeriesId) -> Option<(f64, f64)> {
        let i = self.column_index(id)?;
        self.rows.iter().map(|r| r.values[i]).fold(None, |acc, v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Split back into one table per column.
    pub fn to_series_tables(&self) -> Vec<SeriesTable> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let obs = self
                    .rows
                    .iter()
                    .map(|r| Observation::new(r.date, Some(r.values[i])))
                    .collect();
                SeriesTable::new(*id, obs)
            })
            .collect()
    }
}

/// Inner-join tables on date and drop any date with a missing value.
///
/// Columns follow the order of `tables`. If a table repeats a date, its last
/// observation for that date wins. With no tables the result is empty.
pub fn inner_join(tables: &[SeriesTable]) -> MergedTable {
    let columns: Vec<SeriesId> = tables.iter().map(|t| t.id()).collect();

    if tables.is_empty() {
        return MergedTable::default();
    }

    // Build a lookup per series: date → value
    let lookups: Vec<BTreeMap<NaiveDate, Option<f64>>> = tables
        .iter()
        .map(|t| {
            t.observations()
                .iter()
                .map(|o| (o.date, o.value.filter(|v| v.is_finite())))
                .collect()
        })
        .collect();

    // Walk the first table's dates; the others only filter.
    let rows: Vec<MergedRow> = lookups[0]
        .keys()
        .filter_map(|date| {
            let values = lookups
                .iter()
                .map(|lookup| lookup.get(date).copied().flatten())
                .collect::<Option<Vec<f64>>>()?;
            Some(MergedRow {
                date: *date,
                values,
            })
        })
        .collect();

    MergedTable { columns, rows }
}
