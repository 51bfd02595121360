//! Series identifiers, observations, and per-series tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FRED series codes this tool knows how to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeriesId {
    /// Civilian Unemployment Rate (percent, monthly, seasonally adjusted).
    #[serde(rename = "UNRATE")]
    Unrate,
    /// Personal Consumption Expenditures Price Index (monthly, seasonally adjusted).
    #[serde(rename = "PCEPI")]
    Pcepi,
}

impl SeriesId {
    pub const ALL: [SeriesId; 2] = [SeriesId::Unrate, SeriesId::Pcepi];

    /// The code FRED uses for this series.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesId::Unrate => "UNRATE",
            SeriesId::Pcepi => "PCEPI",
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown series id '{0}' (expected one of: UNRATE, PCEPI)")]
pub struct UnknownSeriesId(pub String);

impl FromStr for SeriesId {
    type Err = UnknownSeriesId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSeriesId(s.to_string()))
    }
}

/// A single dated data point. `value` is `None` when the source had no number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// All observations fetched for one series, ordered ascending by date.
///
/// Built once from a fetch and read-only afterwards. An empty table means the
/// series was unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    id: SeriesId,
    observations: Vec<Observation>,
}

impl SeriesTable {
    /// Build a table, sorting observations by date. The sort is stable, so
    /// same-date observations keep their source order.
    pub fn new(id: SeriesId, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self { id, observations }
    }

    pub fn empty(id: SeriesId) -> Self {
        Self {
            id,
            observations: Vec::new(),
        }
    }

    pub fn id(&self) -> SeriesId {
        self.id
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations carrying a value.
    pub fn present_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.value.is_some())
            .count()
    }

    /// First and last date, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.observations.first(), self.observations.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn series_id_parses_case_insensitively() {
        assert_eq!("UNRATE".parse::<SeriesId>().unwrap(), SeriesId::Unrate);
        assert_eq!("pcepi".parse::<SeriesId>().unwrap(), SeriesId::Pcepi);
        assert!("GDP".parse::<SeriesId>().is_err());
    }

    #[test]
    fn series_id_display_matches_fred_code() {
        for id in SeriesId::ALL {
            assert_eq!(id.to_string(), id.as_str());
        }
    }

    #[test]
    fn table_sorts_by_date() {
        let table = SeriesTable::new(
            SeriesId::Unrate,
            vec![
                Observation::new(d("2020-03-01"), Some(4.4)),
                Observation::new(d("2020-01-01"), Some(3.6)),
                Observation::new(d("2020-02-01"), None),
            ],
        );
        let dates: Vec<_> = table.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d("2020-01-01"), d("2020-02-01"), d("2020-03-01")]);
        assert_eq!(table.present_count(), 2);
        assert_eq!(table.date_range(), Some((d("2020-01-01"), d("2020-03-01"))));
    }

    #[test]
    fn empty_table_has_no_range() {
        let table = SeriesTable::empty(SeriesId::Pcepi);
        assert!(table.is_empty());
        assert_eq!(table.date_range(), None);
    }
}
