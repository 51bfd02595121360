//! macroplot core: series identifiers, observation tables, the FRED
//! provider, and date alignment.
//!
//! This crate contains everything below the pipeline:
//! - Series identifiers and per-series observation tables
//! - The `ObservationProvider` trait and the FRED REST implementation
//! - Value coercion (FRED's `"."` placeholder becomes a missing value)
//! - The fetch boundary that degrades provider errors to empty tables
//! - Inner join of several series on date

pub mod data;
pub mod series;

pub use series::{Observation, SeriesId, SeriesTable, UnknownSeriesId};
