//! Fetch boundary: one series in, one table out, errors degraded to "unavailable".

use super::provider::{FetchProgress, ObservationProvider, ObservationRequest};
use crate::series::SeriesTable;

/// Fetch one series, swallowing provider errors.
///
/// On failure the error is reported through `progress` and an empty table is
/// returned, which callers treat as "series unavailable".
pub fn fetch_series<P: FetchProgress + ?Sized>(
    provider: &dyn ObservationProvider,
    request: &ObservationRequest,
    progress: &P,
) -> SeriesTable {
    match provider.fetch(request) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(
                provider = provider.name(),
                series = %request.series_id,
                error = %e,
                "fetch failed"
            );
            progress.on_fetch_failed(request.series_id, &e);
            SeriesTable::empty(request.series_id)
        }
    }
}
