//! Series fetching and alignment

pub mod align;
pub mod fetch;
pub mod fred;
pub mod provider;

pub use align::{inner_join, MergedRow, MergedTable};
pub use fetch::fetch_series;
pub use fred::{parse_observations, parse_value, FredProvider, FRED_OBSERVATIONS_URL};
pub use provider::{
    DataError, FetchProgress, ObservationProvider, ObservationRequest, SilentProgress, SortOrder,
};
