use chrono::{Duration, NaiveDate};
use macroplot_core::data::{inner_join, parse_observations};
use macroplot_core::{Observation, SeriesId, SeriesTable};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn observations() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(
        (0i64..240, prop::option::of(-1.0e6..1.0e6f64)),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(offset, value)| Observation::new(base() + Duration::days(offset * 30), value))
            .collect()
    })
}

proptest! {
    #[test]
    fn merged_rows_never_exceed_smallest_input(a in observations(), b in observations()) {
        let ta = SeriesTable::new(SeriesId::Unrate, a);
        let tb = SeriesTable::new(SeriesId::Pcepi, b);
        let merged = inner_join(&[ta.clone(), tb.clone()]);

        prop_assert!(merged.len() <= ta.len().min(tb.len()));
    }

    #[test]
    fn merged_rows_are_complete_and_ascending(a in observations(), b in observations()) {
        let merged = inner_join(&[
            SeriesTable::new(SeriesId::Unrate, a),
            SeriesTable::new(SeriesId::Pcepi, b),
        ]);

        for row in merged.rows() {
            prop_assert_eq!(row.values.len(), 2);
            prop_assert!(row.values.iter().all(|v| v.is_finite()));
        }
        for pair in merged.rows().windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn merging_merged_data_is_idempotent(a in observations(), b in observations()) {
        let once = inner_join(&[
            SeriesTable::new(SeriesId::Unrate, a),
            SeriesTable::new(SeriesId::Pcepi, b),
        ]);
        let twice = inner_join(&once.to_series_tables());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn parsed_tables_are_date_ordered(days in prop::collection::vec(0i64..5000, 0..40)) {
        let items: Vec<String> = days
            .iter()
            .map(|d| {
                let date = base() + Duration::days(*d);
                format!(r#"{{"date": "{}", "value": "{}"}}"#, date, d % 7)
            })
            .collect();
        let body = format!(r#"{{"observations": [{}]}}"#, items.join(","));

        let table = parse_observations(SeriesId::Unrate, &body).unwrap();
        prop_assert_eq!(table.len(), days.len());
        for pair in table.observations().windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
    }
}
