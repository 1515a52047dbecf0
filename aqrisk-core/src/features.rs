use tracing::debug;

use crate::error::EngineError;
use crate::model::{DailyRecord, FeatureRow};

/// Build the supervised table from the aligned grid: day t's AQI and fire
/// intensity predict day t+1's AQI. Pairs touching an imputed day are
/// skipped; order is chronological.
pub fn build_features(
    records: &[DailyRecord],
    min_rows: usize,
) -> Result<Vec<FeatureRow>, EngineError> {
    let mut rows = Vec::new();
    for pair in records.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.is_imputed || next.is_imputed {
            continue;
        }
        rows.push(FeatureRow {
            date: next.date,
            prev_aqi: prev.aqi,
            fire_intensity: prev.fire_intensity,
            target_aqi: next.aqi,
        });
    }

    if rows.len() < min_rows {
        return Err(EngineError::InsufficientData(format!(
            "{} feature row(s) built, {min_rows} required for stable training",
            rows.len()
        )));
    }

    debug!(rows = rows.len(), "built feature table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(d: u32, aqi: f64, fire: f64, imputed: bool) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 11, d).expect("valid date"),
            aqi,
            fire_intensity: fire,
            is_imputed: imputed,
        }
    }

    #[test]
    fn pairs_adjacent_days() {
        let records = vec![
            record(1, 40.0, 100.0, false),
            record(2, 55.0, 0.0, false),
            record(3, 50.0, 20.0, false),
        ];
        let rows = build_features(&records, 1).expect("builds");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, records[1].date);
        assert_eq!(rows[0].prev_aqi, 40.0);
        assert_eq!(rows[0].fire_intensity, 100.0);
        assert_eq!(rows[0].target_aqi, 55.0);
        assert_eq!(rows[1].prev_aqi, 55.0);
        assert_eq!(rows[1].target_aqi, 50.0);
    }

    #[test]
    fn imputed_days_drop_both_their_pairs() {
        let records = vec![
            record(1, 40.0, 0.0, false),
            record(2, 45.0, 0.0, false),
            record(3, 45.0, 0.0, true),
            record(4, 50.0, 0.0, false),
            record(5, 55.0, 0.0, false),
        ];
        let rows = build_features(&records, 1).expect("builds");

        // (1,2) and (4,5); the pairs touching day 3 are gone.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, records[1].date);
        assert_eq!(rows[1].date, records[4].date);
    }

    #[test]
    fn full_grid_yields_n_minus_one_rows() {
        let records: Vec<DailyRecord> =
            (1..=10).map(|d| record(d, 40.0 + f64::from(d), 0.0, false)).collect();
        let rows = build_features(&records, 1).expect("builds");
        assert_eq!(rows.len(), 9);
    }

    #[test]
    fn too_few_rows_is_insufficient() {
        let records = vec![record(1, 40.0, 0.0, false), record(2, 45.0, 0.0, false)];
        let err = build_features(&records, 10).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData(_)));
    }

    #[test]
    fn chronological_order_is_preserved() {
        let records: Vec<DailyRecord> =
            (1..=8).map(|d| record(d, f64::from(d), 0.0, false)).collect();
        let rows = build_features(&records, 1).expect("builds");
        for pair in rows.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}
