use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::EngineError;
use crate::model::{DailyRecord, ObservationSet, ScoringWindow};

/// Resample both observation streams onto the window's daily grid.
///
/// Same-day air-quality readings collapse to their mean; same-day fire
/// detections sum, and a day without any detection counts as zero intensity
/// rather than missing. Days without an air-quality reading are
/// forward-filled from the most recent observed value and flagged imputed;
/// days before the first reading stay at 0.0 and are flagged the same way.
/// Observations outside the window are ignored.
///
/// The output holds exactly one record per calendar day of the window, in
/// chronological order.
pub fn align_daily(
    observations: &ObservationSet,
    window: &ScoringWindow,
) -> Result<Vec<DailyRecord>, EngineError> {
    if window.end < window.start {
        return Err(EngineError::Validation(format!(
            "window end {} precedes start {}",
            window.end, window.start
        )));
    }

    let mut aqi_days: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for reading in &observations.air_quality {
        let date = reading.timestamp.date_naive();
        if date < window.start || date > window.end {
            continue;
        }
        let bucket = aqi_days.entry(date).or_insert((0.0, 0));
        bucket.0 += reading.aqi;
        bucket.1 += 1;
    }

    let mut fire_days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for detection in &observations.fires {
        let date = detection.timestamp.date_naive();
        if date < window.start || date > window.end {
            continue;
        }
        *fire_days.entry(date).or_insert(0.0) += detection.intensity;
    }

    let mut records = Vec::with_capacity(window.num_days() as usize);
    let mut last_observed: Option<f64> = None;
    let mut date = window.start;
    loop {
        let fire_intensity = fire_days.get(&date).copied().unwrap_or(0.0);
        let record = match aqi_days.get(&date) {
            Some((sum, count)) => {
                let aqi = sum / f64::from(*count);
                last_observed = Some(aqi);
                DailyRecord { date, aqi, fire_intensity, is_imputed: false }
            }
            None => DailyRecord {
                date,
                aqi: last_observed.unwrap_or(0.0),
                fire_intensity,
                is_imputed: true,
            },
        };
        records.push(record);

        if date == window.end {
            break;
        }
        date = date
            .succ_opt()
            .ok_or_else(|| EngineError::Validation(format!("calendar overflow after {date}")))?;
    }

    let observed = records.iter().filter(|r| !r.is_imputed).count();
    if observed < 2 {
        return Err(EngineError::InsufficientData(format!(
            "{observed} observed air-quality day(s) between {} and {}; \
             at least 2 are required to train",
            window.start, window.end
        )));
    }

    debug!(days = records.len(), observed, "aligned observations onto daily grid");
    Ok(records)
}
