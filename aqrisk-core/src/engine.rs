use std::time::Instant;

use chrono::NaiveDate;
use tracing::info;

use crate::align;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::features;
use crate::model::{
    DataCoverage, ObservationSet, RiskIndicator, ScoringReport, ScoringWindow, StageTimings,
};
use crate::score;
use crate::train;

/// Composition root: runs align → features → train → score over one
/// observation set. The first stage failure aborts the pipeline and is
/// surfaced unchanged; no partial indicator is ever produced.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: EngineConfig,
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one observation set as of the given day.
    ///
    /// `allow_stale` forwards to the scorer and permits conditioning on an
    /// imputed current day. Identical inputs and configuration yield
    /// bit-identical output.
    pub fn run(
        &self,
        observations: &ObservationSet,
        as_of: NaiveDate,
        allow_stale: bool,
    ) -> Result<ScoringReport, EngineError> {
        let window = ScoringWindow::trailing(as_of, self.config.lookback_window_days);

        let stage = Instant::now();
        let records = align::align_daily(observations, &window)?;
        let align_elapsed = stage.elapsed();

        let stage = Instant::now();
        let rows = features::build_features(&records, self.config.min_feature_rows)?;
        let features_elapsed = stage.elapsed();

        let stage = Instant::now();
        let params = train::fit(&rows, &self.config.training_spec())?;
        let train_elapsed = stage.elapsed();

        let current = records
            .last()
            .ok_or_else(|| EngineError::Validation("daily grid is empty".into()))?;
        let stage = Instant::now();
        let scored = score::score(&params, current, &self.config.risk_policy(), allow_stale)?;
        let score_elapsed = stage.elapsed();

        let coverage = DataCoverage {
            raw_air_quality_readings: observations.air_quality.len(),
            raw_fire_detections: observations.fires.len(),
            grid_days: records.len(),
            observed_days: records.iter().filter(|r| !r.is_imputed).count(),
            imputed_days: records.iter().filter(|r| r.is_imputed).count(),
            feature_rows: rows.len(),
        };

        let indicator = RiskIndicator {
            as_of_date: as_of,
            predicted_next_day_aqi: scored.predicted_next_day_aqi,
            forecast_72h: scored.forecast,
            exceedance_threshold: self.config.exceedance_threshold,
            exceedance_risk_score: scored.exceedance_risk_score,
            risk_category: scored.risk_category,
            model_parameters: params,
        };

        info!(
            as_of = %as_of,
            predicted = indicator.predicted_next_day_aqi,
            score = indicator.exceedance_risk_score,
            category = %indicator.risk_category,
            epochs = indicator.model_parameters.training_loss_history.len(),
            feature_rows = coverage.feature_rows,
            "scoring run complete"
        );

        Ok(ScoringReport {
            indicator,
            coverage,
            timings: StageTimings {
                align: align_elapsed,
                features: features_elapsed,
                train: train_elapsed,
                score: score_elapsed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirQualityReading, FireDetection, RiskCategory};
    use chrono::{TimeZone, Utc};

    fn config() -> EngineConfig {
        EngineConfig {
            lookback_window_days: 10,
            learning_rate: 0.01,
            max_epochs: 500,
            convergence_tolerance: 0.0,
            min_feature_rows: 5,
            exceedance_threshold: 100.0,
            ..EngineConfig::default()
        }
    }

    /// Ten days following aqi_{t+1} = aqi_t + 0.5·fire_t, zero noise.
    fn synthetic_observations() -> (ObservationSet, NaiveDate, f64) {
        let fires = [0.0, 20.0, 10.0, 30.0, 5.0, 25.0, 15.0, 35.0, 0.0, 20.0];
        let mut air_quality = Vec::new();
        let mut fire_detections = Vec::new();
        let mut aqi = 50.0;
        for (i, fire) in fires.iter().enumerate() {
            let day = i as u32 + 1;
            let ts = Utc
                .with_ymd_and_hms(2025, 11, day, 12, 0, 0)
                .single()
                .expect("valid timestamp");
            air_quality.push(AirQualityReading { timestamp: ts, aqi });
            if *fire > 0.0 {
                fire_detections.push(FireDetection { timestamp: ts, intensity: *fire });
            }
            aqi += 0.5 * fire;
        }
        let as_of = NaiveDate::from_ymd_opt(2025, 11, 10).expect("valid date");
        // Day 11 truth continues the same recurrence.
        (ObservationSet { air_quality, fires: fire_detections }, as_of, aqi)
    }

    #[test]
    fn end_to_end_recovers_the_generating_process() {
        let (observations, as_of, day11_truth) = synthetic_observations();
        let report = RiskEngine::new(config())
            .run(&observations, as_of, false)
            .expect("pipeline runs");

        let params = &report.indicator.model_parameters;
        assert!((params.weight_prev_aqi - 1.0).abs() < 0.05, "w_aqi = {}", params.weight_prev_aqi);
        assert!(
            (params.weight_fire_intensity - 0.5).abs() < 0.025,
            "w_fire = {}",
            params.weight_fire_intensity
        );

        let predicted = report.indicator.predicted_next_day_aqi;
        assert!(
            (predicted - day11_truth).abs() / day11_truth < 0.05,
            "predicted {predicted}, expected ~{day11_truth}"
        );
    }

    #[test]
    fn rerunning_identical_inputs_is_bit_identical() {
        let (observations, as_of, _) = synthetic_observations();
        let engine = RiskEngine::new(config());

        let first = engine.run(&observations, as_of, false).expect("runs");
        let second = engine.run(&observations, as_of, false).expect("runs");

        assert_eq!(first.indicator, second.indicator);
        assert_eq!(first.coverage, second.coverage);
    }

    #[test]
    fn coverage_counts_the_grid() {
        let (observations, as_of, _) = synthetic_observations();
        let report = RiskEngine::new(config())
            .run(&observations, as_of, false)
            .expect("runs");

        assert_eq!(report.coverage.grid_days, 10);
        assert_eq!(report.coverage.observed_days, 10);
        assert_eq!(report.coverage.imputed_days, 0);
        assert_eq!(report.coverage.feature_rows, 9);
        assert_eq!(report.coverage.raw_air_quality_readings, 10);
        assert_eq!(report.indicator.forecast_72h.len(), 3);
    }

    #[test]
    fn empty_observations_abort_at_alignment() {
        let as_of = NaiveDate::from_ymd_opt(2025, 11, 10).expect("valid date");
        let err = RiskEngine::new(config())
            .run(&ObservationSet::default(), as_of, false)
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData(_)));
    }

    #[test]
    fn stale_current_day_is_refused_then_overridable() {
        let (observations, _, _) = synthetic_observations();
        // Score two days past the last observation: the current day is
        // forward-filled, so the staleness guard must fire.
        let as_of = NaiveDate::from_ymd_opt(2025, 11, 12).expect("valid date");
        let engine = RiskEngine::new(EngineConfig {
            lookback_window_days: 12,
            ..config()
        });

        let err = engine.run(&observations, as_of, false).unwrap_err();
        assert!(matches!(err, EngineError::StaleObservation { .. }));

        let report = engine.run(&observations, as_of, true).expect("stale override runs");
        assert_eq!(report.coverage.imputed_days, 2);
    }

    #[test]
    fn indicator_carries_threshold_and_category() {
        let (observations, as_of, _) = synthetic_observations();
        let report = RiskEngine::new(config())
            .run(&observations, as_of, false)
            .expect("runs");

        assert_eq!(report.indicator.exceedance_threshold, 100.0);
        assert_eq!(report.indicator.as_of_date, as_of);
        // Day 11 sits around 130 against a threshold of 100.
        assert_eq!(report.indicator.risk_category, RiskCategory::Moderate);
        assert!(report.indicator.exceedance_risk_score > 0.0);
        assert!(report.indicator.exceedance_risk_score < 1.0);
    }
}
