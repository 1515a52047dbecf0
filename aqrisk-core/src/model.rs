use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One air-quality measurement, as delivered by the staging layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub timestamp: DateTime<Utc>,
    pub aqi: f64,
}

/// One fire detection with a brightness-derived intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireDetection {
    pub timestamp: DateTime<Utc>,
    pub intensity: f64,
}

/// The two raw record sets backing one scoring request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    pub air_quality: Vec<AirQualityReading>,
    pub fires: Vec<FireDetection>,
}

/// Inclusive daily window the engine aligns and trains over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScoringWindow {
    /// Trailing window of `lookback_days` calendar days ending at `as_of`.
    pub fn trailing(as_of: NaiveDate, lookback_days: u32) -> Self {
        let span = i64::from(lookback_days.saturating_sub(1));
        Self {
            start: as_of - chrono::Duration::days(span),
            end: as_of,
        }
    }

    /// Calendar days covered, start and end included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// One day of the aligned grid. `is_imputed` marks days whose AQI was
/// forward-filled (or zeroed, when no prior observation exists); such days
/// never enter feature construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub aqi: f64,
    pub fire_intensity: f64,
    pub is_imputed: bool,
}

/// One supervised sample: day t's AQI and fire intensity predicting day
/// t+1's AQI. `date` is the predicted day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub prev_aqi: f64,
    pub fire_intensity: f64,
    pub target_aqi: f64,
}

/// Fitted coefficients of the next-day AQI predictor, in original (AQI)
/// units, together with the per-epoch loss curve in normalized units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub weight_prev_aqi: f64,
    pub weight_fire_intensity: f64,
    pub bias: f64,
    pub training_loss_history: Vec<f64>,
}

impl ModelParameters {
    /// Closed-form model output for one day's AQI and fire intensity.
    pub fn predict(&self, prev_aqi: f64, fire_intensity: f64) -> f64 {
        self.bias + self.weight_prev_aqi * prev_aqi + self.weight_fire_intensity * fire_intensity
    }
}

/// Human-readable risk bucket derived from the continuous score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Moderate => "MODERATE",
            RiskCategory::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the 72-hour forecast trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub predicted_aqi: f64,
}

/// The indicator returned to the caller and persisted into the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicator {
    pub as_of_date: NaiveDate,
    pub predicted_next_day_aqi: f64,
    pub forecast_72h: Vec<DailyForecast>,
    pub exceedance_threshold: f64,
    pub exceedance_risk_score: f64,
    pub risk_category: RiskCategory,
    pub model_parameters: ModelParameters,
}

/// Row counts observed while the pipeline ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCoverage {
    pub raw_air_quality_readings: usize,
    pub raw_fire_detections: usize,
    pub grid_days: usize,
    pub observed_days: usize,
    pub imputed_days: usize,
    pub feature_rows: usize,
}

/// Elapsed wall time per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimings {
    pub align: Duration,
    pub features: Duration,
    pub train: Duration,
    pub score: Duration,
}

/// Everything one engine run produces: the indicator plus run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    pub indicator: RiskIndicator,
    pub coverage: DataCoverage,
    pub timings: StageTimings,
}
