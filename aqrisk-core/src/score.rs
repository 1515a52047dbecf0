use tracing::debug;

use crate::error::EngineError;
use crate::model::{DailyForecast, DailyRecord, ModelParameters, RiskCategory};

/// Mapping from predicted AQI to the operational risk signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    pub exceedance_threshold: f64,
    pub moderate_cutoff: f64,
    pub high_cutoff: f64,
    pub horizon_days: u32,
}

/// What one scoring pass produces before the engine wraps it up.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub predicted_next_day_aqi: f64,
    pub exceedance_risk_score: f64,
    pub risk_category: RiskCategory,
    pub forecast: Vec<DailyForecast>,
}

/// Apply a fitted model to the current day.
///
/// The next-day prediction is the linear formula clamped at zero. The risk
/// score is the margin over the exceedance threshold, `(pred − thr) / thr`,
/// clamped into [0, 1]; the category comes from the unclamped margin so
/// that LOW means "predicted below the threshold". The forecast trajectory
/// iterates the model over the horizon, feeding each prediction back as the
/// next day's AQI with fire intensity held at the current day's level.
///
/// A record without a real observation behind it (`is_imputed`) is refused
/// unless `allow_stale` is set: forecasting from stale data must be an
/// explicit choice.
pub fn score(
    params: &ModelParameters,
    current: &DailyRecord,
    policy: &RiskPolicy,
    allow_stale: bool,
) -> Result<Scored, EngineError> {
    if !policy.exceedance_threshold.is_finite() || policy.exceedance_threshold <= 0.0 {
        return Err(EngineError::Validation(format!(
            "exceedance threshold must be positive, got {}",
            policy.exceedance_threshold
        )));
    }
    if current.is_imputed && !allow_stale {
        return Err(EngineError::StaleObservation { date: current.date });
    }

    let steps = policy.horizon_days.max(1);
    let mut forecast = Vec::with_capacity(steps as usize);
    let mut aqi = current.aqi;
    let mut date = current.date;
    for _ in 0..steps {
        date = date
            .succ_opt()
            .ok_or_else(|| EngineError::Validation(format!("calendar overflow after {date}")))?;
        aqi = params.predict(aqi, current.fire_intensity).max(0.0);
        forecast.push(DailyForecast { date, predicted_aqi: aqi });
    }

    let predicted_next_day_aqi = forecast[0].predicted_aqi;
    let margin =
        (predicted_next_day_aqi - policy.exceedance_threshold) / policy.exceedance_threshold;
    let exceedance_risk_score = margin.clamp(0.0, 1.0);
    let risk_category = if margin < policy.moderate_cutoff {
        RiskCategory::Low
    } else if margin <= policy.high_cutoff {
        RiskCategory::Moderate
    } else {
        RiskCategory::High
    };

    debug!(
        predicted = predicted_next_day_aqi,
        score = exceedance_risk_score,
        category = %risk_category,
        "scored current day"
    );

    Ok(Scored { predicted_next_day_aqi, exceedance_risk_score, risk_category, forecast })
}
