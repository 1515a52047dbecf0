use tracing::debug;

use crate::error::EngineError;
use crate::model::{FeatureRow, ModelParameters};

/// Hyper-parameters for one SGD run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSpec {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub convergence_tolerance: f64,
}

/// Fit `target ≈ w1·prev_aqi + w2·fire_intensity + b` by per-sample
/// gradient descent on the squared error.
///
/// Both feature columns and the target are scaled by the column means
/// (floored at 1.0) before optimization, so a raw fire-intensity magnitude
/// in the hundreds cannot blow up the gradient steps; the fitted weights
/// are folded back into original AQI units before they are returned.
///
/// Initialization is zero and iteration follows the input order with no
/// shuffling, so the result is a pure function of the inputs. Each epoch
/// appends its mean squared error (in normalized units) to the loss
/// history; training stops at `max_epochs`, on a perfect fit, or once the
/// relative improvement between consecutive epochs falls below
/// `convergence_tolerance`.
pub fn fit(rows: &[FeatureRow], spec: &TrainingSpec) -> Result<ModelParameters, EngineError> {
    if rows.is_empty() {
        return Err(EngineError::InsufficientData("no feature rows to train on".into()));
    }

    let n = rows.len() as f64;
    let aqi_scale = (rows.iter().map(|r| r.prev_aqi).sum::<f64>() / n).max(1.0);
    let fire_scale = (rows.iter().map(|r| r.fire_intensity).sum::<f64>() / n).max(1.0);

    let mut bias = 0.0_f64;
    let mut w_aqi = 0.0_f64;
    let mut w_fire = 0.0_f64;
    let mut history: Vec<f64> = Vec::new();

    for epoch in 0..spec.max_epochs {
        let mut squared_error = 0.0;
        for row in rows {
            let x_aqi = row.prev_aqi / aqi_scale;
            let x_fire = row.fire_intensity / fire_scale;
            let target = row.target_aqi / aqi_scale;

            let pred = bias + w_aqi * x_aqi + w_fire * x_fire;
            let err = pred - target;
            squared_error += err * err;

            bias -= spec.learning_rate * 2.0 * err;
            w_aqi -= spec.learning_rate * 2.0 * err * x_aqi;
            w_fire -= spec.learning_rate * 2.0 * err * x_fire;
        }

        let loss = squared_error / n;
        if !loss.is_finite() {
            return Err(EngineError::NumericalInstability { epoch });
        }

        let prev = history.last().copied();
        history.push(loss);

        if loss == 0.0 {
            break;
        }
        if let Some(prev) = prev {
            if prev > 0.0 && (prev - loss) / prev < spec.convergence_tolerance {
                break;
            }
        }
    }

    debug!(
        epochs = history.len(),
        final_loss = history.last().copied().unwrap_or(f64::NAN),
        "training finished"
    );

    // Undo the scaling: pred_scaled = b + w1·(aqi/s_a) + w2·(fire/s_f) and
    // target was divided by s_a, so in original units the bias picks up
    // s_a and the fire weight picks up s_a/s_f.
    Ok(ModelParameters {
        weight_prev_aqi: w_aqi,
        weight_fire_intensity: (aqi_scale / fire_scale) * w_fire,
        bias: aqi_scale * bias,
        training_loss_history: history,
    })
}
