use chrono::NaiveDate;
use thiserror::Error;

/// Failures the scoring pipeline can surface.
///
/// Every variant is terminal for the current invocation: the engine never
/// retries internally and never returns a partial indicator. The caller
/// decides whether to retry with relaxed parameters, skip the day, or alert.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested window is malformed.
    #[error("invalid scoring window: {0}")]
    Validation(String),

    /// Not enough clean observations to train a meaningful model.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Training loss left the finite range. The learning rate is too large
    /// for this data; retry with a smaller one.
    #[error("training diverged at epoch {epoch}: loss is no longer finite")]
    NumericalInstability { epoch: usize },

    /// The day being scored has no real observation behind it.
    #[error(
        "no real air-quality observation for {date}; \
         scoring from imputed data requires an explicit stale override"
    )]
    StaleObservation { date: NaiveDate },
}
