//! Core library for the `aqrisk` exceedance risk scoring engine.
//!
//! This crate defines:
//! - Configuration for the scoring pipeline
//! - Shared domain models (observations, daily grid, fitted model, indicator)
//! - The pipeline stages: alignment, feature building, training, scoring
//! - The [`RiskEngine`] composition root tying the stages together
//!
//! It is used by `aqrisk-cli`, but can also be embedded by other binaries or
//! serverless handlers: the engine performs no I/O of its own and runs the
//! whole pipeline synchronously on the calling thread.

pub mod align;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod score;
pub mod source;
pub mod train;

pub use config::{Config, EngineConfig};
pub use engine::RiskEngine;
pub use error::EngineError;
pub use model::{
    AirQualityReading, DailyRecord, FeatureRow, FireDetection, ModelParameters, ObservationSet,
    RiskCategory, RiskIndicator, ScoringReport, ScoringWindow,
};
pub use source::ObservationSource;
