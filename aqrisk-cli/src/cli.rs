use std::path::{Path, PathBuf};

use anyhow::Context;
use aqrisk_core::source::snapshot::SnapshotSource;
use aqrisk_core::{Config, ObservationSource, RiskEngine, ScoringWindow};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aqrisk", version, about = "Air-quality exceedance risk CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the engine configuration.
    Configure,

    /// Score a pair of observation snapshots and print the indicator.
    Score {
        /// JSON file with air-quality readings.
        #[arg(long)]
        air_quality: PathBuf,

        /// JSON file with fire detections.
        #[arg(long)]
        fires: PathBuf,

        /// Day to score as of (YYYY-MM-DD); defaults to today, UTC.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Score even when the current day has no real observation.
        #[arg(long)]
        allow_stale: bool,

        /// Emit the indicator as JSON for the audit log instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Score { air_quality, fires, as_of, allow_stale, json } => {
                score(&air_quality, &fires, as_of, allow_stale, json)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.engine.exceedance_threshold =
        inquire::CustomType::<f64>::new("Exceedance threshold (WHO-aligned AQI limit):")
            .with_default(config.engine.exceedance_threshold)
            .prompt()?;
    config.engine.lookback_window_days =
        inquire::CustomType::<u32>::new("Lookback window (days):")
            .with_default(config.engine.lookback_window_days)
            .prompt()?;
    config.engine.learning_rate = inquire::CustomType::<f64>::new("Learning rate:")
        .with_default(config.engine.learning_rate)
        .prompt()?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

fn score(
    air_quality: &Path,
    fires: &Path,
    as_of: Option<NaiveDate>,
    allow_stale: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let engine = RiskEngine::new(config.engine);

    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let window = ScoringWindow::trailing(as_of, engine.config().lookback_window_days);

    let source = SnapshotSource::new(air_quality, fires);
    let observations = source.fetch(&window)?;

    let report = engine.run(&observations, as_of, allow_stale).with_context(|| {
        format!(
            "Scoring failed for {as_of}.\n\
             Hint: pass --as-of to match the snapshot period, or --allow-stale \
             to score a day without a real observation."
        )
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.indicator)?);
        return Ok(());
    }

    let indicator = &report.indicator;
    println!("Exceedance risk as of {}", indicator.as_of_date);
    println!("  Predicted next-day AQI : {:.1}", indicator.predicted_next_day_aqi);
    println!("  Exceedance threshold   : {:.1}", indicator.exceedance_threshold);
    println!("  Risk score             : {:.3}", indicator.exceedance_risk_score);
    println!("  Risk category          : {}", indicator.risk_category);
    println!("  72h forecast:");
    for step in &indicator.forecast_72h {
        println!("    {}  {:.1}", step.date, step.predicted_aqi);
    }

    let params = &indicator.model_parameters;
    println!(
        "  Model: w_aqi={:.4} w_fire={:.4} bias={:.4} ({} epochs)",
        params.weight_prev_aqi,
        params.weight_fire_intensity,
        params.bias,
        params.training_loss_history.len()
    );

    let coverage = &report.coverage;
    println!(
        "  Data: {} grid days ({} observed, {} imputed), {} feature rows",
        coverage.grid_days, coverage.observed_days, coverage.imputed_days, coverage.feature_rows
    );
    println!(
        "  Stages: align {:?}, features {:?}, train {:?}, score {:?}",
        report.timings.align, report.timings.features, report.timings.train, report.timings.score
    );

    Ok(())
}
