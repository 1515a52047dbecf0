use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::score::RiskPolicy;
use crate::train::TrainingSpec;

/// Tuning knobs for one scoring run.
///
/// Every field has a working default; operators usually only touch
/// `exceedance_threshold`. The risk cut-points are configuration rather
/// than constants because the exact boundaries are still pending
/// confirmation from domain stakeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing window length in calendar days.
    pub lookback_window_days: u32,

    /// SGD step size. Too large diverges on fire-heavy windows.
    pub learning_rate: f64,

    /// Upper bound on training epochs.
    pub max_epochs: usize,

    /// Stop early once the relative loss improvement between consecutive
    /// epochs drops below this.
    pub convergence_tolerance: f64,

    /// Minimum supervised rows required before training is attempted.
    pub min_feature_rows: usize,

    /// WHO-aligned AQI limit the risk score is measured against.
    pub exceedance_threshold: f64,

    /// Margin cut-point below which risk is LOW.
    pub moderate_cutoff: f64,

    /// Margin cut-point above which risk is HIGH.
    pub high_cutoff: f64,

    /// Forecast horizon in days; 3 covers the 72-hour indicator.
    pub forecast_horizon_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_window_days: 90,
            learning_rate: 0.001,
            max_epochs: 1000,
            convergence_tolerance: 1e-6,
            min_feature_rows: 10,
            exceedance_threshold: 100.0,
            moderate_cutoff: 0.0,
            high_cutoff: 0.5,
            forecast_horizon_days: 3,
        }
    }
}

impl EngineConfig {
    pub fn training_spec(&self) -> TrainingSpec {
        TrainingSpec {
            learning_rate: self.learning_rate,
            max_epochs: self.max_epochs,
            convergence_tolerance: self.convergence_tolerance,
        }
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy {
            exceedance_threshold: self.exceedance_threshold,
            moderate_cutoff: self.moderate_cutoff,
            high_cutoff: self.high_cutoff,
            horizon_days: self.forecast_horizon_days,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Example TOML:
    /// [engine]
    /// exceedance_threshold = 100.0
    pub engine: EngineConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "aqrisk", "aqrisk-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
