use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::model::{AirQualityReading, FireDetection, ObservationSet, ScoringWindow};

use super::ObservationSource;

/// Reads observation record sets from a pair of JSON files, one array per
/// stream, as exported by the staging jobs. Snapshots are already extracted
/// for the period of interest, so the window is left to the aligner.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    air_quality_path: PathBuf,
    fires_path: PathBuf,
}

impl SnapshotSource {
    pub fn new(air_quality_path: impl Into<PathBuf>, fires_path: impl Into<PathBuf>) -> Self {
        Self {
            air_quality_path: air_quality_path.into(),
            fires_path: fires_path.into(),
        }
    }
}

impl ObservationSource for SnapshotSource {
    fn fetch(&self, _window: &ScoringWindow) -> Result<ObservationSet> {
        let air_quality: Vec<AirQualityReading> =
            read_json(&self.air_quality_path, "air-quality readings")?;
        let fires: Vec<FireDetection> = read_json(&self.fires_path, "fire detections")?;

        Ok(ObservationSet { air_quality, fires })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {what} JSON: {}", path.display()))
}
