use std::fmt::Debug;

use crate::model::{ObservationSet, ScoringWindow};

pub mod snapshot;

/// Supplies the raw record sets for one scoring request.
///
/// The surrounding handler owns fetching (staging database, snapshot
/// files, fixtures) and hands the engine plain collections. Implementations
/// may use the window to push filtering down to their backend; the aligner
/// re-applies it regardless, so returning extra records is harmless.
pub trait ObservationSource: Send + Sync + Debug {
    fn fetch(&self, window: &ScoringWindow) -> anyhow::Result<ObservationSet>;
}
