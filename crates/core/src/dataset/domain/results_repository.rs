use std::path::{Path, PathBuf};

use thiserror::Error;

use super::trial::TrialRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("results file not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Persistence seam for a participant's results table.
///
/// `load` applies the additive schema migration: reviewer columns
/// absent from older files come back with their defaults, and
/// `original_transcription` is snapshotted from `transcribed_text` on
/// first load. Loading an already-migrated file must change nothing.
///
/// `save` replaces the whole table in one pass; the file on disk is
/// the sole durable state.
pub trait ResultsRepository: Send {
    fn load(&self, path: &Path) -> Result<Vec<TrialRecord>, StoreError>;
    fn save(&self, path: &Path, records: &[TrialRecord]) -> Result<(), StoreError>;
}
