use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::DATA_ROOT_CANDIDATES;

#[derive(Error, Debug)]
pub enum DataRootError {
    #[error(
        "data folder not found (tried: {tried}). Create a folder named `data` \
         next to the tool and place participant folders (e.g. `101`, `102`) inside it"
    )]
    NotFound { tried: String },
    #[error("failed to list participants in {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Probe the fixed candidate directories under `base` and adopt the
/// first one that exists and is a directory.
pub fn discover(base: &Path) -> Result<PathBuf, DataRootError> {
    for candidate in DATA_ROOT_CANDIDATES {
        let path = base.join(candidate);
        if path.is_dir() {
            return Ok(path);
        }
    }
    Err(DataRootError::NotFound {
        tried: DATA_ROOT_CANDIDATES.join(", "),
    })
}

/// Participant folders are subdirectories of the data root whose names
/// are all digits, returned sorted.
pub fn list_participants(data_root: &Path) -> Result<Vec<String>, DataRootError> {
    let entries = fs::read_dir(data_root).map_err(|e| DataRootError::List {
        path: data_root.to_path_buf(),
        source: e,
    })?;

    let mut participants: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()))
        .collect();
    participants.sort();
    Ok(participants)
}

pub fn participant_dir(data_root: &Path, participant: &str) -> PathBuf {
    data_root.join(participant)
}

/// `<data_root>/<participant>/<participant>_data.csv`
pub fn manifest_path(data_root: &Path, participant: &str) -> PathBuf {
    participant_dir(data_root, participant).join(format!("{participant}_data.csv"))
}

/// `<data_root>/<participant>/<participant>_transcription_results.csv`
pub fn results_path(data_root: &Path, participant: &str) -> PathBuf {
    participant_dir(data_root, participant)
        .join(format!("{participant}_transcription_results.csv"))
}
