use std::path::{Path, PathBuf};

use thiserror::Error;

/// Raised when no candidate location for a stored audio filename
/// exists. Carries every path tried so the operator can diagnose a
/// misplaced recording.
#[derive(Error, Debug)]
#[error("audio file not found: {filename} (tried: {})", candidate_list(.candidates))]
pub struct AudioResolveError {
    pub filename: String,
    pub candidates: Vec<PathBuf>,
}

fn candidate_list(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate the playable audio file for a stored filename.
///
/// Result files written on other machines store paths relative to
/// wherever the recorder ran, so several layouts must be tolerated.
/// Candidates, in order:
/// 1. the stored path as-is (separators normalized);
/// 2. relative to the participant's folder under the data root;
/// 3. the stored path with a leading `<root-name>/<participant>/`
///    prefix stripped, under the participant folder;
/// 4. if the stored path starts with `data/` and the configured root
///    is itself named `data`, relative to the root's parent.
///
/// First existing candidate wins.
pub fn resolve(
    filename: &str,
    data_root: &Path,
    participant: &str,
) -> Result<PathBuf, AudioResolveError> {
    let normalized = filename.replace('\\', "/");
    let root_name = data_root.file_name().and_then(|n| n.to_str());

    let mut candidates = vec![
        PathBuf::from(&normalized),
        data_root.join(participant).join(&normalized),
    ];

    if let Some(root_name) = root_name {
        let prefix = format!("{root_name}/{participant}/");
        if let Some(rest) = normalized.strip_prefix(&prefix) {
            candidates.push(data_root.join(participant).join(rest));
        }
    }

    if normalized.starts_with("data/") && root_name == Some("data") {
        if let Some(parent) = data_root.parent() {
            candidates.push(parent.join(&normalized));
        }
    }

    candidates
        .iter()
        .find(|c| c.exists())
        .cloned()
        .ok_or(AudioResolveError {
            filename: filename.to_string(),
            candidates,
        })
}
