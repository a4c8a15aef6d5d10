use std::path::Path;

use crate::dataset::domain::results_repository::{ResultsRepository, StoreError};
use crate::dataset::domain::trial::TrialRecord;

/// Results table stored as one CSV file per participant.
///
/// Every save rewrites the file in full; there is no append path and
/// no write coalescing.
#[derive(Debug, Default)]
pub struct CsvResultsRepository;

impl CsvResultsRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ResultsRepository for CsvResultsRepository {
    fn load(&self, path: &Path) -> Result<Vec<TrialRecord>, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Serde fills defaults for columns that are missing entirely,
        // but the original-transcription snapshot must only be taken
        // when the column has never been written. Check the header.
        let has_original = reader
            .headers()
            .map_err(|e| StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            })?
            .iter()
            .any(|h| h == "original_transcription");

        let mut records: Vec<TrialRecord> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;

        if !has_original {
            for record in &mut records {
                record.original_transcription = record.transcribed_text.clone();
            }
        }

        Ok(records)
    }

    fn save(&self, path: &Path, records: &[TrialRecord]) -> Result<(), StoreError> {
        let write_err = |e| StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        for record in records {
            writer.serialize(record).map_err(write_err)?;
        }
        writer
            .flush()
            .map_err(|e| StoreError::Write {
                path: path.to_path_buf(),
                source: csv::Error::from(e),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LEGACY_HEADER: &str =
        "block,trial,audio_filename,target_phrase,transcribed_text,similarity_score,error";

    fn repo() -> CsvResultsRepository {
        CsvResultsRepository::new()
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = repo().load(&tmp.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_load_legacy_file_defaults_reviewer_columns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");
        fs::write(
            &path,
            format!("{LEGACY_HEADER}\n1,1,a.wav,open the door,open a door,0.85,\n"),
        )
        .unwrap();

        let records = repo().load(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].manual_correct);
        assert!(!records[0].manual_reviewed);
        assert_eq!(records[0].original_transcription, "open a door");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");
        fs::write(
            &path,
            format!("{LEGACY_HEADER}\n1,1,a.wav,open the door,open a door,0.85,\n"),
        )
        .unwrap();

        let repo = repo();
        let mut records = repo.load(&path).unwrap();
        records[0].manual_correct = true;
        records[0].transcribed_text = "open the door".to_string();
        repo.save(&path, &records).unwrap();

        // Second load must not reset the flag or re-snapshot the
        // original transcription from the edited text.
        let reloaded = repo.load(&path).unwrap();
        assert!(reloaded[0].manual_correct);
        assert_eq!(reloaded[0].original_transcription, "open a door");
    }

    #[test]
    fn test_original_snapshot_survives_even_when_blank() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");
        // Migrated file where the snapshot column exists but is empty
        // (the batch transcription produced no text).
        fs::write(
            &path,
            format!(
                "{LEGACY_HEADER},manual_correct,manual_reviewed,original_transcription\n\
                 1,1,a.wav,open the door,fixed by hand,0.4,,False,False,\n"
            ),
        )
        .unwrap();

        let records = repo().load(&path).unwrap();
        assert_eq!(records[0].original_transcription, "");
        assert!(records[0].is_changed());
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");
        let repo = repo();

        let one = TrialRecord {
            block: "1".to_string(),
            trial: "1".to_string(),
            audio_filename: "a.wav".to_string(),
            target_phrase: "hello".to_string(),
            transcribed_text: "hello".to_string(),
            similarity_score: 1.0,
            error: None,
            manual_correct: false,
            manual_reviewed: false,
            original_transcription: "hello".to_string(),
        };
        let mut two = one.clone();
        two.trial = "2".to_string();

        repo.save(&path, &[one.clone(), two]).unwrap();
        repo.save(&path, &[one]).unwrap();

        assert_eq!(repo.load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_round_trip_preserves_reviewer_state() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.csv");
        let repo = repo();

        let record = TrialRecord {
            block: "2".to_string(),
            trial: "3".to_string(),
            audio_filename: "rec/b.wav".to_string(),
            target_phrase: "close the window".to_string(),
            transcribed_text: "close the window".to_string(),
            similarity_score: 0.92,
            error: Some("engine warning".to_string()),
            manual_correct: true,
            manual_reviewed: true,
            original_transcription: "close a window".to_string(),
        };
        repo.save(&path, std::slice::from_ref(&record)).unwrap();

        let loaded = repo.load(&path).unwrap();
        assert_eq!(loaded, vec![record]);
    }
}
