use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dataset::domain::manifest::{read_manifest, ManifestRow};
use crate::dataset::domain::results_repository::{ResultsRepository, StoreError};
use crate::dataset::domain::trial::TrialRecord;
use crate::scoring::normalize::clean_transcript;
use crate::scoring::similarity::score_against_target;
use crate::shared::data_root;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;

/// Progress callback fed one human-readable line per event, matching
/// what the CLI prints while the batch runs.
pub type ProgressFn = Box<dyn Fn(&str) + Send>;

#[derive(Error, Debug)]
pub enum TranscribeJobError {
    #[error(
        "manifest not found at {0}. Expected <data-root>/<participant>/<participant>_data.csv"
    )]
    ManifestMissing(PathBuf),
    #[error("could not read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("manifest {0} contains no trials; nothing was written")]
    NoTrials(PathBuf),
    #[error("failed to write results: {0}")]
    WriteResults(#[source] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub failed: usize,
    pub results_path: PathBuf,
}

/// Transcribes every trial in a participant's manifest and writes the
/// scored results table in one pass.
///
/// Fatal preconditions (missing manifest, empty manifest) abort before
/// any output exists; per-trial failures are captured in the row's
/// `error` column and never stop the batch. Any previous results file
/// for the participant is fully replaced.
pub struct TranscribeBatchUseCase {
    recognizer: Box<dyn SpeechRecognizer>,
    repository: Box<dyn ResultsRepository>,
    progress: Option<ProgressFn>,
}

impl TranscribeBatchUseCase {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        repository: Box<dyn ResultsRepository>,
        progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            recognizer,
            repository,
            progress,
        }
    }

    pub fn run(
        &self,
        participant: &str,
        data_root: &Path,
    ) -> Result<BatchSummary, TranscribeJobError> {
        let manifest_path = data_root::manifest_path(data_root, participant);
        if !manifest_path.exists() {
            return Err(TranscribeJobError::ManifestMissing(manifest_path));
        }

        let rows = read_manifest(&manifest_path).map_err(|e| TranscribeJobError::ManifestRead {
            path: manifest_path.clone(),
            source: e,
        })?;
        if rows.is_empty() {
            return Err(TranscribeJobError::NoTrials(manifest_path));
        }

        self.report(&format!("Processing participant {participant}..."));
        self.report(&format!("Reading from: {}", manifest_path.display()));

        let total = rows.len();
        let mut records = Vec::with_capacity(total);
        for (index, row) in rows.iter().enumerate() {
            records.push(self.transcribe_row(row, index + 1, total));
        }
        let failed = records.iter().filter(|r| r.error.is_some()).count();

        let results_path = data_root::results_path(data_root, participant);
        self.repository
            .save(&results_path, &records)
            .map_err(TranscribeJobError::WriteResults)?;
        self.report(&format!(
            "Done! Results saved to: {}",
            results_path.display()
        ));

        Ok(BatchSummary {
            total,
            failed,
            results_path,
        })
    }

    fn transcribe_row(&self, row: &ManifestRow, index: usize, total: usize) -> TrialRecord {
        let audio_path = row.normalized_audio_path();
        self.report(&format!(
            "[{index}/{total}] Block {}, Trial {}: {audio_path}",
            row.block, row.trial
        ));

        let mut transcribed = String::new();
        let mut error = None;

        // Batch transcription trusts the manifest path as written;
        // the lenient playback-path cascade is a review-time concern.
        if !Path::new(&audio_path).exists() {
            error = Some("Audio file not found".to_string());
            self.report("    -> Error: Audio file not found");
        } else {
            match self.recognizer.transcribe(Path::new(&audio_path)) {
                Ok(raw) => {
                    transcribed = clean_transcript(&raw);
                    self.report(&format!("    -> Transcribed: '{transcribed}'"));
                }
                Err(e) => {
                    let message = format!("Error processing audio file: {e}");
                    self.report(&format!("    -> Error: {message}"));
                    error = Some(message);
                }
            }
        }

        let similarity_score = if !transcribed.is_empty() && !row.phrase.is_empty() {
            score_against_target(&transcribed, &row.phrase)
        } else {
            0.0
        };

        TrialRecord {
            block: row.block.clone(),
            trial: row.trial.clone(),
            audio_filename: audio_path,
            target_phrase: row.phrase.clone(),
            original_transcription: transcribed.clone(),
            transcribed_text: transcribed,
            similarity_score,
            error,
            manual_correct: false,
            manual_reviewed: false,
        }
    }

    fn report(&self, message: &str) {
        log::info!("{message}");
        if let Some(ref progress) = self.progress {
            progress(message);
        }
    }
}
