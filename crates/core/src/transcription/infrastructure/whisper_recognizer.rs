use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;

use super::ffmpeg_decoder;

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once at construction, so a missing or corrupt
/// model file fails the batch up front rather than per trial. Audio is
/// decoded to 16 kHz mono through the ffmpeg binary.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    ffmpeg: PathBuf,
}

impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("ffmpeg", &self.ffmpeg)
            .finish_non_exhaustive()
    }
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path, ffmpeg: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        Ok(Self { ctx, ffmpeg })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, audio_path: &Path) -> Result<String, Box<dyn std::error::Error>> {
        let samples =
            ffmpeg_decoder::decode_to_f32_mono(&self.ffmpeg, audio_path, WHISPER_SAMPLE_RATE)?;

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(Some("en"));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        state
            .full(params, &samples)
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut text = String::new();
        let num_segments = state.full_n_segments();
        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let n_tokens = segment.n_tokens();
            for tok_idx in 0..n_tokens {
                let token = match segment.get_token(tok_idx) {
                    Some(t) => t,
                    None => continue,
                };

                let token_text = match token.to_str() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                // Skip special tokens ([_BEG_], <|endoftext|>, ...)
                let trimmed = token_text.trim();
                if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }

                // Whisper tokens carry their own leading spaces.
                text.push_str(token_text);
            }
        }

        Ok(text)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nonexistent_model_returns_error() {
        let result =
            WhisperRecognizer::new(Path::new("/nonexistent/model.bin"), PathBuf::from("ffmpeg"));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_nonexistent_model_error_message() {
        let result =
            WhisperRecognizer::new(Path::new("/nonexistent/model.bin"), PathBuf::from("ffmpeg"));
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }
}
