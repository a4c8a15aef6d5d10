use std::path::Path;

/// Domain interface for speech-to-text transcription.
///
/// The engine is a black box: an audio file path goes in, the raw
/// transcribed text comes out. Cleanup and scoring happen downstream.
pub trait SpeechRecognizer: Send {
    fn transcribe(&self, audio_path: &Path) -> Result<String, Box<dyn std::error::Error>>;
}
