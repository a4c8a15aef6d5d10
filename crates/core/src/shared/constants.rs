pub const WHISPER_MODEL_NAME: &str = "ggml-base.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin";

/// Sample rate Whisper expects; ffmpeg resamples everything to this.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Data root candidates probed in order, relative to the working
/// directory.
pub const DATA_ROOT_CANDIDATES: &[&str] = &["data", "../data"];

/// Default similarity threshold below which a trial needs review.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.8;
