pub mod ffmpeg_decoder;
pub mod model_resolver;
pub mod whisper_recognizer;
