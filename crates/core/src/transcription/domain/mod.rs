pub mod speech_recognizer;
