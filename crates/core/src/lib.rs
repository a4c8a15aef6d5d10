pub mod dataset;
pub mod pipeline;
pub mod review;
pub mod scoring;
pub mod shared;
pub mod transcription;
