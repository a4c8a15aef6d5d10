pub mod transcribe_batch_use_case;
