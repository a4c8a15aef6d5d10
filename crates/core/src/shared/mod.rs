pub mod audio_path;
pub mod constants;
pub mod data_root;
pub mod idle_watchdog;
