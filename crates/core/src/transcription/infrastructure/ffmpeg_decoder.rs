use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FfmpegError {
    #[error("ffmpeg is not installed or not on PATH. {install_hint}")]
    NotFound { install_hint: &'static str },
    #[error("failed to run ffmpeg on {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ffmpeg could not decode {path}: {detail}")]
    Decode { path: PathBuf, detail: String },
}

/// Per-OS install instructions, shown when the binary is missing.
fn install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install it with `brew install ffmpeg`"
    } else if cfg!(target_os = "windows") {
        "Install it from PowerShell with `winget install ffmpeg`"
    } else {
        "Install it from https://ffmpeg.org/download.html or your package manager"
    }
}

/// Search PATH for the ffmpeg binary.
pub fn locate_ffmpeg() -> Option<PathBuf> {
    let binary = if cfg!(target_os = "windows") {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    };
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(binary))
            .find(|candidate| candidate.is_file())
    })
}

/// Fatal-precondition check: audio decoding needs ffmpeg, so refuse to
/// start a batch without it.
pub fn ensure_available() -> Result<PathBuf, FfmpegError> {
    locate_ffmpeg().ok_or(FfmpegError::NotFound {
        install_hint: install_hint(),
    })
}

/// Decode an audio file to raw mono f32 samples at `sample_rate`.
///
/// Runs `ffmpeg -i <path> -f f32le -acodec pcm_f32le -ar <rate> -ac 1 -`
/// and reads the PCM stream from stdout. Any decode failure surfaces
/// ffmpeg's stderr tail as the error detail.
pub fn decode_to_f32_mono(
    ffmpeg: &Path,
    audio_path: &Path,
    sample_rate: u32,
) -> Result<Vec<f32>, FfmpegError> {
    let output = Command::new(ffmpeg)
        .arg("-i")
        .arg(audio_path)
        .arg("-f")
        .arg("f32le")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-ar")
        .arg(sample_rate.to_string())
        .arg("-ac")
        .arg("1")
        .arg("-")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| FfmpegError::Spawn {
            path: audio_path.to_path_buf(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(FfmpegError::Decode {
            path: audio_path.to_path_buf(),
            detail: stderr_tail(&output.stderr),
        });
    }

    let samples = output
        .stdout
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect();
    Ok(samples)
}

/// Last few stderr lines; ffmpeg prints its banner first and the
/// actual failure reason last.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(3);
    lines[start..].join("; ")
}
