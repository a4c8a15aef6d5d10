use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use audiocheck_core::dataset::domain::trial::{TrialRecord, TrialStatus};
use audiocheck_core::dataset::infrastructure::csv_repository::CsvResultsRepository;
use audiocheck_core::pipeline::transcribe_batch_use_case::{ProgressFn, TranscribeBatchUseCase};
use audiocheck_core::review::domain::session::{ReviewSession, SessionError};
use audiocheck_core::review::domain::sort::SortMode;
use audiocheck_core::shared::audio_path;
use audiocheck_core::shared::constants::{
    DEFAULT_SCORE_THRESHOLD, WHISPER_MODEL_NAME, WHISPER_MODEL_URL,
};
use audiocheck_core::shared::data_root;
use audiocheck_core::shared::idle_watchdog::IdleWatchdog;
use audiocheck_core::transcription::infrastructure::ffmpeg_decoder;
use audiocheck_core::transcription::infrastructure::model_resolver;
use audiocheck_core::transcription::infrastructure::whisper_recognizer::WhisperRecognizer;

/// Transcription checking and review for participant audio recordings.
#[derive(Parser)]
#[command(name = "audiocheck")]
struct Cli {
    /// Directory to search for the data root (defaults to the working
    /// directory; `data` and `../data` are probed beneath it).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a participant's recordings and score them against
    /// their target phrases.
    Transcribe {
        /// Participant ID (folder name under the data root).
        participant: String,

        /// Local Whisper model file to use instead of the cached /
        /// downloaded one.
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Review transcription results interactively, correcting text and
    /// marking trials as verified.
    Review {
        /// Participant ID (folder name under the data root).
        participant: String,

        /// Close the session after this many seconds without input.
        #[arg(long)]
        idle_timeout: Option<u64>,
    },
    /// List participant folders found under the data root.
    Participants,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    let data_root = data_root::discover(&base_dir)?;
    log::info!("Using data root: {}", data_root.display());

    match cli.command {
        Command::Transcribe { participant, model } => {
            run_transcribe(&data_root, &participant, model.as_deref())
        }
        Command::Review {
            participant,
            idle_timeout,
        } => run_review(&data_root, &participant, idle_timeout),
        Command::Participants => run_participants(&data_root),
    }
}

fn run_participants(data_root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let participants = data_root::list_participants(data_root)?;
    if participants.is_empty() {
        println!("No participant folders found in {}", data_root.display());
        return Ok(());
    }
    for participant in participants {
        let has_results = data_root::results_path(data_root, &participant).exists();
        let marker = if has_results { "transcribed" } else { "pending" };
        println!("{participant}  [{marker}]");
    }
    Ok(())
}

fn run_transcribe(
    data_root: &Path,
    participant: &str,
    model_override: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Preconditions in the order the operator can fix them: manifest,
    // ffmpeg, engine. All fatal before anything is written.
    let manifest = data_root::manifest_path(data_root, participant);
    if !manifest.exists() {
        return Err(format!(
            "manifest not found at {}. Expected <data-root>/<participant>/<participant>_data.csv",
            manifest.display()
        )
        .into());
    }

    let ffmpeg = ffmpeg_decoder::ensure_available()?;
    log::info!("Found ffmpeg at {}", ffmpeg.display());

    eprintln!("Loading Whisper model... this may take a moment on first run.");
    let model_path = model_resolver::resolve(
        WHISPER_MODEL_NAME,
        WHISPER_MODEL_URL,
        model_override,
        Some(Box::new(download_progress)),
    )?;
    let recognizer = WhisperRecognizer::new(&model_path, ffmpeg)?;

    let progress: ProgressFn = Box::new(|line| println!("{line}"));
    let use_case = TranscribeBatchUseCase::new(
        Box::new(recognizer),
        Box::new(CsvResultsRepository::new()),
        Some(progress),
    );
    let summary = use_case.run(participant, data_root)?;

    if summary.failed > 0 {
        eprintln!(
            "{} of {} trials recorded an error; see the error column in {}",
            summary.failed,
            summary.total,
            summary.results_path.display()
        );
    }
    Ok(())
}

fn run_review(
    data_root: &Path,
    participant: &str,
    idle_timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = data_root::results_path(data_root, participant);
    if !results.exists() {
        return Err(format!(
            "no transcription results for participant {participant}; run \
             `audiocheck transcribe {participant}` first"
        )
        .into());
    }

    let mut session = ReviewSession::open(Box::new(CsvResultsRepository::new()), results)?;
    let watchdog = idle_timeout.map(|secs| IdleWatchdog::start(Duration::from_secs(secs)));

    let (visible, total) = session.counts();
    println!(
        "Reviewing {} ({visible} of {total} trials shown). Type `help` for commands.",
        session.path().display()
    );
    show_selected(&session);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        if let Some(ref watchdog) = watchdog {
            // Expiry fires while blocked in read_line; a command typed
            // after the deadline is dropped, not executed.
            if watchdog.has_expired() {
                println!("Idle timeout reached; closing session.");
                break;
            }
            watchdog.heartbeat();
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }
        dispatch(&mut session, data_root, participant, input);
    }
    Ok(())
}

/// One reviewer command. Persistence failures are warnings: the edit
/// is applied in memory and the reviewer may retry or keep going.
fn dispatch(session: &mut ReviewSession, data_root: &Path, participant: &str, input: &str) {
    let (command, rest) = match input.split_once(' ') {
        Some((head, tail)) => (head, tail.trim()),
        None => (input, ""),
    };

    let outcome = match command {
        "help" | "h" => {
            print_help();
            Ok(())
        }
        "next" | "n" => {
            if !session.next() {
                println!("Already at the last visible trial.");
            }
            show_selected(session);
            Ok(())
        }
        "prev" | "p" => {
            if !session.prev() {
                println!("Already at the first visible trial.");
            }
            show_selected(session);
            Ok(())
        }
        "goto" | "g" => match rest.parse::<usize>() {
            Ok(position) if position > 0 => {
                let result = session.select(position - 1);
                if result.is_ok() {
                    show_selected(session);
                }
                result
            }
            _ => {
                println!("Usage: goto <position> (1-based, from `list`)");
                Ok(())
            }
        },
        "list" | "l" => {
            show_list(session);
            Ok(())
        }
        "show" | "s" => {
            show_selected(session);
            Ok(())
        }
        "edit" | "e" => {
            let result = session.edit_transcription(rest);
            if result.is_ok() {
                show_selected(session);
            }
            result
        }
        "correct" | "c" => match parse_toggle(rest) {
            Some(value) => {
                let result = session.set_correct(value);
                if result.is_ok() {
                    show_selected(session);
                }
                result
            }
            None => {
                println!("Usage: correct on|off");
                Ok(())
            }
        },
        "reviewed" | "r" => match parse_toggle(rest) {
            Some(value) => {
                let result = session.set_reviewed(value);
                if result.is_ok() {
                    show_selected(session);
                }
                result
            }
            None => {
                println!("Usage: reviewed on|off");
                Ok(())
            }
        },
        "filter" => {
            apply_filter_command(session, rest);
            Ok(())
        }
        "sort" => {
            match rest {
                "natural" => session.set_sort(SortMode::Natural),
                "priority" => session.set_sort(SortMode::UnreviewedFirst),
                _ => {
                    println!("Usage: sort natural|priority");
                    return;
                }
            }
            show_list(session);
            Ok(())
        }
        "audio" | "a" => {
            show_audio_path(session, data_root, participant);
            Ok(())
        }
        _ => {
            println!("Unknown command `{command}`; type `help` for the list.");
            Ok(())
        }
    };

    match outcome {
        Ok(()) => {}
        Err(e @ SessionError::Persist(_)) => eprintln!("Warning: {e}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn apply_filter_command(session: &mut ReviewSession, rest: &str) {
    let mut filter = session.filter();
    match rest.split_once(' ') {
        Some(("threshold", value)) => {
            if value == "off" {
                filter.score_threshold = None;
            } else {
                match value.parse::<f64>() {
                    Ok(t) if (0.0..=1.0).contains(&t) => filter.score_threshold = Some(t),
                    _ => {
                        println!("Threshold must be between 0.0 and 1.0, or `off`.");
                        return;
                    }
                }
            }
        }
        Some(("reviewed", value)) => match parse_toggle(value) {
            // `filter reviewed off` hides already-reviewed trials
            Some(show) => filter.hide_reviewed = !show,
            None => {
                println!("Usage: filter reviewed on|off");
                return;
            }
        },
        _ => {
            println!(
                "Usage: filter threshold <0.0-1.0>|off  (default {DEFAULT_SCORE_THRESHOLD})\n\
                 \u{20}      filter reviewed on|off"
            );
            return;
        }
    }
    session.set_filter(filter);
    show_list(session);
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn status_marker(record: &TrialRecord, threshold: f64) -> &'static str {
    match record.status(threshold) {
        TrialStatus::Confirmed => "ok*",
        TrialStatus::LowScore => "low",
        TrialStatus::Acceptable => "ok",
    }
}

fn show_list(session: &ReviewSession) {
    let (visible, total) = session.counts();
    println!("Showing {visible} / {total} trials");

    let threshold = session
        .filter()
        .score_threshold
        .unwrap_or(DEFAULT_SCORE_THRESHOLD);
    let selected_position = session.selected_position();
    for (position, record) in session.visible_records().iter().enumerate() {
        let cursor = if Some(position) == selected_position {
            ">"
        } else {
            " "
        };
        let reviewed = if record.manual_reviewed { "R" } else { " " };
        println!(
            "{cursor} {:>3}. [{:>3}|{reviewed}] Block {}, Trial {} ({:.2})",
            position + 1,
            status_marker(record, threshold),
            record.block,
            record.trial,
            record.similarity_score
        );
    }
}

fn show_selected(session: &ReviewSession) {
    let Some(record) = session.selected() else {
        println!("No trials match the current filters.");
        return;
    };

    println!("Block {}, Trial {}", record.block, record.trial);
    println!("  Target:      {}", record.target_phrase);
    println!("  Transcribed: {}", record.transcribed_text);
    if record.is_changed() {
        println!("  Original:    {}", record.original_transcription);
    }
    println!(
        "  Similarity {:.2} | correct: {} | reviewed: {}",
        record.similarity_score, record.manual_correct, record.manual_reviewed
    );
    if let Some(ref error) = record.error {
        println!("  Error: {error}");
    }
}

fn show_audio_path(session: &ReviewSession, data_root: &Path, participant: &str) {
    let Some(record) = session.selected() else {
        println!("No trials match the current filters.");
        return;
    };
    match audio_path::resolve(&record.audio_filename, data_root, participant) {
        Ok(path) => println!("Audio file: {}", path.display()),
        Err(e) => println!("{e}"),
    }
}

fn print_help() {
    println!(
        "Commands:\n\
         \u{20} next | prev | goto <n>      move through the visible trials\n\
         \u{20} list                        show the visible trials\n\
         \u{20} show                        show the selected trial\n\
         \u{20} edit <text>                 replace the transcription (rescores)\n\
         \u{20} correct on|off              override: transcription is acceptable\n\
         \u{20} reviewed on|off             mark verified (advances to next unreviewed)\n\
         \u{20} filter threshold <x>|off    show trials scoring below x\n\
         \u{20} filter reviewed on|off      show or hide reviewed trials\n\
         \u{20} sort natural|priority       trial order / unreviewed first\n\
         \u{20} audio                       locate the audio file for playback\n\
         \u{20} quit"
    );
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading Whisper model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading Whisper model... {downloaded} bytes");
    }
}
