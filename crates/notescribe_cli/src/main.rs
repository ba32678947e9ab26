//! Command-line entry point.
//!
//! # Responsibility
//! - Parse `<input> [<output-midi>]`, load configuration, start logging.
//! - Run the core pipeline and map failures to a one-line diagnostic.
//!
//! # Invariants
//! - Exit code is 0 on success, 1 on any pipeline failure, 2 on bad usage.
//! - Nothing is written to stdout when the run fails.

use log::info;
use notescribe_core::config::ENV_CONFIG_PATH;
use notescribe_core::{
    init_logging, AudioSource, MidiArtifactTranscriber, NotescribeConfig, Pipeline, SourceKind,
    Transcriber,
};
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage: notescribe <input-audio | events.json | input.mid> [<output-midi-path>]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let explicit_output = args.get(1).map(PathBuf::from);

    match run(Path::new(input), explicit_output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, explicit_output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    if !input.exists() {
        return Err(format!("input not found: {}", input.display()).into());
    }

    let output = artifact_path(input, explicit_output);
    let base = config.transcriber();
    let transcriber: Box<dyn Transcriber> = match &output {
        Some(path) => Box::new(MidiArtifactTranscriber::new(base, path.clone())),
        None => Box::new(base),
    };
    let pipeline = Pipeline::new(transcriber).with_piano_roll(config.piano_roll_options());

    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    eprintln!("Transcribing '{file_name}' ...");

    let notes = pipeline.extract_only(&AudioSource::path(input))?;
    if let Some(path) = &output {
        eprintln!("MIDI saved to '{}'", path.display());
    }

    let stdout = io::stdout();
    pipeline.render(&notes, &mut stdout.lock())?;
    info!(
        "event=cli_done module=cli status=ok input={} notes={}",
        input.display(),
        notes.len()
    );
    Ok(())
}

fn load_config() -> Result<NotescribeConfig, Box<dyn Error>> {
    let config = match std::env::var_os(ENV_CONFIG_PATH) {
        Some(path) if !path.is_empty() => NotescribeConfig::load(Path::new(&path))?,
        _ => NotescribeConfig::default(),
    };
    let config = config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// MIDI artifact destination.
///
/// An explicit path always wins. Otherwise the input path with a `.mid`
/// extension is used, except for MIDI inputs, which would be overwritten with
/// their own content.
fn artifact_path(input: &Path, explicit_output: Option<PathBuf>) -> Option<PathBuf> {
    match explicit_output {
        Some(path) => Some(path),
        None if SourceKind::of_path(input) == SourceKind::Midi => None,
        None => Some(input.with_extension("mid")),
    }
}
