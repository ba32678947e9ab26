//! External transcription program adapter.
//!
//! Runs a transcription CLI that writes a MIDI file into an output directory,
//! e.g. `basic-pitch <output-dir> <audio-path>`, then decodes that MIDI file.
//!
//! # Invariants
//! - The program runs inside a fresh temporary directory removed afterwards.
//! - The program is invoked exactly once per `transcribe` call.

use crate::extract::raw_event::RawEvent;
use crate::transcribe::midi_file::MidiFileTranscriber;
use crate::transcribe::{AudioSource, Transcriber, TranscriptionError, TranscriptionResult};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Program used when no transcriber command is configured explicitly.
pub const DEFAULT_TRANSCRIBER_PROGRAM: &str = "basic-pitch";
const MAX_STDERR_CHARS: usize = 240;

/// Transcriber backed by an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTranscriber {
    program: String,
    extra_args: Vec<String>,
}

impl Default for CommandTranscriber {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIBER_PROGRAM)
    }
}

impl CommandTranscriber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Parses a whitespace-separated command line such as
    /// `basic-pitch --onset-threshold 0.6`.
    ///
    /// Returns `None` for a blank command line.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            extra_args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments placed before the output directory and audio path.
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    fn run(&self, audio_path: &Path) -> TranscriptionResult<Vec<RawEvent>> {
        let output_dir = tempfile::tempdir()
            .map_err(|err| TranscriptionError::io(&std::env::temp_dir(), err))?;

        info!(
            "event=transcribe module=command status=start program={} input={}",
            self.program,
            audio_path.display()
        );
        let output = Command::new(&self.program)
            .args(&self.extra_args)
            .arg(output_dir.path())
            .arg(audio_path)
            .output()
            .map_err(|err| TranscriptionError::Command {
                program: self.program.clone(),
                status: None,
                stderr: err.to_string(),
            })?;

        if !output.status.success() {
            let stderr = summarize_stderr(&String::from_utf8_lossy(&output.stderr));
            error!(
                "event=transcribe module=command status=error program={} exit={:?}",
                self.program,
                output.status.code()
            );
            return Err(TranscriptionError::Command {
                program: self.program.clone(),
                status: output.status.code(),
                stderr,
            });
        }

        let midi_path = find_midi_output(output_dir.path())?;
        MidiFileTranscriber::read_events(&midi_path)
    }
}

impl Transcriber for CommandTranscriber {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        self.run(source.require_path()?)
    }
}

fn find_midi_output(dir: &Path) -> TranscriptionResult<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|err| TranscriptionError::io(dir, err))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| TranscriptionError::io(dir, err))?.path();
        if has_midi_extension(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| TranscriptionError::MissingOutput {
            dir: dir.to_path_buf(),
        })
}

/// True for `.mid` / `.midi` paths (case-insensitive).
pub fn has_midi_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"))
        .unwrap_or(false)
}

/// Keeps the last non-empty stderr line, capped in length.
fn summarize_stderr(stderr: &str) -> String {
    let last_line = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default();
    let mut summary = last_line.chars().take(MAX_STDERR_CHARS).collect::<String>();
    if last_line.chars().count() > MAX_STDERR_CHARS {
        summary.push_str("...");
    }
    summary
}
