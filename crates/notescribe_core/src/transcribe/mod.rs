//! Transcription capability contracts and adapters.
//!
//! # Responsibility
//! - Define the injected `Transcriber` capability (audio source -> raw events).
//! - Provide file-based adapters (MIDI, note-event JSON), an external-command
//!   adapter, extension dispatch and a MIDI artifact decorator.
//!
//! # Invariants
//! - Adapters never validate note semantics; that is the extractor's job.
//! - Adapter failures are returned unchanged to the caller, never retried.

use crate::extract::raw_event::RawEvent;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod artifact;
pub mod command;
pub mod dispatch;
pub mod midi_file;
pub mod note_events;

pub type TranscriptionResult<T> = Result<T, TranscriptionError>;

/// Input handed to a transcriber.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Audio (or pre-transcribed event) file on disk.
    Path(PathBuf),
    /// Already decoded mono samples.
    Buffer { samples: Vec<f32>, sample_rate: u32 },
}

impl AudioSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Returns the file path, or `UnsupportedSource` for in-memory buffers.
    pub fn require_path(&self) -> TranscriptionResult<&Path> {
        match self {
            Self::Path(path) => Ok(path.as_path()),
            Self::Buffer { .. } => Err(TranscriptionError::UnsupportedSource(
                "decoded sample buffers are not supported by this transcriber".to_string(),
            )),
        }
    }

    /// Short description used in log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Buffer {
                samples,
                sample_rate,
            } => format!("buffer({} samples @ {sample_rate} Hz)", samples.len()),
        }
    }
}

impl From<PathBuf> for AudioSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// Capability that turns an audio source into raw note events.
///
/// Implementations may be model inference, a MIDI reader, or a test fixture.
pub trait Transcriber {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>>;
}

impl<T: Transcriber + ?Sized> Transcriber for &T {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        (**self).transcribe(source)
    }
}

impl<T: Transcriber + ?Sized> Transcriber for Box<T> {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        (**self).transcribe(source)
    }
}

/// Transcription failure.
#[derive(Debug)]
pub enum TranscriptionError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    MidiParse {
        path: PathBuf,
        source: midly::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// External transcription program exited unsuccessfully or could not run.
    Command {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
    /// External program succeeded but left no MIDI file behind.
    MissingOutput {
        dir: PathBuf,
    },
    UnsupportedSource(String),
}

impl TranscriptionError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for TranscriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::MidiParse { path, source } => {
                write!(f, "{}: invalid MIDI file: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "{}: invalid note-event JSON: {source}", path.display())
            }
            Self::Command {
                program,
                status,
                stderr,
            } => {
                match status {
                    Some(code) => write!(f, "`{program}` exited with status {code}")?,
                    None => write!(f, "`{program}` failed to run")?,
                }
                if stderr.is_empty() {
                    Ok(())
                } else {
                    write!(f, ": {stderr}")
                }
            }
            Self::MissingOutput { dir } => {
                write!(f, "transcriber produced no MIDI file in {}", dir.display())
            }
            Self::UnsupportedSource(details) => write!(f, "unsupported source: {details}"),
        }
    }
}

impl Error for TranscriptionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::MidiParse { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Command { .. } | Self::MissingOutput { .. } | Self::UnsupportedSource(_) => None,
        }
    }
}
