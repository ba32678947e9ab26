//! Extension-based transcriber selection.

use crate::extract::raw_event::RawEvent;
use crate::transcribe::command::{has_midi_extension, CommandTranscriber};
use crate::transcribe::midi_file::MidiFileTranscriber;
use crate::transcribe::note_events::NoteEventsJsonTranscriber;
use crate::transcribe::{AudioSource, Transcriber, TranscriptionError, TranscriptionResult};
use log::debug;
use std::path::Path;

/// Which adapter handles a given source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Midi,
    NoteEventsJson,
    Audio,
}

impl SourceKind {
    pub fn of_path(path: &Path) -> Self {
        if has_midi_extension(path) {
            return Self::Midi;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::NoteEventsJson,
            _ => Self::Audio,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Midi => "midi",
            Self::NoteEventsJson => "note_events_json",
            Self::Audio => "audio",
        }
    }
}

/// Routes `.mid`/`.midi` and `.json` files to their readers and everything
/// else to the configured external transcriber.
#[derive(Debug, Clone, Default)]
pub struct AutoTranscriber {
    command: Option<CommandTranscriber>,
}

impl AutoTranscriber {
    /// Dispatcher without an audio transcriber; audio inputs are rejected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(command: CommandTranscriber) -> Self {
        Self {
            command: Some(command),
        }
    }

    pub fn command(&self) -> Option<&CommandTranscriber> {
        self.command.as_ref()
    }
}

impl Transcriber for AutoTranscriber {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        let kind = match source {
            AudioSource::Path(path) => SourceKind::of_path(path),
            AudioSource::Buffer { .. } => SourceKind::Audio,
        };
        debug!(
            "event=transcribe module=dispatch status=route source={} kind={}",
            source.describe(),
            kind.as_str()
        );

        match kind {
            SourceKind::Midi => MidiFileTranscriber.transcribe(source),
            SourceKind::NoteEventsJson => NoteEventsJsonTranscriber.transcribe(source),
            SourceKind::Audio => match &self.command {
                Some(command) => command.transcribe(source),
                None => Err(TranscriptionError::UnsupportedSource(format!(
                    "{} needs an audio transcriber, which is disabled; set NOTESCRIBE_TRANSCRIBER or pass a .mid/.json file",
                    source.describe()
                ))),
            },
        }
    }
}
