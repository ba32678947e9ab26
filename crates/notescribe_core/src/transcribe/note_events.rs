//! Note-event JSON reader.
//!
//! Accepts a JSON array of raw events, either in the crate's own field names
//! or in basic-pitch export names (`start_time_s`, `end_time_s`, `pitch_midi`,
//! `amplitude`).

use crate::extract::raw_event::RawEvent;
use crate::transcribe::{AudioSource, Transcriber, TranscriptionError, TranscriptionResult};
use log::info;
use std::path::Path;

/// Transcriber for sources that are pre-computed note-event dumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteEventsJsonTranscriber;

impl NoteEventsJsonTranscriber {
    pub fn new() -> Self {
        Self
    }

    pub fn read_events(path: &Path) -> TranscriptionResult<Vec<RawEvent>> {
        let text = std::fs::read_to_string(path).map_err(|err| TranscriptionError::io(path, err))?;
        let events: Vec<RawEvent> =
            serde_json::from_str(&text).map_err(|source| TranscriptionError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "event=transcribe module=note_events status=ok path={} events={}",
            path.display(),
            events.len()
        );
        Ok(events)
    }
}

impl Transcriber for NoteEventsJsonTranscriber {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        Self::read_events(source.require_path()?)
    }
}
