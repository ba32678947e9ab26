//! Core domain logic for notescribe.
//! Turns transcribed note events into a canonical, time-ordered note sequence
//! and renders it as a note table and a text piano roll.

pub mod config;
pub mod extract;
pub mod logging;
pub mod model;
pub mod render;
pub mod service;
pub mod transcribe;

pub use config::{ConfigError, NotescribeConfig};
pub use extract::extractor::{extract, ExtractError, ExtractResult, InvalidEventReason};
pub use extract::raw_event::{RawEvent, RawVelocity};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    midi_to_name, InvalidNoteError, Note, NoteField, NoteSequence, OutOfRangeError, PitchName,
};
pub use render::piano_roll::{
    piano_roll_rows, render_piano_roll, render_piano_roll_with_step, ActivityRule,
    InvalidConfigError, PianoRollOptions, PianoRollRow, DEFAULT_STEP_SECONDS,
    MAX_PIANO_ROLL_BUCKETS,
};
pub use render::table::{render_table, TABLE_WIDTH};
pub use service::pipeline::{Pipeline, PipelineError, PipelineResult, RenderedViews};
pub use transcribe::artifact::{encode_smf, write_smf, MidiArtifactTranscriber};
pub use transcribe::command::CommandTranscriber;
pub use transcribe::dispatch::{AutoTranscriber, SourceKind};
pub use transcribe::midi_file::MidiFileTranscriber;
pub use transcribe::note_events::NoteEventsJsonTranscriber;
pub use transcribe::{AudioSource, Transcriber, TranscriptionError, TranscriptionResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
