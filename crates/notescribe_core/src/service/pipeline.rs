//! Transcription pipeline use-case service.
//!
//! # Responsibility
//! - Run transcription -> extraction -> table + piano roll in strict order.
//! - Write rendered text to a caller-supplied sink.
//!
//! # Invariants
//! - The transcriber is called exactly once per `process` call.
//! - Transcription failures are surfaced unchanged, never retried.
//! - Both views are rendered before the first byte reaches the sink, so a
//!   failed run never leaves a partial table or roll behind.

use crate::extract::extractor::{extract, ExtractError};
use crate::model::note::NoteSequence;
use crate::render::piano_roll::{render_piano_roll, InvalidConfigError, PianoRollOptions};
use crate::render::table::render_table;
use crate::transcribe::{AudioSource, Transcriber, TranscriptionError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure of any pipeline stage.
#[derive(Debug)]
pub enum PipelineError {
    Transcription(TranscriptionError),
    Extract(ExtractError),
    InvalidConfig(InvalidConfigError),
    /// Writing to the output sink failed.
    Output(io::Error),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transcription(err) => write!(f, "transcription failed: {err}"),
            Self::Extract(err) => write!(f, "note extraction failed: {err}"),
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transcription(err) => Some(err),
            Self::Extract(err) => Some(err),
            Self::InvalidConfig(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<TranscriptionError> for PipelineError {
    fn from(value: TranscriptionError) -> Self {
        Self::Transcription(value)
    }
}

impl From<ExtractError> for PipelineError {
    fn from(value: ExtractError) -> Self {
        Self::Extract(value)
    }
}

impl From<InvalidConfigError> for PipelineError {
    fn from(value: InvalidConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}

impl From<io::Error> for PipelineError {
    fn from(value: io::Error) -> Self {
        Self::Output(value)
    }
}

/// Rendered table and piano roll of one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedViews {
    pub table: String,
    pub piano_roll: String,
}

impl RenderedViews {
    /// Table, a blank line, then the piano roll.
    pub fn write_to(&self, sink: &mut impl Write) -> io::Result<()> {
        sink.write_all(self.table.as_bytes())?;
        sink.write_all(b"\n")?;
        sink.write_all(self.piano_roll.as_bytes())?;
        sink.flush()
    }
}

/// Orchestrates one transcriber and both renderers.
pub struct Pipeline<T: Transcriber> {
    transcriber: T,
    piano_roll: PianoRollOptions,
}

impl<T: Transcriber> Pipeline<T> {
    /// Creates a pipeline with default piano-roll options.
    pub fn new(transcriber: T) -> Self {
        Self {
            transcriber,
            piano_roll: PianoRollOptions::default(),
        }
    }

    pub fn with_piano_roll(mut self, options: PianoRollOptions) -> Self {
        self.piano_roll = options;
        self
    }

    pub fn piano_roll_options(&self) -> &PianoRollOptions {
        &self.piano_roll
    }

    /// Full run: transcribe, extract, render both views, write them to `sink`.
    ///
    /// # Errors
    /// - `Transcription` when the capability fails (propagated as-is).
    /// - `Extract` when any raw event is invalid.
    /// - `InvalidConfig` when the piano-roll step is not positive or too small
    ///   for the sequence length.
    /// - `Output` when the sink rejects the write.
    pub fn process(
        &self,
        source: &AudioSource,
        sink: &mut impl Write,
    ) -> PipelineResult<NoteSequence> {
        let notes = self.extract_only(source)?;
        let views = self.render_views(&notes)?;
        views.write_to(sink)?;
        info!(
            "event=pipeline_done module=pipeline status=ok source={} notes={}",
            source.describe(),
            notes.len()
        );
        Ok(notes)
    }

    /// [`Pipeline::process`] writing to standard output.
    pub fn process_to_stdout(&self, source: &AudioSource) -> PipelineResult<NoteSequence> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.process(source, &mut lock)
    }

    /// Transcription and extraction only; nothing is rendered.
    pub fn extract_only(&self, source: &AudioSource) -> PipelineResult<NoteSequence> {
        // Options are checked first so a bad step never costs a transcription.
        self.piano_roll.validate()?;
        let raw_events = self.transcriber.transcribe(source).inspect_err(|err| {
            error!(
                "event=transcribe module=pipeline status=error source={} error={}",
                source.describe(),
                err
            );
        })?;
        info!(
            "event=transcribe module=pipeline status=ok source={} events={}",
            source.describe(),
            raw_events.len()
        );
        Ok(extract(&raw_events)?)
    }

    /// Rendering only, for an already extracted sequence.
    pub fn render(&self, notes: &NoteSequence, sink: &mut impl Write) -> PipelineResult<()> {
        self.render_views(notes)?.write_to(sink)?;
        Ok(())
    }

    /// Renders both views into memory.
    pub fn render_views(&self, notes: &NoteSequence) -> PipelineResult<RenderedViews> {
        let views = RenderedViews {
            table: render_table(notes),
            piano_roll: render_piano_roll(notes, &self.piano_roll)?,
        };
        info!(
            "event=render module=pipeline status=ok notes={} step_seconds={}",
            notes.len(),
            self.piano_roll.step_seconds
        );
        Ok(views)
    }
}
