//! MIDI artifact output for transcribed events.
//!
//! # Invariants
//! - The artifact is a single-track SMF at 480 ticks per quarter and 120 BPM,
//!   so one second is exactly 960 ticks.
//! - Events that cannot be encoded (pitch/velocity outside `0..=127`,
//!   non-finite or negative times) are left out of the file and logged;
//!   the extractor still reports them.
//! - At equal ticks, note-offs are written before note-ons.

use crate::extract::raw_event::RawEvent;
use crate::transcribe::midi_file::DEFAULT_MICROS_PER_QUARTER;
use crate::transcribe::{AudioSource, Transcriber, TranscriptionError, TranscriptionResult};
use log::{info, warn};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::io;
use std::path::{Path, PathBuf};

pub const ARTIFACT_TICKS_PER_QUARTER: u16 = 480;
const TICKS_PER_SECOND: f64 =
    ARTIFACT_TICKS_PER_QUARTER as f64 * 1e6 / DEFAULT_MICROS_PER_QUARTER as f64;
const MAX_DELTA: u32 = (1 << 28) - 1;
const TRACK_NAME: &[u8] = b"notescribe";

/// Decorator that saves every successful transcription as a MIDI file.
#[derive(Debug, Clone)]
pub struct MidiArtifactTranscriber<T> {
    inner: T,
    output_path: PathBuf,
}

impl<T: Transcriber> MidiArtifactTranscriber<T> {
    pub fn new(inner: T, output_path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl<T: Transcriber> Transcriber for MidiArtifactTranscriber<T> {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        let events = self.inner.transcribe(source)?;
        write_smf(&events, &self.output_path)
            .map_err(|err| TranscriptionError::io(&self.output_path, err))?;
        info!(
            "event=midi_saved module=artifact status=ok path={} events={}",
            self.output_path.display(),
            events.len()
        );
        Ok(events)
    }
}

/// Writes events to `path` as a Standard MIDI File.
pub fn write_smf(events: &[RawEvent], path: &Path) -> io::Result<()> {
    let bytes = encode_smf(events)?;
    std::fs::write(path, bytes)
}

/// Encodes events as Standard MIDI File bytes.
pub fn encode_smf(events: &[RawEvent]) -> io::Result<Vec<u8>> {
    let mut timeline = Vec::with_capacity(events.len() * 2);
    for (index, event) in events.iter().enumerate() {
        match encodable(event) {
            Some((key, vel, start_tick, end_tick)) => {
                timeline.push((start_tick, true, key, vel));
                timeline.push((end_tick, false, key, 0));
            }
            None => warn!(
                "event=midi_encode module=artifact status=skip index={} pitch={}",
                index, event.pitch
            ),
        }
    }
    // `false < true`: offs sort ahead of ons sharing a tick.
    timeline.sort_by_key(|(tick, is_on, key, _)| (*tick, *is_on, *key));

    let mut track = Vec::with_capacity(timeline.len() + 3);
    track.push(meta(0, MetaMessage::TrackName(TRACK_NAME)));
    track.push(meta(
        0,
        MetaMessage::Tempo(u24::new(DEFAULT_MICROS_PER_QUARTER)),
    ));

    let mut last_tick = 0_u64;
    for (tick, is_on, key, vel) in timeline {
        let delta = (tick - last_tick).min(u64::from(MAX_DELTA)) as u32;
        last_tick = tick;
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        });
    }
    track.push(meta(0, MetaMessage::EndOfTrack));

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(ARTIFACT_TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(track);

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;
    Ok(bytes)
}

fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

/// Returns `(key, velocity, start_tick, end_tick)` for an encodable event.
fn encodable(event: &RawEvent) -> Option<(u8, u8, u64, u64)> {
    let key = u8::try_from(event.pitch).ok().filter(|key| *key <= 127)?;
    let vel = event
        .velocity
        .to_midi_scale()
        .and_then(|vel| u8::try_from(vel).ok())
        .filter(|vel| *vel <= 127)?;
    if !event.start_time.is_finite() || !event.end_time.is_finite() || event.start_time < 0.0 {
        return None;
    }
    let start_tick = seconds_to_tick(event.start_time);
    let end_tick = seconds_to_tick(event.end_time).max(start_tick);
    Some((key, vel, start_tick, end_tick))
}

fn seconds_to_tick(seconds: f64) -> u64 {
    (seconds * TICKS_PER_SECOND).round() as u64
}
