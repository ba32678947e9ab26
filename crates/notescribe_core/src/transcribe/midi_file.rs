//! Standard MIDI File reader.
//!
//! Reads every track of a `.mid` file and pairs note-on/note-off messages into
//! raw events with times in seconds.
//!
//! # Invariants
//! - Note-on with velocity 0 is treated as note-off.
//! - Overlapping notes on the same channel and key close in FIFO order.
//! - Notes still open at the end of a track close at the track's last tick.
//! - All tracks share one tempo map and start at tick 0.

use crate::extract::raw_event::{RawEvent, RawVelocity};
use crate::transcribe::{AudioSource, Transcriber, TranscriptionError, TranscriptionResult};
use log::{debug, info, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

/// Tempo assumed until the first tempo meta event (120 BPM).
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

/// Transcriber for sources that already are Standard MIDI Files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidiFileTranscriber;

impl MidiFileTranscriber {
    pub fn new() -> Self {
        Self
    }

    /// Reads and decodes one MIDI file from disk.
    pub fn read_events(path: &Path) -> TranscriptionResult<Vec<RawEvent>> {
        let bytes = std::fs::read(path).map_err(|err| TranscriptionError::io(path, err))?;
        let events =
            events_from_bytes(&bytes).map_err(|source| TranscriptionError::MidiParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "event=transcribe module=midi_file status=ok path={} events={}",
            path.display(),
            events.len()
        );
        Ok(events)
    }
}

impl Transcriber for MidiFileTranscriber {
    fn transcribe(&self, source: &AudioSource) -> TranscriptionResult<Vec<RawEvent>> {
        Self::read_events(source.require_path()?)
    }
}

/// Decodes note events from Standard MIDI File bytes.
pub fn events_from_bytes(bytes: &[u8]) -> Result<Vec<RawEvent>, midly::Error> {
    let smf = Smf::parse(bytes)?;
    let clock = TickClock::new(&smf);

    let mut events = Vec::new();
    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut open: BTreeMap<(u8, u8), VecDeque<(u64, u8)>> = BTreeMap::new();
        let mut tick = 0_u64;

        for event in track {
            tick += u64::from(event.delta.as_int());
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let channel = channel.as_int();
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    open.entry((channel, key.as_int()))
                        .or_default()
                        .push_back((tick, vel.as_int()));
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    let started = open
                        .get_mut(&(channel, key.as_int()))
                        .and_then(VecDeque::pop_front);
                    match started {
                        Some((start_tick, velocity)) => events.push(raw_event(
                            &clock,
                            key.as_int(),
                            start_tick,
                            tick,
                            velocity,
                        )),
                        None => debug!(
                            "event=midi_decode module=midi_file status=skip track={} key={} reason=unmatched_note_off",
                            track_index,
                            key.as_int()
                        ),
                    }
                }
                _ => {}
            }
        }

        for ((channel, key), pending) in open {
            for (start_tick, velocity) in pending {
                warn!(
                    "event=midi_decode module=midi_file status=warn track={} channel={} key={} reason=unterminated_note",
                    track_index, channel, key
                );
                events.push(raw_event(&clock, key, start_tick, tick, velocity));
            }
        }
    }

    Ok(events)
}

fn raw_event(clock: &TickClock, key: u8, start_tick: u64, end_tick: u64, velocity: u8) -> RawEvent {
    RawEvent::new(
        i64::from(key),
        clock.seconds_at(start_tick),
        clock.seconds_at(end_tick),
        RawVelocity::from(velocity),
    )
}

/// Converts absolute ticks to seconds.
#[derive(Debug)]
enum TickClock {
    /// Tempo segments `(start_tick, seconds_at_start, micros_per_quarter)`,
    /// sorted by tick; the first segment always starts at tick 0.
    Metrical {
        ticks_per_quarter: f64,
        segments: Vec<(u64, f64, u32)>,
    },
    Timecode {
        ticks_per_second: f64,
    },
}

impl TickClock {
    fn new(smf: &Smf<'_>) -> Self {
        match smf.header.timing {
            Timing::Metrical(ticks_per_quarter) => {
                let ticks_per_quarter = f64::from(ticks_per_quarter.as_int().max(1));
                Self::Metrical {
                    ticks_per_quarter,
                    segments: tempo_segments(smf, ticks_per_quarter),
                }
            }
            Timing::Timecode(fps, subframes) => Self::Timecode {
                ticks_per_second: (f64::from(fps.as_f32()) * f64::from(subframes)).max(1.0),
            },
        }
    }

    fn seconds_at(&self, tick: u64) -> f64 {
        match self {
            Self::Metrical {
                ticks_per_quarter,
                segments,
            } => {
                let index = segments
                    .partition_point(|(start, _, _)| *start <= tick)
                    .saturating_sub(1);
                let (start, seconds, micros) = segments[index];
                seconds + (tick - start) as f64 * f64::from(micros) / 1e6 / ticks_per_quarter
            }
            Self::Timecode { ticks_per_second } => tick as f64 / ticks_per_second,
        }
    }
}

fn tempo_segments(smf: &Smf<'_>, ticks_per_quarter: f64) -> Vec<(u64, f64, u32)> {
    let mut changes = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0_u64;
        for event in track {
            tick += u64::from(event.delta.as_int());
            if let TrackEventKind::Meta(MetaMessage::Tempo(micros)) = event.kind {
                changes.push((tick, micros.as_int()));
            }
        }
    }
    changes.sort_by_key(|(tick, _)| *tick);

    let mut segments = vec![(0_u64, 0.0_f64, DEFAULT_MICROS_PER_QUARTER)];
    for (tick, micros) in changes {
        let (last_tick, last_seconds, last_micros) = segments[segments.len() - 1];
        if tick == last_tick {
            // Later tempo at the same tick wins.
            let last = segments.len() - 1;
            segments[last].2 = micros;
            continue;
        }
        let seconds = last_seconds
            + (tick - last_tick) as f64 * f64::from(last_micros) / 1e6 / ticks_per_quarter;
        segments.push((tick, seconds, micros));
    }
    segments
}
