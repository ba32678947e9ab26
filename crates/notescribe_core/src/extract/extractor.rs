//! Raw event to canonical note extraction.
//!
//! # Invariants
//! - Every event is validated; the first failure aborts with its input index.
//! - Output is sorted by `start`, ties by `midi_number`.

use crate::extract::raw_event::RawEvent;
use crate::model::note::{InvalidNoteError, Note, NoteSequence, OutOfRangeError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Why one raw event could not become a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidEventReason {
    /// Start or end time is NaN or infinite.
    NonFiniteTime { start_time: f64, end_time: f64 },
    NegativeStart(f64),
    /// `end_time <= start_time`.
    NonPositiveDuration { start_time: f64, end_time: f64 },
    /// Normalized velocity is NaN or infinite.
    NonFiniteVelocity,
}

impl Display for InvalidEventReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteTime {
                start_time,
                end_time,
            } => write!(f, "non-finite time range {start_time}..{end_time}"),
            Self::NegativeStart(start) => write!(f, "negative start time {start}"),
            Self::NonPositiveDuration {
                start_time,
                end_time,
            } => write!(
                f,
                "non-positive duration (start {start_time}, end {end_time})"
            ),
            Self::NonFiniteVelocity => write!(f, "non-finite normalized velocity"),
        }
    }
}

/// Extraction failure, tagged with the offending event's input index.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    OutOfRange {
        index: usize,
        source: OutOfRangeError,
    },
    InvalidEvent {
        index: usize,
        reason: InvalidEventReason,
    },
}

impl ExtractError {
    /// Input index of the rejected event.
    pub fn index(&self) -> usize {
        match self {
            Self::OutOfRange { index, .. } | Self::InvalidEvent { index, .. } => *index,
        }
    }
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { index, source } => write!(f, "event #{index}: {source}"),
            Self::InvalidEvent { index, reason } => {
                write!(f, "event #{index} is invalid: {reason}")
            }
        }
    }
}

impl Error for ExtractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutOfRange { source, .. } => Some(source),
            Self::InvalidEvent { .. } => None,
        }
    }
}

/// Converts raw events into a time-ordered note sequence.
///
/// Input order is irrelevant: the same event set in any permutation yields the
/// same sequence.
///
/// # Errors
/// - `InvalidEvent` for non-finite or negative times, non-positive duration,
///   or a non-finite normalized velocity.
/// - `OutOfRange` for pitch or (normalized) velocity outside `0..=127`.
pub fn extract(raw_events: &[RawEvent]) -> ExtractResult<NoteSequence> {
    let notes = raw_events
        .iter()
        .enumerate()
        .map(|(index, event)| event_to_note(index, event))
        .collect::<ExtractResult<Vec<_>>>()
        .inspect_err(|err| {
            warn!(
                "event=extract module=extract status=error index={} reason={}",
                err.index(),
                err
            );
        })?;

    let sequence = NoteSequence::from_notes(notes);
    debug!(
        "event=extract module=extract status=ok notes={} end_time={:.3}",
        sequence.len(),
        sequence.end_time()
    );
    Ok(sequence)
}

fn event_to_note(index: usize, event: &RawEvent) -> ExtractResult<Note> {
    let invalid = |reason| ExtractError::InvalidEvent { index, reason };

    if !event.start_time.is_finite() || !event.end_time.is_finite() {
        return Err(invalid(InvalidEventReason::NonFiniteTime {
            start_time: event.start_time,
            end_time: event.end_time,
        }));
    }
    if event.start_time < 0.0 {
        return Err(invalid(InvalidEventReason::NegativeStart(event.start_time)));
    }
    let duration = event.duration();
    if duration <= 0.0 {
        return Err(invalid(InvalidEventReason::NonPositiveDuration {
            start_time: event.start_time,
            end_time: event.end_time,
        }));
    }
    let velocity = event
        .velocity
        .to_midi_scale()
        .ok_or(invalid(InvalidEventReason::NonFiniteVelocity))?;

    Note::new(event.pitch, event.start_time, duration, velocity).map_err(|err| match err {
        InvalidNoteError::OutOfRange(source) => ExtractError::OutOfRange { index, source },
        InvalidNoteError::InvalidStart(start) => invalid(InvalidEventReason::NegativeStart(start)),
        InvalidNoteError::NonPositiveDuration(_) => {
            invalid(InvalidEventReason::NonPositiveDuration {
                start_time: event.start_time,
                end_time: event.end_time,
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{extract, ExtractError, InvalidEventReason};
    use crate::extract::raw_event::{RawEvent, RawVelocity};
    use crate::model::note::OutOfRangeError;

    #[test]
    fn reports_index_of_first_bad_event() {
        let events = [
            RawEvent::new(60, 0.0, 0.5, RawVelocity::Midi(90)),
            RawEvent::new(62, 0.5, 0.5, RawVelocity::Midi(90)),
        ];

        let err = extract(&events).expect_err("zero duration must fail");
        assert_eq!(
            err,
            ExtractError::InvalidEvent {
                index: 1,
                reason: InvalidEventReason::NonPositiveDuration {
                    start_time: 0.5,
                    end_time: 0.5,
                },
            }
        );
    }

    #[test]
    fn out_of_scale_amplitude_is_out_of_range_velocity() {
        let events = [RawEvent::new(60, 0.0, 0.5, RawVelocity::Normalized(1.5))];

        let err = extract(&events).expect_err("amplitude above 1 must fail");
        assert_eq!(
            err,
            ExtractError::OutOfRange {
                index: 0,
                source: OutOfRangeError::velocity(191),
            }
        );
    }

    #[test]
    fn nan_times_are_invalid_not_out_of_range() {
        let events = [RawEvent::new(60, f64::NAN, 0.5, RawVelocity::Midi(90))];

        let err = extract(&events).expect_err("NaN start must fail");
        assert!(matches!(
            err,
            ExtractError::InvalidEvent {
                index: 0,
                reason: InvalidEventReason::NonFiniteTime { .. },
            }
        ));
    }
}
