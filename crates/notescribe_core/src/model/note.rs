//! Note domain model and pitch naming.
//!
//! # Responsibility
//! - Define the canonical record for one transcribed note.
//! - Map MIDI numbers to English and French (solfège) pitch names.
//!
//! # Invariants
//! - `midi_number` and `velocity` are always within `0..=127`.
//! - `start` is finite and non-negative; `duration` is finite and `> 0`.
//! - Names are derived from `midi_number` only, through a fixed table.
//! - Black keys are always spelled as sharps, never flats.
//! - `NoteSequence` is sorted by `start` ascending, ties by `midi_number`.

use serde::Serialize;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Highest valid MIDI note number and velocity.
pub const MIDI_MAX: i64 = 127;

struct PitchClass {
    en: &'static str,
    fr: &'static str,
    sharp: bool,
}

const PITCH_CLASSES: [PitchClass; 12] = [
    PitchClass { en: "C", fr: "Do", sharp: false },
    PitchClass { en: "C#", fr: "Do#", sharp: true },
    PitchClass { en: "D", fr: "Ré", sharp: false },
    PitchClass { en: "D#", fr: "Ré#", sharp: true },
    PitchClass { en: "E", fr: "Mi", sharp: false },
    PitchClass { en: "F", fr: "Fa", sharp: false },
    PitchClass { en: "F#", fr: "Fa#", sharp: true },
    PitchClass { en: "G", fr: "Sol", sharp: false },
    PitchClass { en: "G#", fr: "Sol#", sharp: true },
    PitchClass { en: "A", fr: "La", sharp: false },
    PitchClass { en: "A#", fr: "La#", sharp: true },
    PitchClass { en: "B", fr: "Si", sharp: false },
];

/// Which MIDI-scaled quantity failed a range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Pitch,
    Velocity,
}

impl NoteField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pitch => "pitch",
            Self::Velocity => "velocity",
        }
    }
}

/// A pitch or velocity outside `0..=127`.
///
/// Raised instead of clamping so that bad transcriptions stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRangeError {
    pub field: NoteField,
    pub value: i64,
}

impl OutOfRangeError {
    pub fn pitch(value: i64) -> Self {
        Self {
            field: NoteField::Pitch,
            value,
        }
    }

    pub fn velocity(value: i64) -> Self {
        Self {
            field: NoteField::Velocity,
            value,
        }
    }
}

impl Display for OutOfRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} is out of range 0..={MIDI_MAX}",
            self.field.as_str(),
            self.value
        )
    }
}

impl Error for OutOfRangeError {}

/// Validation errors for `Note::new`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidNoteError {
    OutOfRange(OutOfRangeError),
    /// Start is negative, NaN or infinite.
    InvalidStart(f64),
    /// Duration is zero, negative, NaN or infinite.
    NonPositiveDuration(f64),
}

impl Display for InvalidNoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(err) => write!(f, "{err}"),
            Self::InvalidStart(start) => {
                write!(f, "note start must be finite and >= 0, got {start}")
            }
            Self::NonPositiveDuration(duration) => {
                write!(f, "note duration must be finite and > 0, got {duration}")
            }
        }
    }
}

impl Error for InvalidNoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutOfRange(err) => Some(err),
            Self::InvalidStart(_) | Self::NonPositiveDuration(_) => None,
        }
    }
}

impl From<OutOfRangeError> for InvalidNoteError {
    fn from(value: OutOfRangeError) -> Self {
        Self::OutOfRange(value)
    }
}

/// Dual-language name of one MIDI pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchName {
    /// English name with octave, e.g. `C#4`.
    pub name_en: String,
    /// Solfège name with octave, e.g. `Do#4`.
    pub name_fr: String,
    pub is_sharp: bool,
    /// Octave in the convention where middle C (60) is octave 4.
    pub octave: i64,
}

/// Maps a MIDI note number to its English and French names.
///
/// Octave is `floor(midi / 12) - 1`, so 60 is `C4`/`Do4` and 0 is `C-1`/`Do-1`.
///
/// # Errors
/// - Returns `OutOfRangeError` when `midi_number` is outside `0..=127`.
pub fn midi_to_name(midi_number: i64) -> Result<PitchName, OutOfRangeError> {
    if !(0..=MIDI_MAX).contains(&midi_number) {
        return Err(OutOfRangeError::pitch(midi_number));
    }

    let octave = midi_number / 12 - 1;
    let class = &PITCH_CLASSES[(midi_number % 12) as usize];
    Ok(PitchName {
        name_en: format!("{}{octave}", class.en),
        name_fr: format!("{}{octave}", class.fr),
        is_sharp: class.sharp,
        octave,
    })
}

/// Canonical transcribed note.
///
/// Immutable once built; all fields are read through accessors so the
/// invariants checked by [`Note::new`] cannot be broken afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    midi_number: u8,
    name_en: String,
    name_fr: String,
    is_sharp: bool,
    start: f64,
    duration: f64,
    velocity: u8,
}

impl Note {
    /// Builds a note, deriving both names from `midi_number`.
    ///
    /// # Errors
    /// - `OutOfRange` when pitch or velocity is outside `0..=127`.
    /// - `InvalidStart` when `start` is negative or not finite.
    /// - `NonPositiveDuration` when `duration <= 0` or not finite.
    pub fn new(
        midi_number: i64,
        start: f64,
        duration: f64,
        velocity: i64,
    ) -> Result<Self, InvalidNoteError> {
        let name = midi_to_name(midi_number)?;
        let velocity = midi_byte(velocity).ok_or(OutOfRangeError::velocity(velocity))?;
        if !start.is_finite() || start < 0.0 {
            return Err(InvalidNoteError::InvalidStart(start));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(InvalidNoteError::NonPositiveDuration(duration));
        }

        Ok(Self {
            midi_number: midi_number as u8,
            name_en: name.name_en,
            name_fr: name.name_fr,
            is_sharp: name.is_sharp,
            start,
            duration,
            velocity,
        })
    }

    pub fn midi_number(&self) -> u8 {
        self.midi_number
    }

    pub fn name_en(&self) -> &str {
        &self.name_en
    }

    pub fn name_fr(&self) -> &str {
        &self.name_fr
    }

    pub fn is_sharp(&self) -> bool {
        self.is_sharp
    }

    /// Onset in seconds from the beginning of the piece.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Length in seconds; always `> 0`.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Exclusive end of the sounding interval `[start, start + duration)`.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    fn sequence_order(&self, other: &Self) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then(self.midi_number.cmp(&other.midi_number))
    }
}

fn midi_byte(value: i64) -> Option<u8> {
    if (0..=MIDI_MAX).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

/// Time-ordered notes of one pipeline run.
///
/// Sorted by `start` ascending, then `midi_number` ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NoteSequence {
    notes: Vec<Note>,
}

impl NoteSequence {
    /// Builds a sequence from notes in any order.
    pub fn from_notes(mut notes: Vec<Note>) -> Self {
        notes.sort_by(Note::sequence_order);
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Latest note end, or `0.0` for an empty sequence.
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(Note::end).fold(0.0, f64::max)
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }
}

impl<'a> IntoIterator for &'a NoteSequence {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}
