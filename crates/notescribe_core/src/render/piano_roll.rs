//! Time-bucketed piano roll.
//!
//! # Invariants
//! - Buckets are `[k * step, (k + 1) * step)` for `k = 0, 1, ...` while the
//!   bucket start is below the sequence end time.
//! - Bucket membership is decided on integer bucket indices, so a note that
//!   starts on a boundary lands in the later bucket for any step.
//! - Buckets with no active note are omitted (sparse output).
//! - Active notes keep the sequence order within a line.
//! - A roll never spans more than `MAX_PIANO_ROLL_BUCKETS` buckets.

use crate::model::note::{Note, NoteSequence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Write as _};

/// Default bucket width in seconds.
pub const DEFAULT_STEP_SECONDS: f64 = 0.5;
/// Width of the `-` rule lines around the roll.
pub const PIANO_ROLL_RULE_WIDTH: usize = 60;
/// Upper bound on `ceil(end_time / step)`.
pub const MAX_PIANO_ROLL_BUCKETS: u64 = 1_000_000;
/// Relative tolerance for snapping `time / step` onto a bucket boundary.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Rejected piano-roll configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidConfigError {
    /// Step is zero, negative, NaN or infinite.
    NonPositiveStep { step_seconds: f64 },
    /// Step is so small against the sequence length that the roll would
    /// exceed `MAX_PIANO_ROLL_BUCKETS`.
    TooManyBuckets { step_seconds: f64, end_time: f64 },
}

impl InvalidConfigError {
    pub fn step_seconds(&self) -> f64 {
        match self {
            Self::NonPositiveStep { step_seconds } | Self::TooManyBuckets { step_seconds, .. } => {
                *step_seconds
            }
        }
    }
}

impl Display for InvalidConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveStep { step_seconds } => write!(
                f,
                "piano roll step must be a finite number > 0, got {step_seconds}"
            ),
            Self::TooManyBuckets {
                step_seconds,
                end_time,
            } => write!(
                f,
                "piano roll step {step_seconds}s is too small for {end_time}s of notes \
                 (more than {MAX_PIANO_ROLL_BUCKETS} buckets)"
            ),
        }
    }
}

impl Error for InvalidConfigError {}

/// How a note is matched against a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityRule {
    /// Active when `[start, end)` intersects `[bucket, bucket + step)`.
    ///
    /// Every note shows up in every bucket it touches, however short it is.
    #[default]
    Overlap,
    /// Active when the note is sounding at the bucket start instant.
    ///
    /// Notes that begin and end strictly inside one bucket are not shown.
    Sample,
}

impl ActivityRule {
    /// Parses `overlap` or `sample` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overlap" => Some(Self::Overlap),
            "sample" => Some(Self::Sample),
            _ => None,
        }
    }

    /// Inclusive range of bucket indices in which `note` is active, if any.
    fn bucket_span(self, note: &Note, step: f64) -> Option<(u64, u64)> {
        let start = bucket_coordinate(note.start(), step);
        let end = bucket_coordinate(note.end(), step);
        let first = match self {
            Self::Overlap => start.floor(),
            Self::Sample => start.ceil(),
        };
        let last = end.ceil() - 1.0;
        if last < first {
            return None;
        }
        Some((first as u64, last as u64))
    }
}

/// `time / step`, snapped to the nearest integer when it lies within rounding
/// error of a bucket boundary.
fn bucket_coordinate(time: f64, step: f64) -> f64 {
    let position = time / step;
    let nearest = position.round();
    if (position - nearest).abs() <= BOUNDARY_TOLERANCE * nearest.abs().max(1.0) {
        nearest
    } else {
        position
    }
}

/// Piano-roll rendering options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PianoRollOptions {
    pub step_seconds: f64,
    pub activity: ActivityRule,
}

impl Default for PianoRollOptions {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_STEP_SECONDS,
            activity: ActivityRule::default(),
        }
    }
}

impl PianoRollOptions {
    pub fn with_step(step_seconds: f64) -> Self {
        Self {
            step_seconds,
            ..Self::default()
        }
    }

    /// # Errors
    /// - Returns `NonPositiveStep` when the step is not a finite number > 0.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        if self.step_seconds.is_finite() && self.step_seconds > 0.0 {
            Ok(())
        } else {
            Err(InvalidConfigError::NonPositiveStep {
                step_seconds: self.step_seconds,
            })
        }
    }
}

/// One non-empty bucket of the roll.
#[derive(Debug, Clone, PartialEq)]
pub struct PianoRollRow<'a> {
    pub bucket_start: f64,
    pub active: Vec<&'a Note>,
}

impl PianoRollRow<'_> {
    /// `"<start>s | <names>"` with French names joined by `", "`.
    pub fn label(&self) -> String {
        let names = self
            .active
            .iter()
            .map(|note| note.name_fr())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{:.2}s | {names}", self.bucket_start)
    }
}

/// Computes the non-empty buckets of the roll.
///
/// Only the buckets each note covers are visited, so the cost follows the
/// notes rather than the length of the gaps between them.
///
/// # Errors
/// - `NonPositiveStep` for a non-positive or non-finite step.
/// - `TooManyBuckets` when the roll would exceed `MAX_PIANO_ROLL_BUCKETS`.
pub fn piano_roll_rows<'a>(
    notes: &'a NoteSequence,
    options: &PianoRollOptions,
) -> Result<Vec<PianoRollRow<'a>>, InvalidConfigError> {
    options.validate()?;
    let step = options.step_seconds;
    let end_time = notes.end_time();
    if bucket_coordinate(end_time, step).ceil() > MAX_PIANO_ROLL_BUCKETS as f64 {
        return Err(InvalidConfigError::TooManyBuckets {
            step_seconds: step,
            end_time,
        });
    }

    let mut buckets: BTreeMap<u64, Vec<&Note>> = BTreeMap::new();
    for note in notes {
        if let Some((first, last)) = options.activity.bucket_span(note, step) {
            for index in first..=last {
                buckets.entry(index).or_default().push(note);
            }
        }
    }

    // Bucket starts come from the index so rounding never accumulates.
    Ok(buckets
        .into_iter()
        .map(|(index, active)| PianoRollRow {
            bucket_start: index as f64 * step,
            active,
        })
        .collect())
}

/// Renders the piano roll as text.
///
/// Output is a `Piano Roll (step=<step>s):` header, a rule, one line per
/// non-empty bucket, and a closing rule.
///
/// # Errors
/// - Same as [`piano_roll_rows`].
pub fn render_piano_roll(
    notes: &NoteSequence,
    options: &PianoRollOptions,
) -> Result<String, InvalidConfigError> {
    let rows = piano_roll_rows(notes, options)?;
    let rule = "-".repeat(PIANO_ROLL_RULE_WIDTH);

    let mut out = String::new();
    let _ = writeln!(out, "Piano Roll (step={}s):", options.step_seconds);
    out.push_str(&rule);
    out.push('\n');
    for row in &rows {
        out.push_str(&row.label());
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    Ok(out)
}

/// [`render_piano_roll`] with the default activity rule.
pub fn render_piano_roll_with_step(
    notes: &NoteSequence,
    step_seconds: f64,
) -> Result<String, InvalidConfigError> {
    render_piano_roll(notes, &PianoRollOptions::with_step(step_seconds))
}

#[cfg(test)]
mod tests {
    use super::{
        bucket_coordinate, piano_roll_rows, ActivityRule, InvalidConfigError, PianoRollOptions,
        MAX_PIANO_ROLL_BUCKETS,
    };
    use crate::model::note::{Note, NoteSequence};

    #[test]
    fn options_reject_nan_and_non_positive_steps() {
        assert!(PianoRollOptions::with_step(0.0).validate().is_err());
        assert!(PianoRollOptions::with_step(-0.5).validate().is_err());
        assert!(PianoRollOptions::with_step(f64::NAN).validate().is_err());
        assert!(PianoRollOptions::with_step(f64::INFINITY).validate().is_err());
        assert!(PianoRollOptions::with_step(0.25).validate().is_ok());
    }

    #[test]
    fn activity_rule_parses_known_names() {
        assert_eq!(ActivityRule::parse(" Overlap "), Some(ActivityRule::Overlap));
        assert_eq!(ActivityRule::parse("sample"), Some(ActivityRule::Sample));
        assert_eq!(ActivityRule::parse("grid"), None);
    }

    #[test]
    fn short_note_inside_bucket_depends_on_rule() {
        let notes = NoteSequence::from_notes(vec![Note::new(60, 0.1, 0.2, 90).unwrap()]);

        let overlap = piano_roll_rows(&notes, &PianoRollOptions::with_step(0.5)).unwrap();
        assert_eq!(overlap.len(), 1);
        assert_eq!(overlap[0].bucket_start, 0.0);

        let sample = PianoRollOptions {
            step_seconds: 0.5,
            activity: ActivityRule::Sample,
        };
        assert!(piano_roll_rows(&notes, &sample).unwrap().is_empty());
    }

    #[test]
    fn coordinates_snap_to_nearby_boundaries() {
        assert_eq!(bucket_coordinate(0.3, 0.1), 3.0);
        assert_eq!(bucket_coordinate(0.7, 0.1), 7.0);
        assert_eq!(bucket_coordinate(0.9, 0.3), 3.0);
        assert!((bucket_coordinate(0.25, 0.1) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn boundary_start_with_inexact_step_uses_later_bucket() {
        let notes = NoteSequence::from_notes(vec![Note::new(60, 0.3, 0.1, 90).unwrap()]);

        let rows = piano_roll_rows(&notes, &PianoRollOptions::with_step(0.1)).unwrap();
        let labels: Vec<String> = rows.iter().map(|row| row.label()).collect();
        assert_eq!(labels, vec!["0.30s | Do4"]);
    }

    #[test]
    fn oversized_roll_is_rejected() {
        let notes = NoteSequence::from_notes(vec![Note::new(60, 0.0, 10.0, 90).unwrap()]);

        let err = piano_roll_rows(&notes, &PianoRollOptions::with_step(1e-9))
            .expect_err("1e10 buckets must be refused");
        assert_eq!(
            err,
            InvalidConfigError::TooManyBuckets {
                step_seconds: 1e-9,
                end_time: 10.0,
            }
        );
        assert!(err.to_string().contains(&MAX_PIANO_ROLL_BUCKETS.to_string()));
    }
}
