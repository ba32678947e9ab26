//! Read-only text views over a `NoteSequence`.
//!
//! # Responsibility
//! - Render the tabular listing and the time-bucketed piano roll.
//!
//! # Invariants
//! - Renderers never mutate their input.
//! - Output is byte-identical for identical input and options.

pub mod piano_roll;
pub mod table;
