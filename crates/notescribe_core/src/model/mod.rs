//! Canonical note model shared by extraction and rendering.
//!
//! # Responsibility
//! - Define the single note shape every other component reads.
//! - Own the pitch-naming table (English and solfège).
//!
//! # Invariants
//! - Notes are immutable value objects once created.
//! - A `NoteSequence` is always time-ordered.

pub mod note;
