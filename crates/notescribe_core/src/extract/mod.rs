//! Raw note events and their conversion into canonical notes.
//!
//! # Responsibility
//! - Describe the event shape every transcription source must produce.
//! - Validate, normalize and order events into a `NoteSequence`.
//!
//! # Invariants
//! - A single bad event fails the whole extraction; nothing is dropped.
//! - Output order does not depend on input order.

pub mod extractor;
pub mod raw_event;
