//! Core use-case services.
//!
//! # Responsibility
//! - Compose transcription, extraction and rendering into entry points.
//! - Keep CLI callers decoupled from stage wiring.

pub mod pipeline;
