//! Raw note event shape produced by transcription sources.

use serde::{Deserialize, Serialize};

/// Velocity as reported by a transcription source.
///
/// Sources disagree on intensity scale: MIDI files carry `0..=127` integers
/// while model-based transcribers usually report a `[0, 1]` amplitude.
/// The variant makes the scale explicit instead of guessing from the value.
///
/// When deserialized from JSON, an integer literal (`82`) is read as `Midi`
/// and a float literal (`0.65`, `1.0`) as `Normalized`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVelocity {
    /// Already on the MIDI `0..=127` integer scale.
    Midi(i64),
    /// Normalized amplitude in `[0, 1]`.
    Normalized(f64),
}

impl RawVelocity {
    /// Converts to the MIDI integer scale without range checking.
    ///
    /// `Normalized(v)` becomes `round(v * 127)`, so `1.0` maps to `127` and
    /// `0.5` to `64`. Range checks happen when the note is built, which keeps
    /// out-of-scale amplitudes visible as out-of-range velocities.
    ///
    /// Returns `None` for a non-finite normalized value.
    pub fn to_midi_scale(self) -> Option<i64> {
        match self {
            Self::Midi(value) => Some(value),
            Self::Normalized(value) if value.is_finite() => Some((value * 127.0).round() as i64),
            Self::Normalized(_) => None,
        }
    }
}

impl From<u8> for RawVelocity {
    fn from(value: u8) -> Self {
        Self::Midi(i64::from(value))
    }
}

/// One transcribed note event before validation.
///
/// Field aliases accept the column names of basic-pitch note-event exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(alias = "pitch_midi")]
    pub pitch: i64,
    /// Onset in seconds.
    #[serde(alias = "start_time_s")]
    pub start_time: f64,
    /// Release in seconds; must be greater than `start_time`.
    #[serde(alias = "end_time_s")]
    pub end_time: f64,
    #[serde(alias = "amplitude")]
    pub velocity: RawVelocity,
}

impl RawEvent {
    pub fn new(pitch: i64, start_time: f64, end_time: f64, velocity: RawVelocity) -> Self {
        Self {
            pitch,
            start_time,
            end_time,
            velocity,
        }
    }

    /// `end_time - start_time`; may be zero or negative for bad events.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::{RawEvent, RawVelocity};

    #[test]
    fn normalized_velocity_scales_to_midi_range() {
        assert_eq!(RawVelocity::Normalized(1.0).to_midi_scale(), Some(127));
        assert_eq!(RawVelocity::Normalized(0.0).to_midi_scale(), Some(0));
        assert_eq!(RawVelocity::Normalized(0.5).to_midi_scale(), Some(64));
        assert_eq!(RawVelocity::Normalized(f64::NAN).to_midi_scale(), None);
    }

    #[test]
    fn midi_velocity_passes_through_unchanged() {
        assert_eq!(RawVelocity::Midi(82).to_midi_scale(), Some(82));
        assert_eq!(RawVelocity::Midi(300).to_midi_scale(), Some(300));
    }

    #[test]
    fn json_literal_kind_selects_velocity_scale() {
        let events: Vec<RawEvent> = serde_json::from_str(
            r#"[
                {"pitch": 60, "start_time": 0.0, "end_time": 0.5, "velocity": 1},
                {"pitch_midi": 62, "start_time_s": 0.5, "end_time_s": 1.0, "amplitude": 1.0}
            ]"#,
        )
        .expect("valid event json");

        assert_eq!(events[0].velocity, RawVelocity::Midi(1));
        assert_eq!(events[1].velocity, RawVelocity::Normalized(1.0));
        assert_eq!(events[1].pitch, 62);
    }
}
