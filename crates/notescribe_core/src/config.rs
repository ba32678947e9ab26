//! Runtime configuration.
//!
//! # Responsibility
//! - Hold tunables for the pipeline, transcriber selection and logging.
//! - Load them from a JSON file and overlay `NOTESCRIBE_*` environment values.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.
//! - `validate()` must pass before options reach the renderers.

use crate::logging::default_log_level;
use crate::render::piano_roll::{
    ActivityRule, InvalidConfigError, PianoRollOptions, DEFAULT_STEP_SECONDS,
};
use crate::transcribe::command::CommandTranscriber;
use crate::transcribe::dispatch::AutoTranscriber;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "NOTESCRIBE_CONFIG";
pub const ENV_STEP_SECONDS: &str = "NOTESCRIBE_STEP_SECONDS";
pub const ENV_ACTIVITY: &str = "NOTESCRIBE_ACTIVITY";
pub const ENV_TRANSCRIBER: &str = "NOTESCRIBE_TRANSCRIBER";
pub const ENV_LOG_LEVEL: &str = "NOTESCRIBE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTESCRIBE_LOG_DIR";
/// `NOTESCRIBE_TRANSCRIBER` value that turns audio transcription off.
pub const TRANSCRIBER_DISABLED: &str = "none";

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidValue {
        key: &'static str,
        value: String,
    },
    InvalidStep(InvalidConfigError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: `{value}`"),
            Self::InvalidStep(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
            Self::InvalidStep(err) => Some(err),
        }
    }
}

/// Pipeline and process configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotescribeConfig {
    /// Piano-roll bucket width in seconds.
    pub step_seconds: f64,
    /// Piano-roll bucket membership rule.
    pub activity: ActivityRule,
    /// External audio transcriber command line; `basic-pitch` when unset,
    /// audio disabled when empty.
    pub transcriber_command: Option<String>,
    pub log_level: String,
    /// Absolute log directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for NotescribeConfig {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_STEP_SECONDS,
            activity: ActivityRule::default(),
            transcriber_command: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl NotescribeConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlays `NOTESCRIBE_*` values from `lookup` (usually `std::env::var`).
    ///
    /// Blank values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_STEP_SECONDS) {
            self.step_seconds = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_STEP_SECONDS,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = get(ENV_ACTIVITY) {
            self.activity = ActivityRule::parse(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_ACTIVITY,
                value: value.clone(),
            })?;
        }
        if let Some(value) = get(ENV_TRANSCRIBER) {
            let value = value.trim();
            self.transcriber_command = if value.eq_ignore_ascii_case(TRANSCRIBER_DISABLED) {
                Some(String::new())
            } else {
                Some(value.to_string())
            };
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.log_level = value.trim().to_string();
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value.trim()));
        }
        Ok(self)
    }

    /// # Errors
    /// - Returns `InvalidStep` when `step_seconds` is not a finite number > 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.piano_roll_options()
            .validate()
            .map_err(ConfigError::InvalidStep)
    }

    pub fn piano_roll_options(&self) -> PianoRollOptions {
        PianoRollOptions {
            step_seconds: self.step_seconds,
            activity: self.activity,
        }
    }

    /// Transcriber dispatching on file extension.
    ///
    /// Audio files go to the configured command, or to `basic-pitch` when none
    /// is set. An empty command disables audio transcription.
    pub fn transcriber(&self) -> AutoTranscriber {
        let command = match self.transcriber_command.as_deref() {
            None => Some(CommandTranscriber::default()),
            Some(command_line) => CommandTranscriber::from_command_line(command_line),
        };
        command
            .map(AutoTranscriber::with_command)
            .unwrap_or_default()
    }
}
