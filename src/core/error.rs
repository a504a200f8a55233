//! Error types for configuration, clock sampling and notification dispatch.

use std::path::PathBuf;

use thiserror::Error;

use super::alerts::model::ZoneRole;

/// Startup configuration failures. Any of these stops the process before the
/// first tick.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("Duplicate event key '{0}' in catalog")]
    DuplicateEventKey(String),

    #[error(
        "Events '{first}' and '{second}' both trigger at {hour:02}:{minute:02} in the {role} zone"
    )]
    DuplicateTrigger {
        first: String,
        second: String,
        role: ZoneRole,
        hour: u32,
        minute: u32,
    },

    #[error("Event '{key}' has invalid trigger time {hour:02}:{minute:02}")]
    InvalidTrigger { key: String, hour: u32, minute: u32 },

    #[error("Alert override for unknown event '{0}'")]
    UnknownEventOverride(String),

    #[error("Failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A transient failure to sample the wall clock for one zone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Clock read failed for {zone}: {reason}")]
pub struct ClockError {
    pub zone: String,
    pub reason: String,
}

/// Failures inside the notifier. These never reach the scheduler.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Sound file not found: {0}")]
    MissingResource(PathBuf),

    #[error("Audio output unavailable: {0}")]
    Output(#[from] rodio::StreamError),

    #[error("Could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("No speech synthesizer found on this system")]
    NoSynthesizer,

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
