// Alert model types for the session event catalog.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which configured zone's wall clock drives an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneRole {
    /// UK market clock. Also the reference calendar for day rollover.
    London,
    /// US market clock
    NewYork,
}

impl ZoneRole {
    /// The role whose calendar date and weekday gate every event
    pub const REFERENCE: ZoneRole = ZoneRole::London;

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::London => "London",
            Self::NewYork => "New York",
        }
    }
}

impl fmt::Display for ZoneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Market calendar an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    Uk,
    Us,
}

impl Session {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Uk => "UK session",
            Self::Us => "US session",
        }
    }
}

/// What the notifier should do when an event fires.
/// The scheduler never looks inside; it only hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    /// Attention cue played before anything else
    pub attention_sound: Option<PathBuf>,
    /// How many times to play the attention cue
    pub attention_repeat: u32,
    /// Event-specific announcement
    pub sound: Option<PathBuf>,
    /// Text to speak after the sounds
    pub speech: Option<String>,
}

impl NotificationDescriptor {
    /// Attention cue once, then the announcement file
    pub fn alert_then_sound(attention: impl Into<PathBuf>, sound: impl Into<PathBuf>) -> Self {
        Self {
            attention_sound: Some(attention.into()),
            attention_repeat: 1,
            sound: Some(sound.into()),
            speech: None,
        }
    }

    pub fn is_silent(&self) -> bool {
        (self.attention_sound.is_none() || self.attention_repeat == 0)
            && self.sound.is_none()
            && self.speech.is_none()
    }
}

/// A named market milestone that fires once per trading day at hh:mm:00
/// in its zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub key: String,
    pub session: Session,
    pub role: ZoneRole,
    pub hour: u32,
    pub minute: u32,
    pub label: String,
    pub notification: NotificationDescriptor,
}

impl AlertEvent {
    /// Events only fire on exact minute boundaries
    pub const TRIGGER_SECOND: u32 = 0;

    pub fn new(
        key: impl Into<String>,
        session: Session,
        role: ZoneRole,
        (hour, minute): (u32, u32),
        label: impl Into<String>,
        notification: NotificationDescriptor,
    ) -> Self {
        Self {
            key: key.into(),
            session,
            role,
            hour,
            minute,
            label: label.into(),
            notification,
        }
    }

    pub fn trigger(&self) -> (u32, u32, u32) {
        (self.hour, self.minute, Self::TRIGGER_SECOND)
    }

    /// `HH:MM` in the event's own zone
    pub fn trigger_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// File name of the attention cue shipped with the default sound set
pub const DEFAULT_ATTENTION_SOUND: &str = "alert_1.mp3";

/// An event that fired on a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredAlert {
    pub key: String,
    pub label: String,
    pub role: ZoneRole,
    /// Zone-local trigger time, `HH:MM`
    pub at: String,
}

impl From<&AlertEvent> for FiredAlert {
    fn from(event: &AlertEvent) -> Self {
        Self {
            key: event.key.clone(),
            label: event.label.clone(),
            role: event.role,
            at: event.trigger_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_second_is_zero() {
        let event = AlertEvent::new(
            "uk_0800",
            Session::Uk,
            ZoneRole::London,
            (8, 0),
            "London session start",
            NotificationDescriptor::alert_then_sound("a.mp3", "b.mp3"),
        );
        assert_eq!(event.trigger(), (8, 0, 0));
        assert_eq!(event.trigger_label(), "08:00");
    }

    #[test]
    fn test_silent_descriptor() {
        let descriptor = NotificationDescriptor::alert_then_sound("a.mp3", "b.mp3");
        assert!(!descriptor.is_silent());

        let muted = NotificationDescriptor {
            attention_sound: Some("a.mp3".into()),
            attention_repeat: 0,
            sound: None,
            speech: None,
        };
        assert!(muted.is_silent());
    }
}
