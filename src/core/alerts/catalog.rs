// Static table of session events, validated once at construction.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::model::{AlertEvent, NotificationDescriptor, Session, ZoneRole};
use crate::core::error::ConfigError;

/// Built-in events: (key, session, role, (hour, minute), label, announcement file)
#[rustfmt::skip]
const SESSION_EVENTS: &[(&str, Session, ZoneRole, (u32, u32), &str, &str)] = &[
    ("uk_0750", Session::Uk, ZoneRole::London, (7, 50), "UK premarket auction", "uk_premarket_auctoin.mp3"),
    ("uk_0800", Session::Uk, ZoneRole::London, (8, 0), "London session start", "london_start.mp3"),
    ("uk_1600", Session::Uk, ZoneRole::London, (16, 0), "30 minutes to London close", "30min_to_L_close.mp3"),
    ("uk_1630", Session::Uk, ZoneRole::London, (16, 30), "London close", "Lonodn_close.mp3"),
    ("ny_0900", Session::Us, ZoneRole::NewYork, (9, 0), "30 minutes to New York open", "30mintostartNY.mp3"),
    ("ny_0930", Session::Us, ZoneRole::NewYork, (9, 30), "New York session start", "NY_start.mp3"),
    ("ny_1530", Session::Us, ZoneRole::NewYork, (15, 30), "30 minutes to New York close", "30min_to_close_NY.mp3"),
    ("ny_1600", Session::Us, ZoneRole::NewYork, (16, 0), "New York close", "NY_close.mp3"),
];

/// Read-only, ordered set of alert events.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    events: Vec<AlertEvent>,
}

impl EventCatalog {
    /// Validate and wrap a list of events. Order is kept as given.
    pub fn new(events: Vec<AlertEvent>) -> Result<Self, ConfigError> {
        validate(&events)?;
        Ok(Self { events })
    }

    /// The UK and US session events, sounds resolved under `sound_dir`
    pub fn market_sessions(sound_dir: &Path, attention_sound: &str) -> Result<Self, ConfigError> {
        let attention = sound_dir.join(attention_sound);
        let events = SESSION_EVENTS
            .iter()
            .map(|&(key, session, role, time, label, file)| {
                let notification = NotificationDescriptor::alert_then_sound(
                    attention.clone(),
                    sound_dir.join(file),
                );
                AlertEvent::new(key, session, role, time, label, notification)
            })
            .collect();
        Self::new(events)
    }

    pub fn events(&self) -> &[AlertEvent] {
        &self.events
    }

    pub fn get(&self, key: &str) -> Option<&AlertEvent> {
        self.events.iter().find(|e| e.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.key.as_str())
    }

    /// Distinct roles the catalog needs sampled, reference role always first
    pub fn roles(&self) -> Vec<ZoneRole> {
        let mut roles = vec![ZoneRole::REFERENCE];
        for event in &self.events {
            if !roles.contains(&event.role) {
                roles.push(event.role);
            }
        }
        roles
    }

    /// Keep only events accepted by `keep`, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&AlertEvent) -> bool) {
        self.events.retain(|e| keep(e));
    }

    /// Notification of one event, for settings overrides. Triggers stay fixed.
    pub(crate) fn notification_mut(&mut self, key: &str) -> Option<&mut NotificationDescriptor> {
        self.events
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.notification)
    }

    pub(crate) fn notifications_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut NotificationDescriptor> {
        self.events.iter_mut().map(|e| &mut e.notification)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Keys unique, (role, hour, minute) unique, times in range
fn validate(events: &[AlertEvent]) -> Result<(), ConfigError> {
    let mut keys = HashSet::new();
    let mut triggers: HashMap<(ZoneRole, u32, u32), &str> = HashMap::new();

    for event in events {
        if event.hour > 23 || event.minute > 59 {
            return Err(ConfigError::InvalidTrigger {
                key: event.key.clone(),
                hour: event.hour,
                minute: event.minute,
            });
        }
        if !keys.insert(event.key.as_str()) {
            return Err(ConfigError::DuplicateEventKey(event.key.clone()));
        }
        if let Some(first) = triggers.insert((event.role, event.hour, event.minute), &event.key) {
            return Err(ConfigError::DuplicateTrigger {
                first: first.to_string(),
                second: event.key.clone(),
                role: event.role,
                hour: event.hour,
                minute: event.minute,
            });
        }
    }
    Ok(())
}
