use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use super::alerts::catalog::EventCatalog;
use super::alerts::engine::RoleZones;
use super::alerts::model::DEFAULT_ATTENTION_SOUND;
use super::clock::parse_zone;
use super::display::DisplayZone;
use super::error::ConfigError;

/// A clock row on the widget
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayZoneSettings {
    pub label: String,
    /// IANA identifier, e.g. `Europe/Sofia`
    pub zone: String,
}

impl DisplayZoneSettings {
    fn new(label: &str, zone: &str) -> Self {
        Self {
            label: label.to_string(),
            zone: zone.to_string(),
        }
    }
}

/// Per-event override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertRuleConfig {
    pub enabled: bool,
    /// Spoken after the event's sounds
    pub speech: Option<String>,
}

impl Default for AlertRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speech: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSettings {
    /// Overrides keyed by event key; events without an entry stay enabled
    #[serde(default)]
    pub rules: HashMap<String, AlertRuleConfig>,
}

impl AlertSettings {
    pub fn is_enabled(&self, key: &str) -> bool {
        self.rules.get(key).map(|c| c.enabled).unwrap_or(true)
    }
}

/// Application settings, persisted as settings.json
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub display_zones: Vec<DisplayZoneSettings>,
    pub london_zone: String,
    pub new_york_zone: String,
    pub sound_dir: PathBuf,
    pub attention_sound: String,
    pub attention_repeat: u32,
    /// Log alerts instead of playing them
    pub muted: bool,
    pub alert_settings: AlertSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_zones: vec![
                DisplayZoneSettings::new("Sofia", "Europe/Sofia"),
                DisplayZoneSettings::new("London", "Europe/London"),
                DisplayZoneSettings::new("Chicago", "America/Chicago"),
                DisplayZoneSettings::new("New York", "America/New_York"),
            ],
            london_zone: "Europe/London".to_string(),
            new_york_zone: "America/New_York".to_string(),
            sound_dir: PathBuf::from("audio"),
            attention_sound: DEFAULT_ATTENTION_SOUND.to_string(),
            attention_repeat: 1,
            muted: false,
            alert_settings: AlertSettings::default(),
        }
    }
}

/// Settings checked and turned into runtime values
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub zones: RoleZones,
    /// Absolute whenever the executable's directory is known
    pub sound_dir: PathBuf,
    pub display_zones: Vec<DisplayZone>,
    pub catalog: EventCatalog,
    pub muted: bool,
}

impl Settings {
    /// Validate every zone and override and build the event catalog.
    /// Anything wrong here is fatal at startup.
    pub fn resolve(&self) -> Result<ResolvedSettings, ConfigError> {
        let zones = RoleZones {
            london: parse_zone(&self.london_zone)?,
            new_york: parse_zone(&self.new_york_zone)?,
        };

        let display_zones = self
            .display_zones
            .iter()
            .map(|d| {
                Ok(DisplayZone {
                    label: d.label.clone(),
                    zone: parse_zone(&d.zone)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let exe_dir = executable_dir();
        if exe_dir.is_none() && self.sound_dir.is_relative() {
            warn!(
                "Executable directory unknown, sounds resolve from the working directory: {}",
                self.sound_dir.display()
            );
        }
        let sound_dir = anchor_sound_dir(&self.sound_dir, exe_dir.as_deref());

        let mut catalog = EventCatalog::market_sessions(&sound_dir, &self.attention_sound)?;

        for notification in catalog.notifications_mut() {
            notification.attention_repeat = self.attention_repeat;
        }
        for (key, rule) in &self.alert_settings.rules {
            let notification = catalog
                .notification_mut(key)
                .ok_or_else(|| ConfigError::UnknownEventOverride(key.clone()))?;
            if let Some(text) = &rule.speech {
                notification.speech = Some(text.clone());
            }
        }
        catalog.retain(|e| self.alert_settings.is_enabled(&e.key));

        Ok(ResolvedSettings {
            zones,
            sound_dir,
            display_zones,
            catalog,
            muted: self.muted,
        })
    }
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe().ok()?.parent().map(Path::to_path_buf)
}

/// A relative sound directory is taken from beside the executable
fn anchor_sound_dir(sound_dir: &Path, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) if sound_dir.is_relative() => base.join(sound_dir),
        _ => sound_dir.to_path_buf(),
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    /// Use an explicit settings file instead of `<dir>/settings.json`
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Defaults when the file does not exist; errors when it exists but
    /// cannot be read or parsed.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            warn!(
                "No settings at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Io {
            path: self.config_path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("market-clock"));

        let default = manager.load().unwrap();
        assert_eq!(default, Settings::default());

        let mut new_settings = Settings {
            sound_dir: PathBuf::from("/opt/sounds"),
            muted: true,
            ..Settings::default()
        };
        new_settings.alert_settings.rules.insert(
            "uk_0750".to_string(),
            AlertRuleConfig {
                enabled: false,
                speech: None,
            },
        );

        manager.save(&new_settings).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.sound_dir, PathBuf::from("/opt/sounds"));
        assert!(loaded.muted);
        assert!(!loaded.alert_settings.is_enabled("uk_0750"));
        assert!(loaded.alert_settings.is_enabled("uk_0800"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{ "muted": true }"#).unwrap();

        let settings = ConfigManager::with_file(&path).load().unwrap();
        assert!(settings.muted);
        assert_eq!(settings.london_zone, "Europe/London");
        assert_eq!(settings.display_zones.len(), 4);
    }

    #[test]
    fn test_speech_only_override_stays_enabled() {
        let rule: AlertRuleConfig = serde_json::from_str(r#"{ "speech": "London open" }"#).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.speech.as_deref(), Some("London open"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result = ConfigManager::with_file(&path).load();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = Settings::default().resolve().unwrap();
        assert_eq!(resolved.zones, RoleZones::default());
        assert_eq!(resolved.display_zones.len(), 4);
        assert_eq!(resolved.catalog.len(), 8);
        assert!(!resolved.muted);
    }

    #[test]
    fn test_resolve_unknown_zone_fails() {
        let settings = Settings {
            new_york_zone: "America/Gotham".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.resolve(),
            Err(ConfigError::UnknownTimeZone(z)) if z == "America/Gotham"
        ));

        let mut settings = Settings::default();
        settings.display_zones.push(DisplayZoneSettings::new("Nowhere", "Nowhere/Town"));
        assert!(matches!(settings.resolve(), Err(ConfigError::UnknownTimeZone(_))));
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let mut settings = Settings {
            attention_repeat: 3,
            ..Settings::default()
        };
        settings.alert_settings.rules.insert(
            "ny_1600".to_string(),
            AlertRuleConfig {
                enabled: true,
                speech: Some("New York is closed".to_string()),
            },
        );
        settings.alert_settings.rules.insert(
            "uk_0750".to_string(),
            AlertRuleConfig {
                enabled: false,
                speech: None,
            },
        );

        let resolved = settings.resolve().unwrap();
        assert_eq!(resolved.catalog.len(), 7);
        assert!(resolved.catalog.get("uk_0750").is_none());

        let close = resolved.catalog.get("ny_1600").unwrap();
        assert_eq!(close.notification.speech.as_deref(), Some("New York is closed"));
        assert!(resolved.catalog.events().iter().all(|e| e.notification.attention_repeat == 3));
    }

    #[test]
    fn test_resolve_unknown_override_fails() {
        let mut settings = Settings::default();
        settings
            .alert_settings
            .rules
            .insert("tokyo_0900".to_string(), AlertRuleConfig::default());
        assert!(matches!(
            settings.resolve(),
            Err(ConfigError::UnknownEventOverride(k)) if k == "tokyo_0900"
        ));
    }

    #[test]
    fn test_relative_sound_dir_is_anchored_to_executable() {
        let resolved = Settings::default().resolve().unwrap();
        assert!(resolved.sound_dir.is_absolute());
        assert!(resolved.sound_dir.ends_with("audio"));

        let open = resolved.catalog.get("uk_0800").unwrap();
        let cue = open.notification.attention_sound.as_ref().unwrap();
        assert!(cue.is_absolute());
        assert_eq!(cue, &resolved.sound_dir.join(DEFAULT_ATTENTION_SOUND));
    }

    #[test]
    fn test_anchor_sound_dir() {
        let base = Path::new("/opt/market-clock");
        assert_eq!(
            anchor_sound_dir(Path::new("audio"), Some(base)),
            base.join("audio")
        );
        assert_eq!(anchor_sound_dir(Path::new("audio"), None), PathBuf::from("audio"));

        let absolute = tempfile::tempdir().unwrap();
        assert_eq!(
            anchor_sound_dir(absolute.path(), Some(base)),
            absolute.path().to_path_buf()
        );
    }
}
