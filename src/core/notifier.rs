//! Fire-and-forget alert playback.
//!
//! The scheduler hands a [`NotificationDescriptor`] to a [`Notifier`] and moves
//! on. Playback runs on its own worker thread and failures are only logged.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Command;

use log::{debug, info, warn};

use super::alerts::model::NotificationDescriptor;
use super::error::NotificationError;

/// Something that can announce an alert. Must return without waiting for
/// playback to finish.
pub trait Notifier: Send + Sync {
    fn notify(&self, descriptor: &NotificationDescriptor);
}

/// Plays sounds through the default audio device and speaks text through the
/// platform speech synthesizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioNotifier;

impl AudioNotifier {
    pub fn new() -> Self {
        Self
    }

    /// Blocking playback of one descriptor
    pub fn play(descriptor: &NotificationDescriptor) -> Result<(), NotificationError> {
        let has_sound = descriptor.sound.is_some()
            || (descriptor.attention_sound.is_some() && descriptor.attention_repeat > 0);

        if has_sound {
            let mut stream = rodio::OutputStreamBuilder::open_default_stream()?;
            stream.log_on_drop(false);
            let sink = rodio::Sink::connect_new(stream.mixer());

            if let Some(attention) = &descriptor.attention_sound {
                for _ in 0..descriptor.attention_repeat {
                    match open_sound(attention) {
                        Ok(cue) => sink.append(cue),
                        Err(e) => {
                            warn!("Skipping attention cue: {}", e);
                            break;
                        }
                    }
                }
            }
            if let Some(sound) = &descriptor.sound {
                sink.append(open_sound(sound)?);
            }
            sink.sleep_until_end();
        }

        if let Some(text) = &descriptor.speech {
            speak(text)?;
        }
        Ok(())
    }
}

impl Notifier for AudioNotifier {
    fn notify(&self, descriptor: &NotificationDescriptor) {
        if descriptor.is_silent() {
            debug!("Nothing to play");
            return;
        }
        let descriptor = descriptor.clone();
        let spawned = std::thread::Builder::new()
            .name("alert-playback".to_string())
            .spawn(move || {
                if let Err(e) = Self::play(&descriptor) {
                    warn!("Alert playback failed: {}", e);
                }
            });
        if let Err(e) = spawned {
            warn!("Failed to start alert playback thread: {}", e);
        }
    }
}

/// Only logs. Used when sound is muted in settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, descriptor: &NotificationDescriptor) {
        let sound = descriptor
            .sound
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        info!(
            "[muted] alert sound={} speech={}",
            sound,
            descriptor.speech.as_deref().unwrap_or("-")
        );
    }
}

fn open_sound(path: &Path) -> Result<rodio::Decoder<BufReader<File>>, NotificationError> {
    if !path.exists() {
        return Err(NotificationError::MissingResource(path.to_path_buf()));
    }
    let file = File::open(path)?;
    rodio::Decoder::new(BufReader::new(file)).map_err(|source| NotificationError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Environment variable carrying the text, so it is never spliced into a
/// shell script.
const SPEECH_ENV: &str = "MARKET_CLOCK_SPEECH";

fn speak(text: &str) -> Result<(), NotificationError> {
    let mut cmd = speech_command()?;
    cmd.env(SPEECH_ENV, text);
    if !cfg!(windows) {
        cmd.arg(text);
    }
    debug!("Speaking: {}", text);

    let status = cmd.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(NotificationError::Speech(format!("synthesizer exited with {}", status)))
    }
}

fn speech_command() -> Result<Command, NotificationError> {
    if cfg!(windows) {
        // Female voice when one is installed
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
             try {{ $s.SelectVoiceByHints('Female') }} catch {{}}; \
             $s.Speak($env:{})",
            SPEECH_ENV
        );
        let shell = which::which("powershell").map_err(|_| NotificationError::NoSynthesizer)?;
        let mut cmd = Command::new(shell);
        cmd.args(["-NoProfile", "-NonInteractive", "-Command", script.as_str()]);
        return Ok(cmd);
    }

    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &["say"]
    } else {
        &["espeak-ng", "espeak", "spd-say"]
    };
    candidates
        .iter()
        .find_map(|name| which::which(name).ok())
        .map(Command::new)
        .ok_or(NotificationError::NoSynthesizer)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every descriptor it receives
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub received: Mutex<Vec<NotificationDescriptor>>,
    }

    impl RecordingNotifier {
        pub fn count(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, descriptor: &NotificationDescriptor) {
            self.received.lock().unwrap().push(descriptor.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_sound_file_is_reported() {
        let missing = Path::new("/definitely/not/here/alert_1.mp3");
        let err = open_sound(missing).err().unwrap();
        assert!(matches!(err, NotificationError::MissingResource(p) if p == missing));
    }

    #[test]
    fn test_silent_descriptor_plays_nothing() {
        let descriptor = NotificationDescriptor {
            attention_sound: None,
            attention_repeat: 0,
            sound: None,
            speech: None,
        };
        assert!(AudioNotifier::play(&descriptor).is_ok());
    }

    #[test]
    fn test_missing_attention_cue_does_not_stop_the_announcement() {
        // The cue is skipped; the missing announcement is what gets reported
        let descriptor = NotificationDescriptor::alert_then_sound(
            "/definitely/not/here/alert_1.mp3",
            "/definitely/not/here/london_start.mp3",
        );
        match AudioNotifier::play(&descriptor) {
            Err(NotificationError::MissingResource(p)) => {
                assert_eq!(p, PathBuf::from("/definitely/not/here/london_start.mp3"));
            }
            // No audio device on this host; playback never reached the files
            Err(NotificationError::Output(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_log_notifier_does_not_panic() {
        LogNotifier.notify(&NotificationDescriptor::alert_then_sound("a.mp3", "b.mp3"));
    }
}
