use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::{info, warn};

use crate::core::{
    clock::{until_next_second, SystemClock},
    config::{ConfigManager, ResolvedSettings},
    coordinator::Coordinator,
    notifier::{AudioNotifier, LogNotifier, Notifier},
};

#[derive(Parser)]
#[command(
    name = "market-clock",
    about = "World clock with London and New York market session alerts",
    version
)]
struct Cli {
    /// Settings file (default: <config dir>/market-clock/settings.json)
    #[arg(long, env = "MARKET_CLOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Play every alert once, in catalog order, then exit
    #[arg(long)]
    test_alerts: bool,

    /// Run a single tick, print the clock face and exit. Alerts are logged, not played.
    #[arg(long)]
    once: bool,

    /// Log alerts instead of playing them
    #[arg(long)]
    mute: bool,
}

fn config_manager(cli: &Cli) -> ConfigManager {
    match &cli.config {
        Some(path) => ConfigManager::with_file(path),
        None => {
            let dir = dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("market-clock");
            ConfigManager::new(dir)
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Initialize Config
    let manager = config_manager(&cli);
    let settings = manager
        .load()
        .with_context(|| format!("Failed to load settings from {}", manager.path().display()))?;
    let resolved = settings.resolve().context("Invalid settings")?;
    let muted = resolved.muted || cli.mute;

    info!(
        "Loaded {} alerts, sounds from {}",
        resolved.catalog.len(),
        resolved.sound_dir.display()
    );

    if cli.test_alerts {
        return test_alerts(&resolved, muted).await;
    }

    let notifier: Box<dyn Notifier> = if plays_audio(muted, cli.once) {
        Box::new(AudioNotifier::new())
    } else {
        Box::new(LogNotifier)
    };
    let mut coordinator = Coordinator::new(resolved, SystemClock, notifier);

    if cli.once {
        let output = coordinator.tick();
        println!("{}", output.clock_face.render());
        return Ok(());
    }

    run_loop(&mut coordinator).await;
    Ok(())
}

/// A single `--once` tick exits before detached playback could finish
fn plays_audio(muted: bool, once: bool) -> bool {
    !muted && !once
}

/// One tick per wall-clock second until Ctrl-C. Each tick completes before
/// the next sleep starts, so ticks never overlap.
async fn run_loop(coordinator: &mut Coordinator<SystemClock>) {
    info!("Alert scheduler started");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_minute = None;
    loop {
        let output = coordinator.tick();

        // Clock face once a minute
        let minute = Utc::now().timestamp().div_euclid(60);
        if last_minute != Some(minute) {
            last_minute = Some(minute);
            info!("\n{}", output.clock_face.render());
        }

        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutting down");
                break;
            }
            _ = tokio::time::sleep(until_next_second(Utc::now())) => {}
        }
    }
}

/// Play each notification to completion, one second apart
async fn test_alerts(resolved: &ResolvedSettings, muted: bool) -> anyhow::Result<()> {
    let events = resolved.catalog.events();
    for (i, event) in events.iter().enumerate() {
        info!(
            "[{}/{}] {} {} - {}",
            i + 1,
            events.len(),
            event.session.display_name(),
            event.trigger_label(),
            event.label
        );

        if muted {
            LogNotifier.notify(&event.notification);
        } else {
            let descriptor = event.notification.clone();
            let played = tokio::task::spawn_blocking(move || AudioNotifier::play(&descriptor))
                .await
                .context("Playback task panicked")?;
            if let Err(e) = played {
                warn!("{}: {}", event.key, e);
            }
        }

        if i + 1 < events.len() {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
    info!("All alerts tested");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tick_never_plays_audio() {
        assert!(plays_audio(false, false));
        assert!(!plays_audio(false, true));
        assert!(!plays_audio(true, false));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["market-clock", "--once", "--config", "/tmp/clock.json"]);
        assert!(cli.once);
        assert!(!cli.test_alerts);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/clock.json")));
    }
}
