use log::warn;

use super::alerts::engine::{AlertScheduler, TickReport};
use super::clock::ClockSource;
use super::config::ResolvedSettings;
use super::display::{ClockFace, DisplayZone};
use super::notifier::Notifier;

pub struct CoordinatorOutput {
    pub clock_face: ClockFace,
    /// None when the reference clock could not be read this tick
    pub report: Option<TickReport>,
}

/// Ties the alert scheduler, the notifier and the clock face together.
/// One `tick` per second from the app loop.
pub struct Coordinator<C: ClockSource> {
    scheduler: AlertScheduler<C>,
    notifier: Box<dyn Notifier>,
    display_zones: Vec<DisplayZone>,
}

impl<C: ClockSource> Coordinator<C> {
    pub fn new(settings: ResolvedSettings, clock: C, notifier: Box<dyn Notifier>) -> Self {
        Self {
            scheduler: AlertScheduler::new(settings.catalog, settings.zones, clock),
            notifier,
            display_zones: settings.display_zones,
        }
    }

    pub fn scheduler(&self) -> &AlertScheduler<C> {
        &self.scheduler
    }

    pub fn tick(&mut self) -> CoordinatorOutput {
        // 1. Alerts. A failed read is retried on the next tick.
        let report = match self.scheduler.tick(self.notifier.as_ref()) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Alert check skipped: {}", e);
                None
            }
        };

        // 2. Clock face, dated by the host calendar
        let today = self.scheduler.clock().local_date();
        let clock_face = ClockFace::sample(self.scheduler.clock(), &self.display_zones, today);

        CoordinatorOutput { clock_face, report }
    }
}
