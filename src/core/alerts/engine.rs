// Alert scheduler - samples zone clocks each tick and fires due events once per day.

use chrono::NaiveDate;
use chrono_tz::Tz;
use log::{debug, info, warn};

use super::catalog::EventCatalog;
use super::model::{FiredAlert, ZoneRole};
use super::triggers::{evaluate_trigger, ZoneSnapshot};
use crate::core::clock::ClockSource;
use crate::core::error::ClockError;
use crate::core::notifier::Notifier;
use crate::core::state::DailyFireState;

/// Time zone bound to each role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleZones {
    pub london: Tz,
    pub new_york: Tz,
}

impl RoleZones {
    pub fn get(&self, role: ZoneRole) -> Tz {
        match role {
            ZoneRole::London => self.london,
            ZoneRole::NewYork => self.new_york,
        }
    }
}

impl Default for RoleZones {
    fn default() -> Self {
        Self {
            london: chrono_tz::Europe::London,
            new_york: chrono_tz::America::New_York,
        }
    }
}

/// What happened on one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub reference_date: NaiveDate,
    /// Fire state was cleared for a new reference day
    pub reset: bool,
    /// Weekend in the reference calendar, matching skipped
    pub weekend: bool,
    /// Fired events in catalog order
    pub fired: Vec<FiredAlert>,
    /// Roles whose clock could not be read this tick
    pub skipped_roles: Vec<ZoneRole>,
}

/// Apply one snapshot to the fire state. Pure apart from `state`.
///
/// Resets on a new reference date, skips weekends, then admits each due event
/// through [`DailyFireState::mark_fired`] in catalog order.
pub fn evaluate(
    catalog: &EventCatalog,
    state: &mut DailyFireState,
    snapshot: &ZoneSnapshot,
) -> TickReport {
    let reference_date = snapshot.reference_date();
    let reset = state.reset_if_new_day(reference_date);

    let mut report = TickReport {
        reference_date,
        reset,
        weekend: !snapshot.is_trading_day(),
        fired: Vec::new(),
        skipped_roles: snapshot.missing().to_vec(),
    };

    if report.weekend {
        return report;
    }

    for event in catalog.events() {
        if evaluate_trigger(event, snapshot) && state.mark_fired(&event.key) {
            report.fired.push(FiredAlert::from(event));
        }
    }

    report
}

/// Owns the catalog, the fire state and the clock. Driven once per second by
/// a single loop, so ticks never overlap.
pub struct AlertScheduler<C: ClockSource> {
    catalog: EventCatalog,
    zones: RoleZones,
    clock: C,
    state: DailyFireState,
    roles: Vec<ZoneRole>,
}

impl<C: ClockSource> AlertScheduler<C> {
    pub fn new(catalog: EventCatalog, zones: RoleZones, clock: C) -> Self {
        let state = DailyFireState::new(catalog.keys());
        let roles = catalog.roles();
        Self {
            catalog,
            zones,
            clock,
            state,
            roles,
        }
    }

    pub fn state(&self) -> &DailyFireState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Read every role's clock. A reference failure aborts the snapshot;
    /// other failures only mark that role missing.
    pub fn sample(&self) -> Result<ZoneSnapshot, ClockError> {
        let reference = self.clock.now_in(self.zones.get(ZoneRole::REFERENCE))?;
        let mut snapshot = ZoneSnapshot::new(reference)?;

        for role in self.roles.iter().filter(|r| **r != ZoneRole::REFERENCE) {
            match self.clock.now_in(self.zones.get(*role)) {
                Ok(now) => snapshot.insert(*role, now),
                Err(e) => {
                    warn!("Skipping {} alerts this tick: {}", role, e);
                    snapshot.mark_missing(*role);
                }
            }
        }
        Ok(snapshot)
    }

    /// Sample, evaluate and dispatch. On a reference clock failure the fire
    /// state is left untouched.
    pub fn tick(&mut self, notifier: &dyn Notifier) -> Result<TickReport, ClockError> {
        let snapshot = self.sample()?;
        let report = evaluate(&self.catalog, &mut self.state, &snapshot);

        if report.reset {
            info!("Alert flags reset for {}", report.reference_date);
        }
        if report.weekend {
            debug!("Weekend in reference calendar, no alerts");
        }

        for fired in &report.fired {
            info!("Alert: {} ({} {})", fired.label, fired.at, fired.role);
            if let Some(event) = self.catalog.get(&fired.key) {
                notifier.notify(&event.notification);
            }
        }

        Ok(report)
    }
}
