// Trigger matching for session events.
//
// A tick samples each zone role once; events are matched against that
// snapshot by exact (hour, minute, second) equality.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{AlertEvent, ZoneRole};
use crate::core::clock::CivilTime;
use crate::core::error::ClockError;

/// Civil times sampled for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSnapshot {
    reference_date: NaiveDate,
    times: BTreeMap<ZoneRole, CivilTime>,
    /// Roles whose clock read failed this tick
    missing: Vec<ZoneRole>,
}

impl ZoneSnapshot {
    /// Start a snapshot from the reference role's sample
    pub fn new(reference: CivilTime) -> Result<Self, ClockError> {
        let reference_date = reference.date().ok_or_else(|| ClockError {
            zone: ZoneRole::REFERENCE.to_string(),
            reason: format!(
                "invalid calendar date {}-{:02}-{:02}",
                reference.year, reference.month, reference.day
            ),
        })?;
        let mut times = BTreeMap::new();
        times.insert(ZoneRole::REFERENCE, reference);
        Ok(Self {
            reference_date,
            times,
            missing: Vec::new(),
        })
    }

    pub fn with(mut self, role: ZoneRole, time: CivilTime) -> Self {
        self.insert(role, time);
        self
    }

    pub fn insert(&mut self, role: ZoneRole, time: CivilTime) {
        if role != ZoneRole::REFERENCE {
            self.times.insert(role, time);
        }
    }

    pub fn mark_missing(&mut self, role: ZoneRole) {
        if role != ZoneRole::REFERENCE && !self.missing.contains(&role) {
            self.missing.push(role);
        }
    }

    pub fn reference(&self) -> &CivilTime {
        &self.times[&ZoneRole::REFERENCE]
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn get(&self, role: ZoneRole) -> Option<&CivilTime> {
        self.times.get(&role)
    }

    pub fn missing(&self) -> &[ZoneRole] {
        &self.missing
    }

    /// Trading days are Monday to Friday in the reference calendar
    pub fn is_trading_day(&self) -> bool {
        !self.reference().is_weekend()
    }
}

/// Whether `event` is due at this exact second.
/// Returns false when the event's zone was not sampled.
pub fn evaluate_trigger(event: &AlertEvent, snapshot: &ZoneSnapshot) -> bool {
    snapshot
        .get(event.role)
        .map(|now| now.hms() == event.trigger())
        .unwrap_or(false)
}
