//! Wall clock sampling in named time zones.
//!
//! Offsets come from the bundled tz database, so DST transitions are handled
//! per zone without hardcoded offsets.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use super::error::{ClockError, ConfigError};

/// Civil time as observed in one zone, second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: Weekday,
}

impl CivilTime {
    pub fn from_zoned(dt: &DateTime<Tz>) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            weekday: dt.weekday(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn hms(&self) -> (u32, u32, u32) {
        (self.hour, self.minute, self.second)
    }

    /// `HH:MM:SS` for the clock face
    pub fn clock_string(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    /// Saturday and Sunday
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }
}

/// Supplies the current civil time in a zone. Every call re-reads the clock.
pub trait ClockSource {
    fn now_in(&self, zone: Tz) -> Result<CivilTime, ClockError>;

    /// Today's date on the host calendar
    fn local_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Host system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_in(&self, zone: Tz) -> Result<CivilTime, ClockError> {
        Ok(CivilTime::from_zoned(&Utc::now().with_timezone(&zone)))
    }
}

/// Clock pinned to a settable UTC instant, for tests.
/// The host zone defaults to UTC.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    host_zone: Tz,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            host_zone: Tz::UTC,
        }
    }

    /// Pretend the host runs in `zone`
    pub fn with_host_zone(mut self, zone: Tz) -> Self {
        self.host_zone = zone;
        self
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl ClockSource for ManualClock {
    fn now_in(&self, zone: Tz) -> Result<CivilTime, ClockError> {
        let now = self.now.lock().map_err(|_| ClockError {
            zone: zone.name().to_string(),
            reason: "manual clock poisoned".to_string(),
        })?;
        Ok(CivilTime::from_zoned(&now.with_timezone(&zone)))
    }

    fn local_date(&self) -> NaiveDate {
        match self.now.lock() {
            Ok(now) => now.with_timezone(&self.host_zone).date_naive(),
            Err(poisoned) => poisoned.into_inner().with_timezone(&self.host_zone).date_naive(),
        }
    }
}

/// Resolve an IANA identifier such as `Europe/London`
pub fn parse_zone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimeZone(name.to_string()))
}

/// Time to sleep so the next tick lands just after a whole second.
/// The small offset keeps the sample on the far side of the boundary.
pub fn until_next_second(now: DateTime<Utc>) -> Duration {
    const BOUNDARY_OFFSET_MS: u64 = 20;
    let millis_into_second = u64::from(now.timestamp_subsec_millis()).min(999);
    Duration::from_millis(1000 - millis_into_second + BOUNDARY_OFFSET_MS)
}
