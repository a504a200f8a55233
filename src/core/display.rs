//! Read-only clock face: one `HH:MM:SS` row per configured zone plus the
//! title date. Not part of the scheduling state.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use super::clock::ClockSource;

/// A labelled zone shown on the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayZone {
    pub label: String,
    pub zone: Tz,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockRow {
    pub label: String,
    /// `HH:MM:SS`, or `--:--:--` when the zone could not be read
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockFace {
    pub title: String,
    pub rows: Vec<ClockRow>,
}

impl ClockFace {
    pub const PLACEHOLDER: &'static str = "--:--:--";

    /// Sample every display zone. `today` supplies the title date.
    pub fn sample(clock: &impl ClockSource, zones: &[DisplayZone], today: NaiveDate) -> Self {
        let rows = zones
            .iter()
            .map(|z| ClockRow {
                label: z.label.clone(),
                time: clock
                    .now_in(z.zone)
                    .map(|now| now.clock_string())
                    .unwrap_or_else(|_| Self::PLACEHOLDER.to_string()),
            })
            .collect();
        Self {
            title: format_title_date(today),
            rows,
        }
    }

    /// Fixed-width text rendering, label left and time right
    pub fn render(&self) -> String {
        let mut out = self.title.clone();
        for row in &self.rows {
            out.push('\n');
            out.push_str(&format!("{:<12}{:>10}", row.label, row.time));
        }
        out
    }
}

/// `1st`, `2nd`, `3rd`, `11th`..`13th`, `21st`
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Title date such as `Mon 15th April`; long month names are abbreviated
pub fn format_title_date(date: NaiveDate) -> String {
    let month = match date.month() {
        1 => "Jan",
        2 => "Feb",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    };
    format!(
        "{} {}{} {}",
        date.format("%a"),
        date.day(),
        ordinal_suffix(date.day()),
        month
    )
}
