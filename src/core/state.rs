use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Per-event "already fired today" flags for one reference calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyFireState {
    baseline: Option<NaiveDate>,
    fired: BTreeMap<String, bool>,
}

impl DailyFireState {
    /// Start with every given key unfired and no baseline date
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            baseline: None,
            fired: keys.into_iter().map(|k| (k.into(), false)).collect(),
        }
    }

    /// Clear all flags when `reference_date` differs from the stored baseline.
    /// Returns true if a reset happened.
    pub fn reset_if_new_day(&mut self, reference_date: NaiveDate) -> bool {
        if self.baseline == Some(reference_date) {
            return false;
        }
        for flag in self.fired.values_mut() {
            *flag = false;
        }
        self.baseline = Some(reference_date);
        true
    }

    /// Check-and-set. True only the first time for `key` since the last reset.
    pub fn mark_fired(&mut self, key: &str) -> bool {
        match self.fired.get_mut(key) {
            Some(true) => false,
            Some(flag) => {
                *flag = true;
                true
            }
            None => {
                self.fired.insert(key.to_string(), true);
                true
            }
        }
    }

    pub fn is_fired(&self, key: &str) -> bool {
        self.fired.get(key).copied().unwrap_or(false)
    }

    pub fn baseline(&self) -> Option<NaiveDate> {
        self.baseline
    }

    pub fn fired_keys(&self) -> impl Iterator<Item = &str> {
        self.fired
            .iter()
            .filter(|(_, fired)| **fired)
            .map(|(key, _)| key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_fired_is_at_most_once() {
        let mut state = DailyFireState::new(["uk_0800"]);
        state.reset_if_new_day(date(2025, 1, 6));

        assert!(state.mark_fired("uk_0800"));
        for _ in 0..5 {
            assert!(!state.mark_fired("uk_0800"));
        }
        assert!(state.is_fired("uk_0800"));
    }

    #[test]
    fn test_reset_on_new_day_clears_every_flag() {
        let mut state = DailyFireState::new(["uk_0750", "uk_0800", "ny_0930"]);
        assert!(state.reset_if_new_day(date(2025, 1, 6)));
        state.mark_fired("uk_0750");
        state.mark_fired("ny_0930");

        assert!(state.reset_if_new_day(date(2025, 1, 7)));
        assert_eq!(state.baseline(), Some(date(2025, 1, 7)));
        assert_eq!(state.fired_keys().count(), 0);
        assert!(!state.is_fired("uk_0750"));
        assert!(state.mark_fired("uk_0750"));
    }

    #[test]
    fn test_reset_same_day_is_noop() {
        let mut state = DailyFireState::new(["uk_0800"]);
        state.reset_if_new_day(date(2025, 1, 6));
        state.mark_fired("uk_0800");

        assert!(!state.reset_if_new_day(date(2025, 1, 6)));
        assert!(state.is_fired("uk_0800"));
    }

    #[test]
    fn test_first_call_sets_baseline() {
        let mut state = DailyFireState::new(Vec::<String>::new());
        assert_eq!(state.baseline(), None);
        assert!(state.reset_if_new_day(date(2025, 1, 6)));
        assert_eq!(state.baseline(), Some(date(2025, 1, 6)));
    }

    #[test]
    fn test_unknown_key_is_tracked() {
        let mut state = DailyFireState::default();
        assert!(state.mark_fired("extra"));
        assert!(!state.mark_fired("extra"));
    }
}
