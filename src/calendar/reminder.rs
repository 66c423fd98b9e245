use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// How long before an appointment an alert fires, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderOffset(u64);

impl ReminderOffset {
    pub const PRESETS: [ReminderOffset; 4] = [
        ReminderOffset(5 * MINUTE),
        ReminderOffset(15 * MINUTE),
        ReminderOffset(HOUR),
        ReminderOffset(DAY),
    ];

    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn from_minutes(minutes: u64) -> Self {
        Self(minutes * MINUTE)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// `None` when the offset does not fit a `chrono::Duration`.
    pub fn as_duration(&self) -> Option<Duration> {
        i64::try_from(self.0).ok().and_then(Duration::try_seconds)
    }

    pub fn label(&self) -> String {
        let secs = self.0;
        if secs >= DAY {
            format!("{} day(s) before", secs / DAY)
        } else if secs >= HOUR {
            format!("{} hour(s) before", secs / HOUR)
        } else if secs >= MINUTE {
            format!("{} minute(s) before", secs / MINUTE)
        } else {
            format!("{} second(s) before", secs)
        }
    }
}

impl fmt::Display for ReminderOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_cover_five_minutes_to_one_day() {
        let secs: Vec<u64> = ReminderOffset::PRESETS.iter().map(|o| o.as_secs()).collect();
        assert_eq!(secs, vec![300, 900, 3600, 86400]);
    }

    #[test]
    fn label_uses_largest_whole_unit() {
        assert_eq!(ReminderOffset::from_secs(86400 * 2).label(), "2 day(s) before");
        assert_eq!(ReminderOffset::from_secs(5400).label(), "1 hour(s) before");
        assert_eq!(ReminderOffset::from_minutes(15).label(), "15 minute(s) before");
        assert_eq!(ReminderOffset::from_secs(42).label(), "42 second(s) before");
    }

    #[test]
    fn converts_to_duration() {
        assert_eq!(ReminderOffset::from_secs(300).as_duration(), Some(Duration::minutes(5)));
        assert_eq!(ReminderOffset::from_secs(u64::MAX).as_duration(), None);
    }

    #[test]
    fn serializes_as_plain_seconds() {
        assert_eq!(serde_json::to_string(&ReminderOffset::from_secs(900)).unwrap(), "900");
    }
}
