use chrono::{DateTime, Days, Duration, Months, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub const ALL: [Recurrence; 4] = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::None => "None",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        *self != Recurrence::None
    }

    /// Occurrence `steps` units after `anchor`, computed on the wall clock of the
    /// anchor's timezone. Month steps clamp to the last day of shorter months.
    /// Returns `None` when the result is not representable.
    pub fn occurrence<Tz: TimeZone>(&self, anchor: &DateTime<Tz>, steps: u32) -> Option<DateTime<Tz>> {
        let local = anchor.naive_local();
        let shifted = match self {
            Recurrence::None => return (steps == 0).then(|| anchor.clone()),
            Recurrence::Daily => local.checked_add_days(Days::new(u64::from(steps)))?,
            Recurrence::Weekly => local.checked_add_days(Days::new(u64::from(steps) * 7))?,
            Recurrence::Monthly => local.checked_add_months(Months::new(steps))?,
        };
        resolve_local(&anchor.timezone(), shifted)
    }
}

// Ambiguous wall times take the earlier instant; times inside a DST gap move forward an hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        let after_gap = naive.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&after_gap).earliest()
    })
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurrence::ALL
            .iter()
            .copied()
            .find(|rule| rule.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown recurrence '{}'. Use none, daily, weekly or monthly.", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn zero_steps_is_the_anchor() {
        let anchor = utc(2025, 6, 22, 9);
        for rule in Recurrence::ALL {
            assert_eq!(rule.occurrence(&anchor, 0), Some(anchor));
        }
    }

    #[test]
    fn non_recurring_rule_has_no_later_occurrence() {
        assert_eq!(Recurrence::None.occurrence(&utc(2025, 6, 22, 9), 1), None);
    }

    #[test]
    fn daily_and_weekly_advance_by_calendar_days() {
        let anchor = utc(2025, 12, 30, 9);
        assert_eq!(Recurrence::Daily.occurrence(&anchor, 3), Some(utc(2026, 1, 2, 9)));
        assert_eq!(Recurrence::Weekly.occurrence(&anchor, 1), Some(utc(2026, 1, 6, 9)));
    }

    #[test]
    fn monthly_clamps_to_short_months_without_drifting() {
        let anchor = utc(2024, 1, 31, 18);
        assert_eq!(Recurrence::Monthly.occurrence(&anchor, 1), Some(utc(2024, 2, 29, 18)));
        assert_eq!(Recurrence::Monthly.occurrence(&anchor, 2), Some(utc(2024, 3, 31, 18)));
        assert_eq!(Recurrence::Monthly.occurrence(&anchor, 3), Some(utc(2024, 4, 30, 18)));
    }

    #[test]
    fn wall_time_in_spring_gap_moves_forward_an_hour() {
        use chrono_tz::Europe::Berlin;
        let anchor = Berlin.with_ymd_and_hms(2025, 3, 29, 2, 30, 0).unwrap();

        let next = Recurrence::Daily.occurrence(&anchor, 1).unwrap();

        assert_eq!(next, Berlin.with_ymd_and_hms(2025, 3, 30, 3, 30, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc), utc(2025, 3, 30, 1) + Duration::minutes(30));
    }

    #[test]
    fn ambiguous_wall_time_takes_the_earlier_instant() {
        use chrono_tz::Europe::Berlin;
        let anchor = Berlin.with_ymd_and_hms(2025, 10, 25, 2, 30, 0).unwrap();

        let next = Recurrence::Daily.occurrence(&anchor, 1).unwrap();

        // 02:30 happens twice on 2025-10-26; the CEST one is 00:30 UTC.
        assert_eq!(next.with_timezone(&Utc), utc(2025, 10, 26, 0) + Duration::minutes(30));
        assert_eq!(next.naive_local(), anchor.naive_local() + Duration::days(1));
    }

    #[test]
    fn overflow_yields_none() {
        let anchor = DateTime::<Utc>::MAX_UTC;
        assert_eq!(Recurrence::Daily.occurrence(&anchor, 1), None);
    }

    #[test]
    fn parses_labels() {
        assert_eq!("weekly".parse::<Recurrence>(), Ok(Recurrence::Weekly));
        assert!("yearly".parse::<Recurrence>().is_err());
    }
}
