use chrono::{Datelike, Days, NaiveDate, TimeZone, Weekday};
use std::collections::BTreeMap;

use crate::calendar::{Appointment, Category};

/// Category and title search as chosen by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl AppointmentFilter {
    pub fn category(category: Category) -> Self {
        Self { category: Some(category), search: None }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self { category: None, search: Some(text.into()) }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        let category_ok = self.category.is_none_or(|category| appointment.category == category);
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(text) => appointment.title.to_lowercase().contains(&text.to_lowercase()),
        };
        category_ok && search_ok
    }

    pub fn apply<'a>(&self, appointments: &'a [Appointment]) -> Vec<&'a Appointment> {
        appointments.iter().filter(|a| self.matches(a)).collect()
    }
}

fn local_day<Tz: TimeZone>(appointment: &Appointment, tz: &Tz) -> NaiveDate {
    appointment.date.with_timezone(tz).date_naive()
}

fn sorted(mut appointments: Vec<&Appointment>) -> Vec<&Appointment> {
    appointments.sort_by_key(|a| a.date);
    appointments
}

pub fn on_day<'a, Tz: TimeZone>(
    appointments: impl IntoIterator<Item = &'a Appointment>,
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Appointment> {
    sorted(appointments.into_iter().filter(|a| local_day(a, tz) == day).collect())
}

pub fn week_start(day: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + day.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    day - Days::new(u64::from(back))
}

/// Appointments in the seven days starting at the `first_day` on or before `day`.
pub fn in_week<'a, Tz: TimeZone>(
    appointments: impl IntoIterator<Item = &'a Appointment>,
    day: NaiveDate,
    first_day: Weekday,
    tz: &Tz,
) -> Vec<&'a Appointment> {
    let start = week_start(day, first_day);
    let end = start + Days::new(7);
    sorted(
        appointments
            .into_iter()
            .filter(|a| {
                let local = local_day(a, tz);
                local >= start && local < end
            })
            .collect(),
    )
}

/// Days of the month that have appointments, for month-grid rendering.
pub fn month_buckets<'a, Tz: TimeZone>(
    appointments: impl IntoIterator<Item = &'a Appointment>,
    year: i32,
    month: u32,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<&'a Appointment>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&'a Appointment>> = BTreeMap::new();
    for appointment in appointments {
        let local = local_day(appointment, tz);
        if local.year() == year && local.month() == month {
            buckets.entry(local).or_default().push(appointment);
        }
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by_key(|a| a.date);
    }
    buckets
}
