use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc, Weekday};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::projection::{self, ProjectionError};
use super::reminders::{Notifier, ReminderScheduler};
use super::views::{self, AppointmentFilter};
use crate::calendar::{Appointment, AppointmentDraft};
use crate::storage::Store;

/// Owns the appointment collection. Every mutation updates memory first, then the store,
/// then the notifier; store and notifier failures are logged and never undo the change.
pub struct Planner<S, N, Tz: TimeZone = Local> {
    appointments: Vec<Appointment>,
    store: S,
    reminders: ReminderScheduler<N>,
    clock: Box<dyn Clock>,
    timezone: Tz,
}

impl<S: Store, N: Notifier> Planner<S, N, Local> {
    pub fn new(store: S, reminders: ReminderScheduler<N>) -> Self {
        Self {
            appointments: Vec::new(),
            store,
            reminders,
            clock: Box::new(SystemClock),
            timezone: Local,
        }
    }
}

impl<S: Store, N: Notifier, Tz: TimeZone> Planner<S, N, Tz> {
    pub fn with_timezone<T: TimeZone>(self, timezone: T) -> Planner<S, N, T> {
        Planner {
            appointments: self.appointments,
            store: self.store,
            reminders: self.reminders,
            clock: self.clock,
            timezone,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn reminders(&self) -> &ReminderScheduler<N> {
        &self.reminders
    }

    /// Replaces the in-memory collection with the stored one. Missing or unreadable data
    /// leaves an empty collection.
    pub fn load(&mut self) {
        self.appointments = match self.store.load() {
            Ok(Some(appointments)) => appointments,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not load appointments, starting empty: {}", e);
                Vec::new()
            }
        };
        tracing::info!("Loaded {} appointments", self.appointments.len());
    }

    /// The draft's title is trusted; callers check [`AppointmentDraft::validate`] first.
    pub fn add(&mut self, draft: AppointmentDraft) -> Appointment {
        let appointment = Appointment::from_draft(draft);
        tracing::info!("Adding appointment {}: {} at {}", appointment.id, appointment.title, appointment.date);

        self.appointments.push(appointment.clone());
        self.persist();
        self.reminders.schedule(&appointment, self.clock.now());
        appointment
    }

    pub fn remove(&mut self, id: Uuid) {
        let Some(index) = self.appointments.iter().position(|a| a.id == id) else {
            tracing::debug!("Remove ignored, no appointment {}", id);
            return;
        };
        let removed = self.appointments.remove(index);
        tracing::info!("Removed appointment {}: {}", removed.id, removed.title);

        self.persist();
        self.reminders.cancel(&removed);
    }

    pub fn toggle_done(&mut self, id: Uuid) {
        let Some(appointment) = self.appointments.iter_mut().find(|a| a.id == id) else {
            tracing::debug!("Toggle ignored, no appointment {}", id);
            return;
        };
        appointment.is_done = !appointment.is_done;
        tracing::info!("Appointment {} done: {}", appointment.id, appointment.is_done);

        self.persist();
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, id: Uuid) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn upcoming(&self) -> Result<Vec<Appointment>, ProjectionError> {
        self.upcoming_at(self.clock.now())
    }

    pub fn upcoming_at(&self, now: DateTime<Utc>) -> Result<Vec<Appointment>, ProjectionError> {
        projection::upcoming(&self.appointments, now, &self.timezone)
    }

    pub fn filtered(&self, filter: &AppointmentFilter) -> Vec<&Appointment> {
        filter.apply(&self.appointments)
    }

    pub fn appointments_on(&self, day: NaiveDate, filter: &AppointmentFilter) -> Vec<&Appointment> {
        views::on_day(self.filtered(filter), day, &self.timezone)
    }

    pub fn week_of(&self, day: NaiveDate, first_day: Weekday, filter: &AppointmentFilter) -> Vec<&Appointment> {
        views::in_week(self.filtered(filter), day, first_day, &self.timezone)
    }

    pub fn month_buckets(
        &self,
        year: i32,
        month: u32,
        filter: &AppointmentFilter,
    ) -> BTreeMap<NaiveDate, Vec<&Appointment>> {
        views::month_buckets(self.filtered(filter), year, month, &self.timezone)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.appointments) {
            tracing::warn!("Failed to persist appointments: {}", e);
        }
    }
}
