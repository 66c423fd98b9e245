use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::calendar::{Appointment, ReminderOffset};
use crate::storage::config::NotificationConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("No async runtime available to schedule alerts")]
    RuntimeUnavailable,
    #[error("Alert registry lock was poisoned")]
    Poisoned,
    #[error("Notification backend error: {0}")]
    Backend(String),
}

/// Point-in-time alert delivery owned by the host.
#[cfg_attr(test, automock)]
pub trait Notifier {
    fn register(&self, id: &str, fire_at: DateTime<Utc>, title: &str, body: &str) -> Result<(), NotifyError>;

    /// Unknown ids are ignored.
    fn cancel(&self, ids: &[String]) -> Result<(), NotifyError>;
}

/// Alert identifier, reconstructible from the appointment id and offset alone.
pub fn reminder_id(appointment_id: Uuid, offset: ReminderOffset) -> String {
    format!("{}_{}", appointment_id, offset.as_secs())
}

pub fn reminder_ids(appointment: &Appointment) -> Vec<String> {
    appointment
        .reminder_offsets
        .iter()
        .map(|offset| reminder_id(appointment.id, *offset))
        .collect()
}

/// Keeps a notifier in step with the reminder offsets of appointments.
pub struct ReminderScheduler<N> {
    notifier: N,
    notifications: NotificationConfig,
}

impl<N: Notifier> ReminderScheduler<N> {
    pub fn new(notifier: N, notifications: NotificationConfig) -> Self {
        Self { notifier, notifications }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Clears any alerts for the appointment, then registers one per offset whose fire
    /// time is strictly after `now`. Returns the ids that were registered.
    pub fn schedule(&self, appointment: &Appointment, now: DateTime<Utc>) -> Vec<String> {
        self.cancel(appointment);

        let body = self.notifications.body_for(&appointment.title);
        let mut registered = Vec::new();
        for offset in &appointment.reminder_offsets {
            let id = reminder_id(appointment.id, *offset);
            let Some(fire_at) = appointment.alert_at(*offset) else {
                tracing::warn!("Skipping reminder {}: offset out of range", id);
                continue;
            };
            if fire_at <= now {
                tracing::debug!("Skipping reminder {} at {}: not in the future", id, fire_at);
                continue;
            }
            match self.notifier.register(&id, fire_at, &self.notifications.title, &body) {
                Ok(()) => {
                    tracing::debug!("Registered reminder {} at {}", id, fire_at);
                    registered.push(id);
                }
                Err(e) => tracing::warn!("Failed to register reminder {}: {}", id, e),
            }
        }
        registered
    }

    pub fn cancel(&self, appointment: &Appointment) {
        let ids = reminder_ids(appointment);
        if ids.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.cancel(&ids) {
            tracing::warn!("Failed to cancel reminders for {}: {}", appointment.id, e);
        }
    }
}
