use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

use super::{Category, Recurrence, ReminderOffset};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("Reminder offset of {0} seconds is out of range")]
    OffsetOutOfRange(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub reminder_offsets: BTreeSet<ReminderOffset>,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub category: Category,
}

impl Appointment {
    /// Assigns a fresh id; the draft is not re-validated here.
    pub fn from_draft(draft: AppointmentDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            date: draft.date,
            recurrence: draft.recurrence,
            reminder_offsets: draft.reminder_offsets,
            is_done: false,
            category: draft.category,
        }
    }

    /// Copy of this appointment moved to another occurrence. The stored entity is never touched.
    pub fn occurring_at(&self, date: DateTime<Utc>) -> Self {
        Self { date, ..self.clone() }
    }

    /// Instant at which the reminder for `offset` fires, `None` if it cannot be represented.
    pub fn alert_at(&self, offset: ReminderOffset) -> Option<DateTime<Utc>> {
        self.date.checked_sub_signed(offset.as_duration()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub title: String,
    pub date: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub reminder_offsets: BTreeSet<ReminderOffset>,
    pub category: Category,
}

impl AppointmentDraft {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            date,
            recurrence: Recurrence::None,
            reminder_offsets: BTreeSet::new(),
            category: Category::Other,
        }
    }

    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn reminders(mut self, offsets: impl IntoIterator<Item = ReminderOffset>) -> Self {
        self.reminder_offsets.extend(offsets);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(offset) = self.reminder_offsets.iter().find(|o| o.as_duration().is_none()) {
            return Err(ValidationError::OffsetOutOfRange(offset.as_secs()));
        }
        Ok(())
    }
}
