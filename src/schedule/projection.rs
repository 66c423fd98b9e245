//! Next-occurrence projection for recurring appointments and the upcoming view built on it.
//!
//! Projections are derived copies; stored anchors are never modified.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::calendar::Appointment;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("Recurrence of appointment {id} did not advance past {at}")]
    Stalled { id: Uuid, at: DateTime<Utc> },
    #[error("Recurrence of appointment {id} cannot be advanced past {at}")]
    OutOfRange { id: Uuid, at: DateTime<Utc> },
}

/// Next occurrence of `appointment` at or after `now`, using the wall clock of `tz`.
///
/// Returns the appointment unchanged when its own date is not in the past, `None` for a
/// past one-off appointment, and otherwise a copy moved forward by whole recurrence units.
pub fn next_occurrence<Tz: TimeZone>(
    appointment: &Appointment,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Option<Appointment>, ProjectionError> {
    let anchor = appointment.date.with_timezone(tz);
    let rule = appointment.recurrence;
    project_with(appointment, now, |steps| {
        rule.occurrence(&anchor, steps).map(|at| at.with_timezone(&Utc))
    })
}

pub(crate) fn project_with<F>(
    appointment: &Appointment,
    now: DateTime<Utc>,
    mut occurrence: F,
) -> Result<Option<Appointment>, ProjectionError>
where
    F: FnMut(u32) -> Option<DateTime<Utc>>,
{
    if appointment.date >= now {
        return Ok(Some(appointment.clone()));
    }
    if !appointment.recurrence.is_recurring() {
        return Ok(None);
    }

    let id = appointment.id;
    let mut previous = appointment.date;
    let mut steps: u32 = 0;
    loop {
        steps = steps
            .checked_add(1)
            .ok_or(ProjectionError::OutOfRange { id, at: previous })?;
        let next = occurrence(steps).ok_or(ProjectionError::OutOfRange { id, at: previous })?;
        if next <= previous {
            return Err(ProjectionError::Stalled { id, at: previous });
        }
        if next >= now {
            return Ok(Some(appointment.occurring_at(next)));
        }
        previous = next;
    }
}

/// Every appointment that is still ahead of `now`, recurring ones projected forward,
/// sorted by date. Equal dates keep collection order.
pub fn upcoming<Tz: TimeZone>(
    appointments: &[Appointment],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<Appointment>, ProjectionError> {
    let mut results = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        if let Some(next) = next_occurrence(appointment, now, tz)? {
            results.push(next);
        }
    }
    results.sort_by_key(|appointment| appointment.date);
    Ok(results)
}
