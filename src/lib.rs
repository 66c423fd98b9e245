pub mod calendar;
pub mod schedule;
pub mod storage;

pub use calendar::{Appointment, AppointmentDraft, Category, Recurrence, ReminderOffset};
pub use schedule::{AppointmentFilter, Planner, ProjectionError};
pub use storage::{Config, SqliteStore, Store};
