pub mod clock;
pub mod notifier;
pub mod planner;
pub mod projection;
pub mod reminders;
pub mod views;

pub use clock::{Clock, SystemClock};
pub use notifier::{Alert, TokioNotifier};
pub use planner::Planner;
pub use projection::{next_occurrence, upcoming, ProjectionError};
pub use reminders::{reminder_id, Notifier, NotifyError, ReminderScheduler};
pub use views::AppointmentFilter;
