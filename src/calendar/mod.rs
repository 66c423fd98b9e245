pub mod appointment;
pub mod category;
pub mod recurrence;
pub mod reminder;

pub use appointment::{Appointment, AppointmentDraft, ValidationError};
pub use category::Category;
pub use recurrence::Recurrence;
pub use reminder::ReminderOffset;
