pub mod appointment;
pub mod policy;
pub mod slot;

pub use appointment::{Appointment, AppointmentScope, NewAppointment};
pub use policy::{BusinessHoursPolicy, PolicyError};
pub use slot::{Slot, SlotView};
