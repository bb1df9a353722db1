pub mod clock;
pub mod scheduling;
pub mod slots;
pub mod validation;
