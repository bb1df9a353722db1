use std::collections::HashSet;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BusinessHoursPolicy, NewAppointment};

pub const REASON_MAX_CHARS: usize = 200;

// Same shape browsers use for <input type="email">.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("Invalid email regex pattern")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 \t\-()]+$").expect("Invalid phone regex pattern"));

/// One rejected booking field. `Display` gives the user-facing message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("Name can't be blank")]
    NameBlank,

    #[error("Email can't be blank")]
    EmailBlank,

    #[error("Email is invalid")]
    EmailInvalid,

    #[error("Phone must be a valid phone number")]
    PhoneInvalid,

    #[error("Reason is too long (maximum is {max} characters)")]
    ReasonTooLong { max: usize },

    #[error("Date time can't be blank")]
    DateTimeMissing,

    #[error("Date time cannot be in the past")]
    DateTimeInPast,

    #[error("Date time must be on a weekday ({days})")]
    NotAWorkday { days: String },

    #[error("Date time must be between {hours}")]
    OutsideBusinessHours { hours: String },

    #[error("Date time must be in {slot_minutes}-minute increments")]
    MisalignedSlot { slot_minutes: u32 },

    #[error("Date time has already been taken")]
    SlotTaken,
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::NameBlank => "name",
            FieldError::EmailBlank | FieldError::EmailInvalid => "email",
            FieldError::PhoneInvalid => "phone",
            FieldError::ReasonTooLong { .. } => "reason",
            FieldError::DateTimeMissing
            | FieldError::DateTimeInPast
            | FieldError::NotAWorkday { .. }
            | FieldError::OutsideBusinessHours { .. }
            | FieldError::MisalignedSlot { .. }
            | FieldError::SlotTaken => "date_time",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Checks a proposed booking against the policy and the known bookings.
///
/// Every failing check is reported, in field order. The `booked` lookup is a
/// pre-check only; the store's unique index on `date_time` has the final say.
pub fn validate(
    proposal: &NewAppointment,
    booked: &HashSet<NaiveDateTime>,
    now: NaiveDateTime,
    policy: &BusinessHoursPolicy,
) -> ValidationResult {
    let mut errors = Vec::new();

    if proposal.name.trim().is_empty() {
        errors.push(FieldError::NameBlank);
    }

    let email = proposal.email.trim();
    if email.is_empty() {
        errors.push(FieldError::EmailBlank);
    } else if !EMAIL_REGEX.is_match(email) {
        errors.push(FieldError::EmailInvalid);
    }

    if let Some(phone) = proposal.phone.as_deref().map(str::trim) {
        if !phone.is_empty() && !PHONE_REGEX.is_match(phone) {
            errors.push(FieldError::PhoneInvalid);
        }
    }

    if let Some(reason) = &proposal.reason {
        if reason.chars().count() > REASON_MAX_CHARS {
            errors.push(FieldError::ReasonTooLong {
                max: REASON_MAX_CHARS,
            });
        }
    }

    match &proposal.date_time {
        None => errors.push(FieldError::DateTimeMissing),
        Some(start) => errors.extend(date_time_errors(start, booked, now, policy)),
    }

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

fn date_time_errors(
    start: &NaiveDateTime,
    booked: &HashSet<NaiveDateTime>,
    now: NaiveDateTime,
    policy: &BusinessHoursPolicy,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if *start <= now {
        errors.push(FieldError::DateTimeInPast);
    }

    // A weekend timestamp only reports the weekday problem.
    if !policy.is_workday(start) {
        errors.push(FieldError::NotAWorkday {
            days: policy.workdays_label(),
        });
    } else if !policy.is_within_hours(start) {
        errors.push(FieldError::OutsideBusinessHours {
            hours: policy.hours_label(),
        });
    }

    if !policy.is_on_slot_boundary(start) {
        errors.push(FieldError::MisalignedSlot {
            slot_minutes: policy.slot_minutes(),
        });
    }

    if booked.contains(start) {
        errors.push(FieldError::SlotTaken);
    }

    errors
}
