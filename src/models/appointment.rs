use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_time: NaiveDateTime,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Booking fields as submitted, before validation.
///
/// `date_time` is `None` when the client sent nothing or something that
/// could not be read as a timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAppointment {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_time: Option<NaiveDateTime>,
    pub reason: Option<String>,
}

impl NewAppointment {
    /// Builds the stored record. Blank optional fields are stored as NULL.
    pub fn into_appointment(self, id: String, date_time: NaiveDateTime, now: NaiveDateTime) -> Appointment {
        Appointment {
            id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_blank(self.phone),
            date_time,
            reason: non_blank(self.reason),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentScope {
    All,
    Upcoming,
    Past,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
