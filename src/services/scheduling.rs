use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Appointment, BusinessHoursPolicy, NewAppointment, Slot};
use crate::services::slots::generate_available;
use crate::services::validation::{validate, ValidationResult};

/// Free slots between two dates, both inclusive.
pub fn available_slots(
    conn: &Connection,
    policy: &BusinessHoursPolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> Result<Vec<Slot>, AppError> {
    if start_date > end_date {
        return Ok(Vec::new());
    }

    let (window_start, window_end) = day_window(start_date, end_date);
    let booked = queries::booked_timestamps(conn, &window_start, &window_end)?;

    Ok(generate_available(policy, start_date, end_date, &booked, now))
}

/// Validates and stores a booking.
///
/// The validator's taken-slot check only sees bookings committed before this
/// call; a concurrent insert for the same slot still ends in `Conflict`.
pub fn book_appointment(
    conn: &Connection,
    policy: &BusinessHoursPolicy,
    request: NewAppointment,
    now: NaiveDateTime,
) -> Result<Appointment, AppError> {
    let booked = match request.date_time {
        Some(start) => {
            let (window_start, window_end) = day_window(start.date(), start.date());
            queries::booked_timestamps(conn, &window_start, &window_end)?
        }
        None => Default::default(),
    };

    let start = match (validate(&request, &booked, now, policy), request.date_time) {
        (ValidationResult::Valid, Some(start)) => start,
        (ValidationResult::Invalid(errors), _) => return Err(AppError::Validation(errors)),
        (ValidationResult::Valid, None) => {
            return Err(AppError::Input("date_time is required".to_string()))
        }
    };

    let appointment = request.into_appointment(uuid::Uuid::new_v4().to_string(), start, now);
    queries::create_appointment(conn, &appointment)?;

    Ok(appointment)
}

pub fn cancel_appointment(conn: &Connection, id: &str) -> Result<Appointment, AppError> {
    let appointment = queries::get_appointment_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if !queries::delete_appointment(conn, id)? {
        return Err(AppError::NotFound("Appointment not found".to_string()));
    }

    Ok(appointment)
}

fn day_window(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    (start.and_time(NaiveTime::MIN), end.and_time(last_second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::validation::FieldError;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(at: &str) -> NewAppointment {
        NewAppointment {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            date_time: Some(dt(at)),
            reason: None,
        }
    }

    #[test]
    fn test_book_then_slot_disappears() {
        let conn = setup_db();
        let policy = BusinessHoursPolicy::default();
        let now = dt("2025-11-10 08:00");

        let appt = book_appointment(&conn, &policy, request("2025-11-10 09:00"), now).unwrap();
        assert_eq!(appt.date_time, dt("2025-11-10 09:00"));
        assert_eq!(appt.created_at, now);

        let slots = available_slots(&conn, &policy, date("2025-11-10"), date("2025-11-10"), now).unwrap();
        assert_eq!(slots.len(), 15);
        assert_eq!(slots[0].start, dt("2025-11-10 09:30"));
    }

    #[test]
    fn test_double_booking_is_rejected_by_validator() {
        let conn = setup_db();
        let policy = BusinessHoursPolicy::default();
        let now = dt("2025-11-10 08:00");

        book_appointment(&conn, &policy, request("2025-11-10 09:00"), now).unwrap();
        let err = book_appointment(&conn, &policy, request("2025-11-10 09:00"), now).unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors, vec![FieldError::SlotTaken]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_store_constraint_catches_missed_precheck() {
        let conn = setup_db();
        let now = dt("2025-11-10 08:00");

        // Simulates a booking committed between the pre-check and the insert.
        let winner = request("2025-11-10 09:00").into_appointment("winner".to_string(), dt("2025-11-10 09:00"), now);
        queries::create_appointment(&conn, &winner).unwrap();

        let loser = request("2025-11-10 09:00").into_appointment("loser".to_string(), dt("2025-11-10 09:00"), now);
        let result = queries::create_appointment(&conn, &loser);
        assert!(matches!(result, Err(AppError::Conflict)));
    }

    #[test]
    fn test_invalid_request_is_not_stored() {
        let conn = setup_db();
        let policy = BusinessHoursPolicy::default();
        let now = dt("2025-11-10 08:00");

        let err = book_appointment(&conn, &policy, request("2025-11-15 10:00"), now).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let all = queries::list_appointments(&conn, crate::models::AppointmentScope::All, &now, None).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_cancel() {
        let conn = setup_db();
        let policy = BusinessHoursPolicy::default();
        let now = dt("2025-11-10 08:00");

        let appt = book_appointment(&conn, &policy, request("2025-11-10 11:00"), now).unwrap();
        let cancelled = cancel_appointment(&conn, &appt.id).unwrap();
        assert_eq!(cancelled.id, appt.id);

        let err = cancel_appointment(&conn, &appt.id).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_inverted_range_returns_nothing() {
        let conn = setup_db();
        let policy = BusinessHoursPolicy::default();
        let slots = available_slots(
            &conn,
            &policy,
            date("2025-11-12"),
            date("2025-11-10"),
            dt("2025-11-01 00:00"),
        )
        .unwrap();
        assert!(slots.is_empty());
    }
}
