use std::collections::HashSet;

use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{ffi, params, Connection};

use crate::errors::AppError;
use crate::models::{Appointment, AppointmentScope};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const APPOINTMENT_COLUMNS: &str =
    "id, name, email, phone, date_time, reason, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.per_page as i64
    }
}

// ── Appointments ──

/// Inserts `appt`. Losing the race for a `date_time` surfaces as `Conflict`;
/// any other constraint failure stays a database error.
pub fn create_appointment(conn: &Connection, appt: &Appointment) -> Result<(), AppError> {
    let result = conn.execute(
        "INSERT INTO appointments (id, name, email, phone, date_time, reason, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appt.id,
            appt.name,
            appt.email,
            appt.phone,
            format_ts(&appt.date_time),
            appt.reason,
            format_ts(&appt.created_at),
            format_ts(&appt.updated_at),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(AppError::Conflict)
        }
        Err(e) => Err(e.into()),
    }
}

/// Start times of every appointment with `start <= date_time <= end`.
pub fn booked_timestamps(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<HashSet<NaiveDateTime>> {
    let mut stmt = conn.prepare(
        "SELECT date_time FROM appointments WHERE date_time >= ?1 AND date_time <= ?2",
    )?;

    let rows = stmt.query_map(params![format_ts(start), format_ts(end)], |row| {
        row.get::<_, String>(0)
    })?;

    let mut booked = HashSet::new();
    for row in rows {
        booked.insert(parse_ts(&row?)?);
    }
    Ok(booked)
}

pub fn list_appointments(
    conn: &Connection,
    scope: AppointmentScope,
    now: &NaiveDateTime,
    page: Option<Page>,
) -> anyhow::Result<Vec<Appointment>> {
    let now_str = format_ts(now);
    let (filter, order, mut params_vec): (&str, &str, Vec<Box<dyn rusqlite::types::ToSql>>) =
        match scope {
            AppointmentScope::All => ("", "ASC", vec![]),
            AppointmentScope::Upcoming => (
                "WHERE date_time >= ?1",
                "ASC",
                vec![Box::new(now_str) as Box<dyn rusqlite::types::ToSql>],
            ),
            AppointmentScope::Past => (
                "WHERE date_time < ?1",
                "DESC",
                vec![Box::new(now_str) as Box<dyn rusqlite::types::ToSql>],
            ),
        };

    let mut sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments {filter} ORDER BY date_time {order}");
    if let Some(page) = page {
        let n = params_vec.len();
        sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", n + 1, n + 2));
        params_vec.push(Box::new(page.per_page as i64));
        params_vec.push(Box::new(page.offset()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn get_appointment_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appt) => Ok(Some(appt?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_appointment(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let date_time: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Appointment {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        date_time: parse_ts(&date_time)?,
        reason: row.get(5)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("malformed stored timestamp: {s}"))
}
