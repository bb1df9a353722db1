use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::db::queries::{self, Page};
use crate::errors::AppError;
use crate::models::slot::to_iso8601;
use crate::models::{Appointment, AppointmentScope, NewAppointment, SlotView};
use crate::services::scheduling;
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 25;
const MAX_PER_PAGE: u32 = 100;

#[derive(Serialize)]
pub struct AppointmentResponse {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    date_time: String,
    reason: Option<String>,
    created_at: String,
    updated_at: String,
}

impl AppointmentResponse {
    fn new(appt: Appointment, offset: &FixedOffset) -> Self {
        Self {
            date_time: to_iso8601(&appt.date_time, offset),
            created_at: to_iso8601(&appt.created_at, offset),
            updated_at: to_iso8601(&appt.updated_at, offset),
            id: appt.id,
            name: appt.name,
            email: appt.email,
            phone: appt.phone,
            reason: appt.reason,
        }
    }
}

// GET /api/v1/appointments
#[derive(Deserialize)]
pub struct IndexQuery {
    pub scope: Option<AppointmentScope>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let scope = query.scope.unwrap_or(AppointmentScope::All);
    let page = match (query.page, query.per_page) {
        (None, None) => None,
        (page, per_page) => Some(Page {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }),
    };

    let now = state.clock.now();
    let appointments = {
        let db = state.conn()?;
        queries::list_appointments(&db, scope, &now, page)?
    };

    Ok(Json(
        appointments
            .into_iter()
            .map(|a| AppointmentResponse::new(a, &state.offset))
            .collect(),
    ))
}

// GET /api/v1/appointments/available
#[derive(Deserialize)]
pub struct AvailableQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct AvailableResponse {
    available_slots: Vec<SlotView>,
}

pub async fn available(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<AvailableResponse>, AppError> {
    let now = state.clock.now();

    let start_date = match query.start_date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => now.date(),
    };
    let end_date = match query.end_date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => start_date
            .checked_add_days(Days::new(state.config.availability_window_days))
            .ok_or_else(|| AppError::Input("Invalid date format".to_string()))?,
    };

    let span = (end_date - start_date).num_days();
    if span > state.config.max_availability_days as i64 {
        return Err(AppError::Input(format!(
            "Date range too large (maximum is {} days)",
            state.config.max_availability_days
        )));
    }

    let slots = {
        let db = state.conn()?;
        scheduling::available_slots(&db, &state.policy, start_date, end_date, now)?
    };

    tracing::debug!(%start_date, %end_date, count = slots.len(), "computed availability");

    Ok(Json(AvailableResponse {
        available_slots: slots
            .iter()
            .map(|s| SlotView::from_slot(s, &state.offset))
            .collect(),
    }))
}

// POST /api/v1/appointments
#[derive(Deserialize)]
pub struct CreateRequest {
    pub appointment: AppointmentParams,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AppointmentParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_time: Option<String>,
    pub reason: Option<String>,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let params = payload.appointment;
    let request = NewAppointment {
        name: params.name.unwrap_or_default(),
        email: params.email.unwrap_or_default(),
        phone: params.phone,
        date_time: params
            .date_time
            .as_deref()
            .and_then(|raw| parse_date_time(raw, &state.offset)),
        reason: params.reason,
    };

    let now = state.clock.now();
    let result = {
        let db = state.conn()?;
        scheduling::book_appointment(&db, &state.policy, request, now)
    };

    match result {
        Ok(appointment) => {
            tracing::info!(id = %appointment.id, date_time = %appointment.date_time, "appointment booked");
            Ok((
                StatusCode::CREATED,
                Json(AppointmentResponse::new(appointment, &state.offset)),
            ))
        }
        Err(AppError::Conflict) => {
            tracing::warn!("lost race for slot, reporting conflict");
            Err(AppError::Conflict)
        }
        Err(e) => Err(e),
    }
}

// DELETE /api/v1/appointments/:id
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cancelled = {
        let db = state.conn()?;
        scheduling::cancel_appointment(&db, &id)?
    };

    tracing::info!(id = %cancelled.id, date_time = %cancelled.date_time, "appointment cancelled");

    Ok(Json(
        serde_json::json!({ "message": "Appointment cancelled successfully" }),
    ))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Input("Invalid date format".to_string()))
}

/// Reads a submitted start time as business-local time.
///
/// Timestamps with an offset are converted into the business timezone; bare
/// ones are taken as already local. Sub-second precision is dropped.
fn parse_date_time(raw: &str, offset: &FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    let local = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(offset).naive_local(),
        Err(_) => ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?,
    };

    local.with_nanosecond(0)
}
