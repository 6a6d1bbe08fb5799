//! Shift registry handlers. Shifts are mostly materialized by the booking
//! flow; clinics can also create them directly and drive the status
//! lifecycle that feeds attendance scoring.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use locumdesk_core::{
    errors::LocumError,
    models::auth::Role,
    models::shift::{CreateShiftRequest, ListShiftsQuery, Shift, UpdateShiftStatusRequest},
};
use locumdesk_db::models::DbShift;
use locumdesk_db::repositories::{clinic, shift};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

fn to_model(row: DbShift) -> Result<Shift, AppError> {
    Shift::try_from(row).map_err(|e| AppError(LocumError::Database(e)))
}

/// Direct shift creation for clinic admins, outside the booking flow.
#[axum::debug_handler]
pub async fn create_shift(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateShiftRequest>,
) -> Result<Response, AppError> {
    user.require_admin_or_system()?;

    // Clinic admins may only write into their own clinic
    if user.role == Role::Admin && user.clinic_id != payload.clinic_id {
        return Err(AppError(LocumError::Authorization(
            "cannot create shifts for another clinic".to_string(),
        )));
    }

    if payload.start >= payload.end {
        return Err(AppError(LocumError::Validation(
            "end must be after start".to_string(),
        )));
    }
    if payload.staff_id.trim().is_empty() {
        return Err(AppError(LocumError::Validation(
            "staff_id is required".to_string(),
        )));
    }

    // Snapshot the clinic contact from the directory at creation time
    let directory = clinic::get_clinic(&state.db_pool, &payload.clinic_id)
        .await
        .map_err(LocumError::Database)?;

    let row = shift::create_shift(
        &state.db_pool,
        shift::NewShift {
            clinic_id: payload.clinic_id.clone(),
            staff_id: payload.staff_id.trim().to_string(),
            date: payload.date,
            start_time: payload.start,
            end_time: payload.end,
            hourly_rate: payload.hourly_rate,
            note: payload.note.clone(),
            clinic_name: directory.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            clinic_phone: directory
                .as_ref()
                .map(|c| c.phone.clone())
                .unwrap_or_default(),
            clinic_address: directory
                .as_ref()
                .map(|c| c.address.clone())
                .unwrap_or_default(),
            clinic_lat: directory.as_ref().and_then(|c| c.lat),
            clinic_lng: directory.as_ref().and_then(|c| c.lng),
        },
    )
    .await
    .map_err(LocumError::Database)?;

    Ok((StatusCode::CREATED, Json(to_model(row)?)).into_response())
}

/// Lists shifts visible to the caller.
///
/// Staff see their own shifts only; clinic admins their clinic's; the
/// internal service may filter freely. Rows with a missing clinic contact
/// are patched from the directory in the response without being rewritten.
#[axum::debug_handler]
pub async fn list_shifts(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListShiftsQuery>,
) -> Result<Json<Vec<Shift>>, AppError> {
    let (clinic_filter, staff_filter) = match user.role {
        Role::Staff => {
            let staff_id = user.require_staff()?.to_string();
            (None, Some(staff_id))
        }
        Role::Admin => {
            let clinic_id = user.require_clinic_admin()?.to_string();
            (Some(clinic_id), query.staff_id.clone())
        }
        Role::System => (query.clinic_id.clone(), query.staff_id.clone()),
    };

    let rows = shift::list_shifts(
        &state.db_pool,
        clinic_filter.as_deref(),
        staff_filter.as_deref(),
    )
    .await
    .map_err(LocumError::Database)?;

    // Response-side contact enrichment for rows created before the
    // directory had an entry
    let missing: Vec<String> = rows
        .iter()
        .filter(|r| r.clinic_name.is_empty() || r.clinic_phone.is_empty())
        .map(|r| r.clinic_id.clone())
        .collect();
    let directory: HashMap<String, _> = clinic::get_clinics_by_ids(&state.db_pool, &missing)
        .await
        .map_err(LocumError::Database)?
        .into_iter()
        .map(|c| (c.clinic_id.clone(), c))
        .collect();

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let mut shift = to_model(row)?;
        if let Some(entry) = directory.get(&shift.clinic_id) {
            if shift.clinic_name.is_empty() {
                shift.clinic_name = entry.name.clone();
            }
            if shift.clinic_phone.is_empty() {
                shift.clinic_phone = entry.phone.clone();
            }
            if shift.clinic_address.is_empty() {
                shift.clinic_address = entry.address.clone();
            }
            if shift.clinic_lat.is_none() {
                shift.clinic_lat = entry.lat;
            }
            if shift.clinic_lng.is_none() {
                shift.clinic_lng = entry.lng;
            }
        }
        result.push(shift);
    }

    Ok(Json(result))
}

/// Moves a shift to any lifecycle status. Transitions are deliberately
/// unrestricted so clinics can correct mistakes (e.g. no_show back to
/// completed); scoring consumes the attendance event stream, not this
/// field.
#[axum::debug_handler]
pub async fn update_shift_status(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShiftStatusRequest>,
) -> Result<Json<Shift>, AppError> {
    user.require_admin_or_system()?;

    if payload.minutes_late < 0 {
        return Err(AppError(LocumError::Validation(
            "minutes_late cannot be negative".to_string(),
        )));
    }

    let existing = shift::find_by_id(&state.db_pool, id)
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| LocumError::NotFound(format!("Shift {id} not found")))?;

    if user.role == Role::Admin && user.clinic_id != existing.clinic_id {
        return Err(AppError(LocumError::Authorization(
            "cannot update another clinic's shift".to_string(),
        )));
    }

    let row = shift::update_status(&state.db_pool, id, payload.status.as_str(), payload.minutes_late)
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| LocumError::NotFound(format!("Shift {id} not found")))?;

    Ok(Json(to_model(row)?))
}

/// Hard delete, clinic admin only.
#[axum::debug_handler]
pub async fn delete_shift(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin_or_system()?;

    let existing = shift::find_by_id(&state.db_pool, id)
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| LocumError::NotFound(format!("Shift {id} not found")))?;

    if user.role == Role::Admin && user.clinic_id != existing.clinic_id {
        return Err(AppError(LocumError::Authorization(
            "cannot delete another clinic's shift".to_string(),
        )));
    }

    let deleted = shift::delete_shift(&state.db_pool, id)
        .await
        .map_err(LocumError::Database)?;
    if !deleted {
        return Err(AppError(LocumError::NotFound(format!(
            "Shift {id} not found"
        ))));
    }

    Ok(StatusCode::NO_CONTENT)
}
