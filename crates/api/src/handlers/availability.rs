//! Availability ledger handlers: staff publish and cancel open slots,
//! clinics browse, book, and clear them. Booking is the one multi-step
//! write in the system; see [`book_availability`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use locumdesk_core::{
    errors::{LocumError, LocumResult},
    models::availability::{
        canonical_role, Availability, BookAvailabilityRequest, BookAvailabilityResponse,
        CreateAvailabilityRequest, DateRangeQuery, ListMineQuery, MyAvailability, DEFAULT_ROLE,
    },
    models::clinic::ClinicContact,
    models::shift::Shift,
    slots,
};
use locumdesk_db::models::{DbAvailability, DbShift};
use locumdesk_db::repositories::availability::{self, DateFilter, NewAvailability};
use locumdesk_db::repositories::{clinic, shift};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

fn date_filter(query: &DateRangeQuery) -> DateFilter {
    if let Some(date) = query.date {
        return DateFilter::On(date);
    }
    match (query.date_from, query.date_to) {
        (None, None) => DateFilter::Any,
        (Some(from), None) => DateFilter::From(from),
        (from, to) => DateFilter::Range { from, to },
    }
}

fn to_model(row: DbAvailability) -> Result<Availability, AppError> {
    Availability::try_from(row).map_err(|e| AppError(LocumError::Database(e)))
}

/// Publishes an open slot for the calling staff member.
///
/// Rejects zero-length and inverted windows, and any window overlapping an
/// existing non-cancelled slot on the same day; the conflicting record is
/// returned with the 409 so clients can show it.
#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateAvailabilityRequest>,
) -> Result<Response, AppError> {
    let staff_id = user.require_staff()?.to_string();

    if payload.start >= payload.end {
        return Err(AppError(LocumError::Validation(
            "end must be after start".to_string(),
        )));
    }

    // Overlap scan over the same staff member's non-cancelled slots that day
    let existing = availability::active_on_day(&state.db_pool, &staff_id, payload.date)
        .await
        .map_err(LocumError::Database)?;
    if let Some(hit) = existing
        .into_iter()
        .find(|a| slots::overlaps(payload.start, payload.end, a.start_time, a.end_time))
    {
        let overlap = to_model(hit)?;
        let body = Json(json!({
            "error": "overlapping availability on the same day",
            "overlap": overlap,
        }));
        return Ok((StatusCode::CONFLICT, body).into_response());
    }

    let role = payload
        .role
        .as_deref()
        .map(canonical_role)
        .unwrap_or_else(|| DEFAULT_ROLE.to_string());

    // Contact snapshot from the token, payload as fallback
    let full_name = if user.full_name.is_empty() {
        payload.full_name.clone()
    } else {
        user.full_name.clone()
    };
    let phone = if user.phone.is_empty() {
        payload.phone.clone()
    } else {
        user.phone.clone()
    };

    let row = availability::create_availability(
        &state.db_pool,
        NewAvailability {
            staff_id,
            owner_user_id: user.user_id.clone(),
            full_name,
            phone,
            date: payload.date,
            start_time: payload.start,
            end_time: payload.end,
            role,
            note: payload.note.clone(),
        },
    )
    .await
    .map_err(LocumError::Database)?;

    let created = to_model(row)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// Lists the caller's own slots, optionally filtered by status. Booked
/// entries are enriched with the booking clinic's contact card.
#[axum::debug_handler]
pub async fn list_mine(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListMineQuery>,
) -> Result<Json<Vec<MyAvailability>>, AppError> {
    let staff_id = user.require_staff()?.to_string();

    let status = query.status.map(|s| s.as_str());
    let rows = availability::list_by_staff(&state.db_pool, &staff_id, status)
        .await
        .map_err(LocumError::Database)?;

    let clinic_ids: Vec<String> = rows
        .iter()
        .filter_map(|r| r.booked_by_clinic_id.clone())
        .collect();
    let contacts = clinic_contacts(&state, &clinic_ids).await?;

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let availability = to_model(row)?;
        let booked_clinic = availability
            .booked_by_clinic_id
            .as_deref()
            .and_then(|id| contacts.get(id).cloned());
        result.push(MyAvailability {
            availability,
            booked_clinic,
        });
    }

    Ok(Json(result))
}

/// Staff-side cancel. Owners can cancel regardless of status; a booked slot
/// loses its booking and the clinic finds out through its booked listing.
#[axum::debug_handler]
pub async fn cancel_availability(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Availability>, AppError> {
    let staff_id = user.require_staff()?.to_string();

    let row = availability::find_by_id(&state.db_pool, id)
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| LocumError::NotFound(format!("Availability {id} not found")))?;

    if row.staff_id != staff_id {
        return Err(AppError(LocumError::Authorization(
            "not your availability".to_string(),
        )));
    }

    let cancelled = availability::cancel(&state.db_pool, id)
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| LocumError::NotFound(format!("Availability {id} not found")))?;

    Ok(Json(to_model(cancelled)?))
}

/// Marketplace browse: all open slots, optionally date- and role-filtered.
#[axum::debug_handler]
pub async fn list_open(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<Availability>>, AppError> {
    user.require_admin_or_system()?;

    // Unfiltered browsing starts at today so past slots stay out of the way.
    let filter = match date_filter(&query) {
        DateFilter::Any => DateFilter::From(Utc::now().date_naive()),
        other => other,
    };
    let role = query.role.as_deref().map(canonical_role);
    let rows = availability::list_open(&state.db_pool, &filter, role.as_deref())
        .await
        .map_err(LocumError::Database)?;

    let result = rows
        .into_iter()
        .map(to_model)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(result))
}

/// The clinic's still-active bookings, newest hiring need first is left to
/// the client; server order is chronological.
#[axum::debug_handler]
pub async fn list_booked(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<Availability>>, AppError> {
    let clinic_id = user.require_clinic_admin()?.to_string();

    let filter = date_filter(&query);
    let rows = availability::list_booked(&state.db_pool, &clinic_id, &filter)
        .await
        .map_err(LocumError::Database)?;

    let result = rows
        .into_iter()
        .map(to_model)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(result))
}

/// Books an open slot for the calling clinic and materializes the shift.
///
/// Step one is a single-statement compare-and-swap on the slot status, so a
/// lost race surfaces as 409 without ever touching the shift table. Every
/// failure after the swap runs the compensating revert before the original
/// error is returned.
#[axum::debug_handler]
pub async fn book_availability(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookAvailabilityRequest>,
) -> Result<Json<BookAvailabilityResponse>, AppError> {
    let clinic_id = user.require_clinic_admin()?.to_string();

    let booked = availability::book_if_open(
        &state.db_pool,
        id,
        &clinic_id,
        &payload.note,
        payload.hourly_rate,
        Utc::now(),
    )
    .await
    .map_err(LocumError::Database)?
    .ok_or_else(|| LocumError::Conflict("availability is not open".to_string()))?;

    // Everything past the swap is compensated on failure
    let shift_row = match materialize_shift(&state, &clinic_id, &booked, &payload).await {
        Ok(row) => row,
        Err(err) => {
            if let Err(revert_err) =
                availability::revert_booking(&state.db_pool, id, &clinic_id).await
            {
                tracing::error!(
                    "Failed to revert booking after shift creation error: id={}, error={}",
                    id,
                    revert_err
                );
            }
            return Err(err.into());
        }
    };

    let mut availability = to_model(booked)?;
    availability.shift_id = Some(shift_row.id);

    let shift = Shift::try_from(shift_row).map_err(LocumError::Database)?;
    Ok(Json(BookAvailabilityResponse {
        availability,
        shift,
    }))
}

/// Shift creation half of the booking flow, separated so the caller can
/// compensate on any error.
async fn materialize_shift(
    state: &ApiState,
    clinic_id: &str,
    booked: &DbAvailability,
    payload: &BookAvailabilityRequest,
) -> LocumResult<DbShift> {
    // Contact card: request overrides win, directory fills the gaps
    let directory = clinic::get_clinic(&state.db_pool, clinic_id)
        .await
        .map_err(LocumError::Database)?;

    let pick = |given: &Option<String>, stored: Option<&String>| -> String {
        given
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or_else(|| stored.cloned())
            .unwrap_or_default()
    };
    let clinic_name = pick(
        &payload.clinic_name,
        directory.as_ref().map(|c| &c.name),
    );
    let clinic_phone = pick(
        &payload.clinic_phone,
        directory.as_ref().map(|c| &c.phone),
    );
    let clinic_address = pick(
        &payload.clinic_address,
        directory.as_ref().map(|c| &c.address),
    );
    let clinic_lat = payload
        .clinic_lat
        .or(directory.as_ref().and_then(|c| c.lat));
    let clinic_lng = payload
        .clinic_lng
        .or(directory.as_ref().and_then(|c| c.lng));

    let row = shift::create_shift(
        &state.db_pool,
        shift::NewShift {
            clinic_id: clinic_id.to_string(),
            staff_id: booked.staff_id.clone(),
            date: booked.date,
            start_time: booked.start_time,
            end_time: booked.end_time,
            hourly_rate: payload.hourly_rate,
            note: payload.note.clone(),
            clinic_name,
            clinic_phone,
            clinic_address,
            clinic_lat,
            clinic_lng,
        },
    )
    .await
    .map_err(LocumError::Database)?;

    availability::attach_shift(&state.db_pool, booked.id, clinic_id, row.id)
        .await
        .map_err(LocumError::Database)?;

    Ok(row)
}

/// Clinic-side dismissal of a booked entry from its working list. Does not
/// reopen the slot or touch the shift.
#[axum::debug_handler]
pub async fn clear_booked(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Availability>, AppError> {
    let clinic_id = user.require_clinic_admin()?.to_string();

    let row = availability::clear_booked(&state.db_pool, id, &clinic_id, Utc::now())
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| {
            LocumError::Conflict(format!(
                "Availability {id} is not an active booking of this clinic"
            ))
        })?;

    Ok(Json(to_model(row)?))
}

async fn clinic_contacts(
    state: &ApiState,
    clinic_ids: &[String],
) -> Result<HashMap<String, ClinicContact>, AppError> {
    let rows = clinic::get_clinics_by_ids(&state.db_pool, clinic_ids)
        .await
        .map_err(LocumError::Database)?;

    Ok(rows
        .into_iter()
        .map(|c| {
            (
                c.clinic_id.clone(),
                ClinicContact {
                    name: c.name,
                    phone: c.phone,
                    address: c.address,
                    lat: c.lat,
                    lng: c.lng,
                },
            )
        })
        .collect())
}
