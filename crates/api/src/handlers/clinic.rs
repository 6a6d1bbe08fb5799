//! Clinic directory handlers. The directory is written by clinic admins and
//! read everywhere shifts and bookings need a contact card.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use locumdesk_core::{
    errors::LocumError,
    models::auth::Role,
    models::clinic::{Clinic, UpdateClinicLocationRequest, UpdateClinicLocationResponse},
};
use locumdesk_db::repositories::{clinic, shift};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

/// Updates a clinic's location and contact details, optionally backfilling
/// the contact snapshot onto its existing shifts.
#[axum::debug_handler]
pub async fn update_location(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(clinic_id): Path<String>,
    Json(payload): Json<UpdateClinicLocationRequest>,
) -> Result<Json<UpdateClinicLocationResponse>, AppError> {
    user.require_admin_or_system()?;
    if user.role == Role::Admin && user.clinic_id != clinic_id {
        return Err(AppError(LocumError::Authorization(
            "cannot update another clinic".to_string(),
        )));
    }

    if !payload.clinic_lat.is_finite() || !payload.clinic_lng.is_finite() {
        return Err(AppError(LocumError::Validation(
            "clinic_lat and clinic_lng must be finite numbers".to_string(),
        )));
    }
    if !(-90.0..=90.0).contains(&payload.clinic_lat)
        || !(-180.0..=180.0).contains(&payload.clinic_lng)
    {
        return Err(AppError(LocumError::Validation(
            "clinic_lat/clinic_lng out of range".to_string(),
        )));
    }

    let row = clinic::upsert_clinic(
        &state.db_pool,
        &clinic_id,
        payload.clinic_name.trim(),
        payload.clinic_phone.trim(),
        payload.clinic_address.trim(),
        Some(payload.clinic_lat),
        Some(payload.clinic_lng),
    )
    .await
    .map_err(LocumError::Database)?;

    let backfilled_shifts = if payload.backfill {
        shift::backfill_clinic_contact(
            &state.db_pool,
            &clinic_id,
            &row.name,
            &row.phone,
            &row.address,
            row.lat,
            row.lng,
        )
        .await
        .map_err(LocumError::Database)?
    } else {
        0
    };

    Ok(Json(UpdateClinicLocationResponse {
        clinic: Clinic::from(row),
        backfilled_shifts,
    }))
}
