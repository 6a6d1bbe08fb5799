//! Trust score handlers: attendance event ingestion, score reads, and the
//! recommendation listing clinics use to pick staff.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use locumdesk_core::{
    errors::LocumError,
    models::trust::{
        AppliedDelta, AttendanceEvent, AttendanceStatus, PostAttendanceRequest,
        PostAttendanceResponse, RecommendQuery, RecommendResponse, Recommendation, ScoreResponse,
        TrustScore,
    },
    scoring,
};
use locumdesk_db::repositories::trust::{self, NewAttendanceEvent};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

/// Result cap for the recommendation listing.
const RECOMMEND_LIMIT: i64 = 10;

/// Records one attendance outcome and applies it to the staff member's
/// aggregate.
///
/// The event insert and the aggregate update are separate statements;
/// events are the source of truth, so a crash between the two loses at
/// most one delta and the aggregate can be rebuilt from the stream.
#[axum::debug_handler]
pub async fn post_attendance_event(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<PostAttendanceRequest>,
) -> Result<Response, AppError> {
    user.require_admin_or_system()?;

    let status = AttendanceStatus::parse(&payload.status)?;
    if payload.staff_id.trim().is_empty() {
        return Err(AppError(LocumError::Validation(
            "staff_id is required".to_string(),
        )));
    }
    if payload.minutes_late < 0 {
        return Err(AppError(LocumError::Validation(
            "minutes_late cannot be negative".to_string(),
        )));
    }

    let staff_id = payload.staff_id.trim().to_string();

    let event_row = trust::insert_event(
        &state.db_pool,
        NewAttendanceEvent {
            clinic_id: payload.clinic_id.clone(),
            staff_id: staff_id.clone(),
            shift_id: payload.shift_id.clone(),
            status: status.as_str().to_string(),
            minutes_late: payload.minutes_late,
            occurred_at: payload.occurred_at,
        },
    )
    .await
    .map_err(LocumError::Database)?;

    // First event for a staff member creates the base aggregate
    let score_row = trust::create_default_score(&state.db_pool, &staff_id, scoring::BASE_SCORE)
        .await
        .map_err(LocumError::Database)?;

    let mut score = TrustScore::from(score_row);
    let delta = scoring::apply_event(&mut score, status, payload.minutes_late, payload.occurred_at);
    score.updated_at = Utc::now();

    let saved = trust::update_score(&state.db_pool, &score)
        .await
        .map_err(LocumError::Database)?;

    let event = AttendanceEvent::try_from(event_row).map_err(LocumError::Database)?;
    let body = PostAttendanceResponse {
        applied: AppliedDelta { status, delta },
        event,
        score: TrustScore::from(saved),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Current score for one staff member. First read persists the base
/// aggregate so subsequent events always have a row to update.
#[axum::debug_handler]
pub async fn get_staff_score(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(staff_id): Path<String>,
) -> Result<Json<ScoreResponse>, AppError> {
    // Staff may read their own score; clinics and the service read any
    if user.require_admin_or_system().is_err() {
        let own = user.require_staff()?;
        if own != staff_id {
            return Err(AppError(LocumError::Authorization(
                "cannot read another staff member's score".to_string(),
            )));
        }
    }

    let row = match trust::find_score(&state.db_pool, &staff_id)
        .await
        .map_err(LocumError::Database)?
    {
        Some(row) => row,
        None => trust::create_default_score(&state.db_pool, &staff_id, scoring::BASE_SCORE)
            .await
            .map_err(LocumError::Database)?,
    };

    Ok(Json(ScoreResponse::from(TrustScore::from(row))))
}

/// Staff ranked for hiring: best score first, anyone with a recent no-show
/// excluded outright.
#[axum::debug_handler]
pub async fn recommend(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>, AppError> {
    user.require_admin_or_system()?;

    let clinic_id = query
        .clinic_id
        .clone()
        .unwrap_or_else(|| user.clinic_id.clone());

    let rows = trust::list_recommendable(
        &state.db_pool,
        scoring::FLAG_NO_SHOW_30D,
        RECOMMEND_LIMIT,
    )
    .await
    .map_err(LocumError::Database)?;

    let recommended = rows
        .into_iter()
        .map(TrustScore::from)
        .map(|score| {
            let reason = scoring::recommendation_reason(&score);
            Recommendation {
                staff_id: score.staff_id,
                trust_score: score.trust_score,
                badges: score.badges,
                flags: score.flags,
                reason,
            }
        })
        .collect();

    Ok(Json(RecommendResponse {
        clinic_id,
        recommended,
    }))
}
