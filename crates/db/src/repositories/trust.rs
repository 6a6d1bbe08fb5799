use crate::models::{DbAttendanceEvent, DbTrustScore};
use chrono::{DateTime, Utc};
use eyre::Result;
use locumdesk_core::models::trust::TrustScore;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const SCORE_COLUMNS: &str = "staff_id, trust_score, total_shifts, completed, late, no_show, \
     cancelled_early, last_no_show_at, flags, badges, created_at, updated_at";

const EVENT_COLUMNS: &str =
    "id, clinic_id, staff_id, shift_id, status, minutes_late, occurred_at, created_at";

pub struct NewAttendanceEvent {
    pub clinic_id: String,
    pub staff_id: String,
    pub shift_id: String,
    pub status: String,
    pub minutes_late: i32,
    pub occurred_at: DateTime<Utc>,
}

/// Append-only event insert. Never deleted or updated afterwards.
pub async fn insert_event(
    pool: &Pool<Postgres>,
    new: NewAttendanceEvent,
) -> Result<DbAttendanceEvent> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Recording attendance event: id={}, staff_id={}, status={}",
        id,
        new.staff_id,
        new.status
    );

    let row = sqlx::query_as::<_, DbAttendanceEvent>(&format!(
        r#"
        INSERT INTO attendance_events
            (id, clinic_id, staff_id, shift_id, status, minutes_late, occurred_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {EVENT_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&new.clinic_id)
    .bind(&new.staff_id)
    .bind(&new.shift_id)
    .bind(&new.status)
    .bind(new.minutes_late)
    .bind(new.occurred_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn find_score(pool: &Pool<Postgres>, staff_id: &str) -> Result<Option<DbTrustScore>> {
    let row = sqlx::query_as::<_, DbTrustScore>(&format!(
        "SELECT {SCORE_COLUMNS} FROM trust_scores WHERE staff_id = $1"
    ))
    .bind(staff_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates the default aggregate if absent and returns the stored row either
/// way; the upsert keeps concurrent first-event callers from racing.
pub async fn create_default_score(
    pool: &Pool<Postgres>,
    staff_id: &str,
    base_score: i32,
) -> Result<DbTrustScore> {
    let row = sqlx::query_as::<_, DbTrustScore>(&format!(
        r#"
        INSERT INTO trust_scores (staff_id, trust_score)
        VALUES ($1, $2)
        ON CONFLICT (staff_id) DO UPDATE SET staff_id = EXCLUDED.staff_id
        RETURNING {SCORE_COLUMNS}
        "#,
    ))
    .bind(staff_id)
    .bind(base_score)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Persists a mutated aggregate produced by the scoring rules.
pub async fn update_score(pool: &Pool<Postgres>, score: &TrustScore) -> Result<DbTrustScore> {
    let row = sqlx::query_as::<_, DbTrustScore>(&format!(
        r#"
        UPDATE trust_scores
        SET trust_score = $2,
            total_shifts = $3,
            completed = $4,
            late = $5,
            no_show = $6,
            cancelled_early = $7,
            last_no_show_at = $8,
            flags = $9,
            badges = $10,
            updated_at = NOW()
        WHERE staff_id = $1
        RETURNING {SCORE_COLUMNS}
        "#,
    ))
    .bind(&score.staff_id)
    .bind(score.trust_score)
    .bind(score.total_shifts)
    .bind(score.completed)
    .bind(score.late)
    .bind(score.no_show)
    .bind(score.cancelled_early)
    .bind(score.last_no_show_at)
    .bind(&score.flags)
    .bind(&score.badges)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Ranked candidates for recommendations: anyone not carrying the given
/// flag, best score first, most recently active breaking ties.
pub async fn list_recommendable(
    pool: &Pool<Postgres>,
    excluded_flag: &str,
    limit: i64,
) -> Result<Vec<DbTrustScore>> {
    let rows = sqlx::query_as::<_, DbTrustScore>(&format!(
        r#"
        SELECT {SCORE_COLUMNS} FROM trust_scores
        WHERE NOT ($1 = ANY(flags))
        ORDER BY trust_score DESC, updated_at DESC
        LIMIT $2
        "#,
    ))
    .bind(excluded_flag)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
