use crate::models::DbShift;
use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, clinic_id, staff_id, date, start_time, end_time, status, minutes_late, \
     hourly_rate, note, clinic_name, clinic_phone, clinic_address, clinic_lat, clinic_lng, \
     created_at, updated_at";

/// Result-set cap for shift listings.
const LIST_LIMIT: i64 = 200;

pub struct NewShift {
    pub clinic_id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hourly_rate: f64,
    pub note: String,
    pub clinic_name: String,
    pub clinic_phone: String,
    pub clinic_address: String,
    pub clinic_lat: Option<f64>,
    pub clinic_lng: Option<f64>,
}

pub async fn create_shift(pool: &Pool<Postgres>, new: NewShift) -> Result<DbShift> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating shift: id={}, clinic_id={}, staff_id={}, date={}",
        id,
        new.clinic_id,
        new.staff_id,
        new.date
    );

    let row = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        INSERT INTO shifts
            (id, clinic_id, staff_id, date, start_time, end_time, status, minutes_late,
             hourly_rate, note, clinic_name, clinic_phone, clinic_address, clinic_lat, clinic_lng)
        VALUES ($1, $2, $3, $4, $5, $6, 'scheduled', 0, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&new.clinic_id)
    .bind(&new.staff_id)
    .bind(new.date)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.hourly_rate)
    .bind(&new.note)
    .bind(&new.clinic_name)
    .bind(&new.clinic_phone)
    .bind(&new.clinic_address)
    .bind(new.clinic_lat)
    .bind(new.clinic_lng)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbShift>> {
    let row =
        sqlx::query_as::<_, DbShift>(&format!("SELECT {COLUMNS} FROM shifts WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row)
}

pub async fn list_shifts(
    pool: &Pool<Postgres>,
    clinic_id: Option<&str>,
    staff_id: Option<&str>,
) -> Result<Vec<DbShift>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM shifts WHERE 1 = 1"));
    if let Some(clinic_id) = clinic_id {
        qb.push(" AND clinic_id = ").push_bind(clinic_id.to_string());
    }
    if let Some(staff_id) = staff_id {
        qb.push(" AND staff_id = ").push_bind(staff_id.to_string());
    }
    qb.push(" ORDER BY date DESC, created_at DESC LIMIT ");
    qb.push_bind(LIST_LIMIT);

    let rows = qb.build_query_as::<DbShift>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
    minutes_late: i32,
) -> Result<Option<DbShift>> {
    tracing::debug!("Updating shift status: id={}, status={}", id, status);

    let row = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        UPDATE shifts
        SET status = $2, minutes_late = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(status)
    .bind(minutes_late)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Hard delete; returns false when no such shift existed.
pub async fn delete_shift(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM shifts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fills missing clinic contact fields on a clinic's shifts from the
/// directory entry; values already present are left alone.
pub async fn backfill_clinic_contact(
    pool: &Pool<Postgres>,
    clinic_id: &str,
    name: &str,
    phone: &str,
    address: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE shifts
        SET clinic_name = COALESCE(NULLIF(clinic_name, ''), $2),
            clinic_phone = COALESCE(NULLIF(clinic_phone, ''), $3),
            clinic_address = COALESCE(NULLIF(clinic_address, ''), $4),
            clinic_lat = COALESCE(clinic_lat, $5),
            clinic_lng = COALESCE(clinic_lng, $6),
            updated_at = NOW()
        WHERE clinic_id = $1
          AND (clinic_name = '' OR clinic_phone = '' OR clinic_address = ''
               OR clinic_lat IS NULL OR clinic_lng IS NULL)
        "#,
    )
    .bind(clinic_id)
    .bind(name)
    .bind(phone)
    .bind(address)
    .bind(lat)
    .bind(lng)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
