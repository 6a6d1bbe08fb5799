use crate::models::DbAvailability;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, staff_id, owner_user_id, full_name, phone, date, start_time, end_time, \
     role, note, status, booked_by_clinic_id, booked_at, booked_note, booked_hourly_rate, \
     shift_id, clinic_cleared_at, created_at, updated_at";

/// Date scoping for the open/booked listings.
#[derive(Debug, Clone, Copy)]
pub enum DateFilter {
    /// Exact calendar day.
    On(NaiveDate),
    /// Closed/half-open range; either bound may be absent.
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Everything from the given day forward.
    From(NaiveDate),
    Any,
}

fn push_date_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &DateFilter) {
    match filter {
        DateFilter::On(d) => {
            qb.push(" AND date = ").push_bind(*d);
        }
        DateFilter::Range { from, to } => {
            if let Some(from) = from {
                qb.push(" AND date >= ").push_bind(*from);
            }
            if let Some(to) = to {
                qb.push(" AND date <= ").push_bind(*to);
            }
        }
        DateFilter::From(d) => {
            qb.push(" AND date >= ").push_bind(*d);
        }
        DateFilter::Any => {}
    }
}

pub struct NewAvailability {
    pub staff_id: String,
    pub owner_user_id: String,
    pub full_name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub role: String,
    pub note: String,
}

pub async fn create_availability(
    pool: &Pool<Postgres>,
    new: NewAvailability,
) -> Result<DbAvailability> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating availability: id={}, staff_id={}, date={}",
        id,
        new.staff_id,
        new.date
    );

    let row = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        INSERT INTO availabilities
            (id, staff_id, owner_user_id, full_name, phone, date, start_time, end_time, role, note, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'open')
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&new.staff_id)
    .bind(&new.owner_user_id)
    .bind(&new.full_name)
    .bind(&new.phone)
    .bind(new.date)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(&new.role)
    .bind(&new.note)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAvailability>> {
    let row = sqlx::query_as::<_, DbAvailability>(&format!(
        "SELECT {COLUMNS} FROM availabilities WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Non-cancelled records for one staff member on one day; feeds the
/// creation-time overlap scan.
pub async fn active_on_day(
    pool: &Pool<Postgres>,
    staff_id: &str,
    date: NaiveDate,
) -> Result<Vec<DbAvailability>> {
    let rows = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        SELECT {COLUMNS} FROM availabilities
        WHERE staff_id = $1 AND date = $2 AND status <> 'cancelled'
        ORDER BY start_time ASC
        "#,
    ))
    .bind(staff_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_by_staff(
    pool: &Pool<Postgres>,
    staff_id: &str,
    status: Option<&str>,
) -> Result<Vec<DbAvailability>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM availabilities WHERE staff_id = "
    ));
    qb.push_bind(staff_id.to_string());
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    qb.push(" ORDER BY date ASC, start_time ASC");

    let rows = qb
        .build_query_as::<DbAvailability>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_open(
    pool: &Pool<Postgres>,
    filter: &DateFilter,
    role: Option<&str>,
) -> Result<Vec<DbAvailability>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM availabilities WHERE status = 'open'"
    ));
    push_date_filter(&mut qb, filter);
    if let Some(role) = role {
        qb.push(" AND role = ").push_bind(role.to_string());
    }
    qb.push(" ORDER BY date ASC, start_time ASC");

    let rows = qb
        .build_query_as::<DbAvailability>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Booked-and-not-yet-cleared records for one clinic.
pub async fn list_booked(
    pool: &Pool<Postgres>,
    clinic_id: &str,
    filter: &DateFilter,
) -> Result<Vec<DbAvailability>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM availabilities \
         WHERE status = 'booked' AND clinic_cleared_at IS NULL AND booked_by_clinic_id = "
    ));
    qb.push_bind(clinic_id.to_string());
    push_date_filter(&mut qb, filter);
    qb.push(" ORDER BY date ASC, start_time ASC");

    let rows = qb
        .build_query_as::<DbAvailability>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Staff-side cancel: always succeeds for an existing record and clears all
/// booking metadata. Ownership is checked by the caller beforehand.
pub async fn cancel(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAvailability>> {
    let row = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        UPDATE availabilities
        SET status = 'cancelled',
            booked_by_clinic_id = NULL,
            booked_at = NULL,
            shift_id = NULL,
            booked_note = '',
            booked_hourly_rate = 0,
            clinic_cleared_at = NULL,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The booking compare-and-swap. The status predicate and the update are one
/// statement, so two concurrent bookings of the same slot cannot both win;
/// the loser gets `None`.
pub async fn book_if_open(
    pool: &Pool<Postgres>,
    id: Uuid,
    clinic_id: &str,
    booked_note: &str,
    booked_hourly_rate: f64,
    booked_at: DateTime<Utc>,
) -> Result<Option<DbAvailability>> {
    tracing::debug!("Booking availability: id={}, clinic_id={}", id, clinic_id);

    let row = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        UPDATE availabilities
        SET status = 'booked',
            booked_by_clinic_id = $2,
            booked_at = $3,
            booked_note = $4,
            booked_hourly_rate = $5,
            clinic_cleared_at = NULL,
            updated_at = NOW()
        WHERE id = $1 AND status = 'open'
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(clinic_id)
    .bind(booked_at)
    .bind(booked_note)
    .bind(booked_hourly_rate)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Writes the materialized shift id back onto the booked record.
pub async fn attach_shift(
    pool: &Pool<Postgres>,
    id: Uuid,
    clinic_id: &str,
    shift_id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE availabilities
        SET shift_id = $3, updated_at = NOW()
        WHERE id = $1 AND status = 'booked' AND booked_by_clinic_id = $2
        "#,
    )
    .bind(id)
    .bind(clinic_id)
    .bind(shift_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Compensating update for a failed shift creation: reopens the slot and
/// clears every booking field. Best-effort; only touches the record if this
/// clinic still holds the booking.
pub async fn revert_booking(pool: &Pool<Postgres>, id: Uuid, clinic_id: &str) -> Result<()> {
    tracing::warn!("Reverting booking: id={}, clinic_id={}", id, clinic_id);

    sqlx::query(
        r#"
        UPDATE availabilities
        SET status = 'open',
            booked_by_clinic_id = NULL,
            booked_at = NULL,
            shift_id = NULL,
            booked_note = '',
            booked_hourly_rate = 0,
            clinic_cleared_at = NULL,
            updated_at = NOW()
        WHERE id = $1 AND status = 'booked' AND booked_by_clinic_id = $2
        "#,
    )
    .bind(id)
    .bind(clinic_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Clinic-side dismissal of a booked slot. Conditional on the clinic still
/// holding the booking and the slot not being cleared yet; never reopens.
pub async fn clear_booked(
    pool: &Pool<Postgres>,
    id: Uuid,
    clinic_id: &str,
    cleared_at: DateTime<Utc>,
) -> Result<Option<DbAvailability>> {
    let row = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        UPDATE availabilities
        SET clinic_cleared_at = $3, updated_at = NOW()
        WHERE id = $1
          AND status = 'booked'
          AND booked_by_clinic_id = $2
          AND clinic_cleared_at IS NULL
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(clinic_id)
    .bind(cleared_at)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
