use crate::models::DbClinic;
use eyre::Result;
use sqlx::{Pool, Postgres};

const COLUMNS: &str = "clinic_id, name, phone, address, lat, lng, created_at, updated_at";

pub async fn get_clinic(pool: &Pool<Postgres>, clinic_id: &str) -> Result<Option<DbClinic>> {
    let row = sqlx::query_as::<_, DbClinic>(&format!(
        "SELECT {COLUMNS} FROM clinics WHERE clinic_id = $1"
    ))
    .bind(clinic_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Batch lookup for contact enrichment; one query per distinct-id set.
pub async fn get_clinics_by_ids(
    pool: &Pool<Postgres>,
    clinic_ids: &[String],
) -> Result<Vec<DbClinic>> {
    if clinic_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, DbClinic>(&format!(
        "SELECT {COLUMNS} FROM clinics WHERE clinic_id = ANY($1)"
    ))
    .bind(clinic_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Directory write used by the clinic-location endpoint. Empty strings leave
/// the stored value in place so a location-only update keeps the name.
pub async fn upsert_clinic(
    pool: &Pool<Postgres>,
    clinic_id: &str,
    name: &str,
    phone: &str,
    address: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<DbClinic> {
    let row = sqlx::query_as::<_, DbClinic>(&format!(
        r#"
        INSERT INTO clinics (clinic_id, name, phone, address, lat, lng)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (clinic_id) DO UPDATE
        SET name = COALESCE(NULLIF(EXCLUDED.name, ''), clinics.name),
            phone = COALESCE(NULLIF(EXCLUDED.phone, ''), clinics.phone),
            address = COALESCE(NULLIF(EXCLUDED.address, ''), clinics.address),
            lat = EXCLUDED.lat,
            lng = EXCLUDED.lng,
            updated_at = NOW()
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(clinic_id)
    .bind(name)
    .bind(phone)
    .bind(address)
    .bind(lat)
    .bind(lng)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
