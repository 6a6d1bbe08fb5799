use crate::models::{DbPayrollClose, DbTaxYtd};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const CLOSE_COLUMNS: &str = "id, clinic_id, employee_id, month, gross_base, ot_pay, bonus, \
     other_allowance, other_deduction, sso_employee_monthly, pvd_employee_monthly, \
     gross_monthly, withheld_tax_monthly, net_pay, locked, closed_by, closed_at";

const YTD_COLUMNS: &str =
    "employee_id, tax_year, income_ytd, sso_ytd, pvd_ytd, tax_paid_ytd, created_at, updated_at";

pub struct NewPayrollClose {
    pub clinic_id: String,
    pub employee_id: String,
    pub month: String,
    pub gross_base: f64,
    pub ot_pay: f64,
    pub bonus: f64,
    pub other_allowance: f64,
    pub other_deduction: f64,
    pub sso_employee_monthly: f64,
    pub pvd_employee_monthly: f64,
    pub gross_monthly: f64,
    pub withheld_tax_monthly: f64,
    pub net_pay: f64,
    pub closed_by: String,
}

pub async fn find_close(
    pool: &Pool<Postgres>,
    employee_id: &str,
    month: &str,
) -> Result<Option<DbPayrollClose>> {
    let row = sqlx::query_as::<_, DbPayrollClose>(&format!(
        "SELECT {CLOSE_COLUMNS} FROM payroll_closes WHERE employee_id = $1 AND month = $2"
    ))
    .bind(employee_id)
    .bind(month)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts the lock record. Returns `None` when another close for the same
/// employee and month beat us to the unique constraint.
pub async fn insert_close(
    pool: &Pool<Postgres>,
    new: NewPayrollClose,
) -> Result<Option<DbPayrollClose>> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Closing payroll month: employee_id={}, month={}",
        new.employee_id,
        new.month
    );

    let result = sqlx::query_as::<_, DbPayrollClose>(&format!(
        r#"
        INSERT INTO payroll_closes
            (id, clinic_id, employee_id, month, gross_base, ot_pay, bonus,
             other_allowance, other_deduction, sso_employee_monthly,
             pvd_employee_monthly, gross_monthly, withheld_tax_monthly,
             net_pay, locked, closed_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, TRUE, $15)
        RETURNING {CLOSE_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&new.clinic_id)
    .bind(&new.employee_id)
    .bind(&new.month)
    .bind(new.gross_base)
    .bind(new.ot_pay)
    .bind(new.bonus)
    .bind(new.other_allowance)
    .bind(new.other_deduction)
    .bind(new.sso_employee_monthly)
    .bind(new.pvd_employee_monthly)
    .bind(new.gross_monthly)
    .bind(new.withheld_tax_monthly)
    .bind(new.net_pay)
    .bind(&new.closed_by)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(Some(row)),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_closes(
    pool: &Pool<Postgres>,
    employee_id: &str,
) -> Result<Vec<DbPayrollClose>> {
    let rows = sqlx::query_as::<_, DbPayrollClose>(&format!(
        "SELECT {CLOSE_COLUMNS} FROM payroll_closes WHERE employee_id = $1 ORDER BY month DESC"
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn find_ytd(
    pool: &Pool<Postgres>,
    employee_id: &str,
    tax_year: i32,
) -> Result<Option<DbTaxYtd>> {
    let row = sqlx::query_as::<_, DbTaxYtd>(&format!(
        "SELECT {YTD_COLUMNS} FROM tax_ytd WHERE employee_id = $1 AND tax_year = $2"
    ))
    .bind(employee_id)
    .bind(tax_year)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Ensures a zeroed accumulator row exists and returns it either way.
pub async fn create_ytd(
    pool: &Pool<Postgres>,
    employee_id: &str,
    tax_year: i32,
) -> Result<DbTaxYtd> {
    let row = sqlx::query_as::<_, DbTaxYtd>(&format!(
        r#"
        INSERT INTO tax_ytd (employee_id, tax_year)
        VALUES ($1, $2)
        ON CONFLICT (employee_id, tax_year) DO UPDATE SET employee_id = EXCLUDED.employee_id
        RETURNING {YTD_COLUMNS}
        "#,
    ))
    .bind(employee_id)
    .bind(tax_year)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Writes the new absolute accumulator values computed by the caller.
pub async fn update_ytd(
    pool: &Pool<Postgres>,
    employee_id: &str,
    tax_year: i32,
    income_ytd: f64,
    sso_ytd: f64,
    pvd_ytd: f64,
    tax_paid_ytd: f64,
) -> Result<DbTaxYtd> {
    let row = sqlx::query_as::<_, DbTaxYtd>(&format!(
        r#"
        UPDATE tax_ytd
        SET income_ytd = $3,
            sso_ytd = $4,
            pvd_ytd = $5,
            tax_paid_ytd = $6,
            updated_at = NOW()
        WHERE employee_id = $1 AND tax_year = $2
        RETURNING {YTD_COLUMNS}
        "#,
    ))
    .bind(employee_id)
    .bind(tax_year)
    .bind(income_ytd)
    .bind(sso_ytd)
    .bind(pvd_ytd)
    .bind(tax_paid_ytd)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
