use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create availabilities table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availabilities (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            staff_id VARCHAR(255) NOT NULL,
            owner_user_id VARCHAR(255) NOT NULL DEFAULT '',
            full_name VARCHAR(255) NOT NULL DEFAULT '',
            phone VARCHAR(64) NOT NULL DEFAULT '',
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            role VARCHAR(255) NOT NULL DEFAULT 'assistant',
            note TEXT NOT NULL DEFAULT '',
            status VARCHAR(16) NOT NULL DEFAULT 'open',
            booked_by_clinic_id VARCHAR(255) NULL,
            booked_at TIMESTAMP WITH TIME ZONE NULL,
            booked_note TEXT NOT NULL DEFAULT '',
            booked_hourly_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            shift_id UUID NULL,
            clinic_cleared_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT valid_availability_status
                CHECK (status IN ('open', 'booked', 'cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shifts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shifts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            clinic_id VARCHAR(255) NOT NULL,
            staff_id VARCHAR(255) NOT NULL,
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'scheduled',
            minutes_late INTEGER NOT NULL DEFAULT 0,
            hourly_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            note TEXT NOT NULL DEFAULT '',
            clinic_name VARCHAR(255) NOT NULL DEFAULT '',
            clinic_phone VARCHAR(64) NOT NULL DEFAULT '',
            clinic_address TEXT NOT NULL DEFAULT '',
            clinic_lat DOUBLE PRECISION NULL,
            clinic_lng DOUBLE PRECISION NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_shift_status
                CHECK (status IN ('scheduled', 'completed', 'late', 'cancelled', 'no_show'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create clinics table (directory read model; full CRUD lives elsewhere)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinics (
            clinic_id VARCHAR(255) PRIMARY KEY,
            name VARCHAR(255) NOT NULL DEFAULT '',
            phone VARCHAR(64) NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            lat DOUBLE PRECISION NULL,
            lng DOUBLE PRECISION NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create trust_scores table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trust_scores (
            staff_id VARCHAR(255) PRIMARY KEY,
            trust_score INTEGER NOT NULL DEFAULT 80,
            total_shifts INTEGER NOT NULL DEFAULT 0,
            completed INTEGER NOT NULL DEFAULT 0,
            late INTEGER NOT NULL DEFAULT 0,
            no_show INTEGER NOT NULL DEFAULT 0,
            cancelled_early INTEGER NOT NULL DEFAULT 0,
            last_no_show_at TIMESTAMP WITH TIME ZONE NULL,
            flags TEXT[] NOT NULL DEFAULT '{}',
            badges TEXT[] NOT NULL DEFAULT '{}',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT trust_score_bounds CHECK (trust_score BETWEEN 0 AND 100)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create attendance_events table (append-only)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_events (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            clinic_id VARCHAR(255) NOT NULL,
            staff_id VARCHAR(255) NOT NULL,
            shift_id VARCHAR(255) NOT NULL DEFAULT '',
            status VARCHAR(32) NOT NULL,
            minutes_late INTEGER NOT NULL DEFAULT 0,
            occurred_at TIMESTAMP WITH TIME ZONE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_attendance_status
                CHECK (status IN ('completed', 'late', 'no_show', 'cancelled_early'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create payroll_closes table; the unique index is the real guard
    // against closing the same month twice
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payroll_closes (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            clinic_id VARCHAR(255) NOT NULL,
            employee_id VARCHAR(255) NOT NULL,
            month VARCHAR(7) NOT NULL,
            gross_base DOUBLE PRECISION NOT NULL DEFAULT 0,
            ot_pay DOUBLE PRECISION NOT NULL DEFAULT 0,
            bonus DOUBLE PRECISION NOT NULL DEFAULT 0,
            other_allowance DOUBLE PRECISION NOT NULL DEFAULT 0,
            other_deduction DOUBLE PRECISION NOT NULL DEFAULT 0,
            sso_employee_monthly DOUBLE PRECISION NOT NULL DEFAULT 0,
            pvd_employee_monthly DOUBLE PRECISION NOT NULL DEFAULT 0,
            gross_monthly DOUBLE PRECISION NOT NULL DEFAULT 0,
            withheld_tax_monthly DOUBLE PRECISION NOT NULL DEFAULT 0,
            net_pay DOUBLE PRECISION NOT NULL DEFAULT 0,
            locked BOOLEAN NOT NULL DEFAULT TRUE,
            closed_by VARCHAR(255) NOT NULL DEFAULT '',
            closed_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT uq_payroll_close_employee_month UNIQUE (employee_id, month)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create tax_ytd table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tax_ytd (
            employee_id VARCHAR(255) NOT NULL,
            tax_year INTEGER NOT NULL,
            income_ytd DOUBLE PRECISION NOT NULL DEFAULT 0,
            sso_ytd DOUBLE PRECISION NOT NULL DEFAULT 0,
            pvd_ytd DOUBLE PRECISION NOT NULL DEFAULT 0,
            tax_paid_ytd DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (employee_id, tax_year)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_availabilities_status_date
            ON availabilities(status, date, start_time);
        CREATE INDEX IF NOT EXISTS idx_availabilities_staff_date
            ON availabilities(staff_id, date);
        CREATE INDEX IF NOT EXISTS idx_availabilities_booked_by
            ON availabilities(booked_by_clinic_id);
        CREATE INDEX IF NOT EXISTS idx_shifts_clinic_staff_date
            ON shifts(clinic_id, staff_id, date DESC);
        CREATE INDEX IF NOT EXISTS idx_shifts_staff_id ON shifts(staff_id);
        CREATE INDEX IF NOT EXISTS idx_attendance_events_staff_occurred
            ON attendance_events(staff_id, occurred_at DESC);
        CREATE INDEX IF NOT EXISTS idx_payroll_closes_employee
            ON payroll_closes(employee_id, month DESC);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
