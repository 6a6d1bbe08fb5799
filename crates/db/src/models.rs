use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use locumdesk_core::models::{
    availability::Availability,
    clinic::Clinic,
    payroll::{PayrollClose, TaxYtd},
    shift::Shift,
    trust::{AttendanceEvent, AttendanceStatus, TrustScore},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailability {
    pub id: Uuid,
    pub staff_id: String,
    pub owner_user_id: String,
    pub full_name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub role: String,
    pub note: String,
    pub status: String,
    pub booked_by_clinic_id: Option<String>,
    pub booked_at: Option<DateTime<Utc>>,
    pub booked_note: String,
    pub booked_hourly_rate: f64,
    pub shift_id: Option<Uuid>,
    pub clinic_cleared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAvailability> for Availability {
    type Error = eyre::Report;

    fn try_from(row: DbAvailability) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| eyre!("availability {}: {e}", row.id))?;
        Ok(Availability {
            id: row.id,
            staff_id: row.staff_id,
            owner_user_id: row.owner_user_id,
            full_name: row.full_name,
            phone: row.phone,
            date: row.date,
            start: row.start_time,
            end: row.end_time,
            role: row.role,
            note: row.note,
            status,
            booked_by_clinic_id: row.booked_by_clinic_id,
            booked_at: row.booked_at,
            booked_note: row.booked_note,
            booked_hourly_rate: row.booked_hourly_rate,
            shift_id: row.shift_id,
            clinic_cleared_at: row.clinic_cleared_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShift {
    pub id: Uuid,
    pub clinic_id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub minutes_late: i32,
    pub hourly_rate: f64,
    pub note: String,
    pub clinic_name: String,
    pub clinic_phone: String,
    pub clinic_address: String,
    pub clinic_lat: Option<f64>,
    pub clinic_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbShift> for Shift {
    type Error = eyre::Report;

    fn try_from(row: DbShift) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| eyre!("shift {}: {e}", row.id))?;
        Ok(Shift {
            id: row.id,
            clinic_id: row.clinic_id,
            staff_id: row.staff_id,
            date: row.date,
            start: row.start_time,
            end: row.end_time,
            status,
            minutes_late: row.minutes_late,
            hourly_rate: row.hourly_rate,
            note: row.note,
            clinic_name: row.clinic_name,
            clinic_phone: row.clinic_phone,
            clinic_address: row.clinic_address,
            clinic_lat: row.clinic_lat,
            clinic_lng: row.clinic_lng,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClinic {
    pub clinic_id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbClinic> for Clinic {
    fn from(row: DbClinic) -> Self {
        Clinic {
            clinic_id: row.clinic_id,
            name: row.name,
            phone: row.phone,
            address: row.address,
            lat: row.lat,
            lng: row.lng,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTrustScore {
    pub staff_id: String,
    pub trust_score: i32,
    pub total_shifts: i32,
    pub completed: i32,
    pub late: i32,
    pub no_show: i32,
    pub cancelled_early: i32,
    pub last_no_show_at: Option<DateTime<Utc>>,
    pub flags: Vec<String>,
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbTrustScore> for TrustScore {
    fn from(row: DbTrustScore) -> Self {
        TrustScore {
            staff_id: row.staff_id,
            trust_score: row.trust_score,
            total_shifts: row.total_shifts,
            completed: row.completed,
            late: row.late,
            no_show: row.no_show,
            cancelled_early: row.cancelled_early,
            last_no_show_at: row.last_no_show_at,
            flags: row.flags,
            badges: row.badges,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAttendanceEvent {
    pub id: Uuid,
    pub clinic_id: String,
    pub staff_id: String,
    pub shift_id: String,
    pub status: String,
    pub minutes_late: i32,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbAttendanceEvent> for AttendanceEvent {
    type Error = eyre::Report;

    fn try_from(row: DbAttendanceEvent) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::parse(&row.status)
            .map_err(|e| eyre!("attendance event {}: {e}", row.id))?;
        Ok(AttendanceEvent {
            id: row.id,
            clinic_id: row.clinic_id,
            staff_id: row.staff_id,
            shift_id: row.shift_id,
            status,
            minutes_late: row.minutes_late,
            occurred_at: row.occurred_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPayrollClose {
    pub id: Uuid,
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
    pub locked: bool,
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
}

impl From<DbPayrollClose> for PayrollClose {
    fn from(row: DbPayrollClose) -> Self {
        PayrollClose {
            id: row.id,
            clinic_id: row.clinic_id,
            employee_id: row.employee_id,
            month: row.month,
            gross_base: row.gross_base,
            ot_pay: row.ot_pay,
            bonus: row.bonus,
            other_allowance: row.other_allowance,
            other_deduction: row.other_deduction,
            sso_employee_monthly: row.sso_employee_monthly,
            pvd_employee_monthly: row.pvd_employee_monthly,
            gross_monthly: row.gross_monthly,
            withheld_tax_monthly: row.withheld_tax_monthly,
            net_pay: row.net_pay,
            locked: row.locked,
            closed_by: row.closed_by,
            closed_at: row.closed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTaxYtd {
    pub employee_id: String,
    pub tax_year: i32,
    pub income_ytd: f64,
    pub sso_ytd: f64,
    pub pvd_ytd: f64,
    pub tax_paid_ytd: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbTaxYtd> for TaxYtd {
    fn from(row: DbTaxYtd) -> Self {
        TaxYtd {
            employee_id: row.employee_id,
            tax_year: row.tax_year,
            income_ytd: row.income_ytd,
            sso_ytd: row.sso_ytd,
            pvd_ytd: row.pvd_ytd,
            tax_paid_ytd: row.tax_paid_ytd,
            updated_at: row.updated_at,
        }
    }
}
