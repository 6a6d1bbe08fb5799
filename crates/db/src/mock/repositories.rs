use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    DbAttendanceEvent, DbAvailability, DbClinic, DbPayrollClose, DbShift, DbTaxYtd, DbTrustScore,
};
use crate::repositories::availability::{DateFilter, NewAvailability};
use crate::repositories::payroll::NewPayrollClose;
use crate::repositories::shift::NewShift;
use crate::repositories::trust::NewAttendanceEvent;
use locumdesk_core::models::trust::TrustScore;

// Mock repositories for handler tests
mock! {
    pub AvailabilityRepo {
        pub async fn create_availability(
            &self,
            new: NewAvailability,
        ) -> eyre::Result<DbAvailability>;

        pub async fn find_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbAvailability>>;

        pub async fn active_on_day(
            &self,
            staff_id: &'static str,
            date: NaiveDate,
        ) -> eyre::Result<Vec<DbAvailability>>;

        pub async fn list_by_staff(
            &self,
            staff_id: &'static str,
            status: Option<&'static str>,
        ) -> eyre::Result<Vec<DbAvailability>>;

        pub async fn list_open(
            &self,
            filter: DateFilter,
            role: Option<&'static str>,
        ) -> eyre::Result<Vec<DbAvailability>>;

        pub async fn list_booked(
            &self,
            clinic_id: &'static str,
            filter: DateFilter,
        ) -> eyre::Result<Vec<DbAvailability>>;

        pub async fn cancel(&self, id: Uuid) -> eyre::Result<Option<DbAvailability>>;

        pub async fn book_if_open(
            &self,
            id: Uuid,
            clinic_id: &'static str,
            booked_note: &'static str,
            booked_hourly_rate: f64,
            booked_at: DateTime<Utc>,
        ) -> eyre::Result<Option<DbAvailability>>;

        pub async fn attach_shift(
            &self,
            id: Uuid,
            clinic_id: &'static str,
            shift_id: Uuid,
        ) -> eyre::Result<()>;

        pub async fn revert_booking(
            &self,
            id: Uuid,
            clinic_id: &'static str,
        ) -> eyre::Result<()>;

        pub async fn clear_booked(
            &self,
            id: Uuid,
            clinic_id: &'static str,
            cleared_at: DateTime<Utc>,
        ) -> eyre::Result<Option<DbAvailability>>;
    }
}

mock! {
    pub ShiftRepo {
        pub async fn create_shift(&self, new: NewShift) -> eyre::Result<DbShift>;

        pub async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<DbShift>>;

        pub async fn list_shifts(
            &self,
            clinic_id: Option<&'static str>,
            staff_id: Option<&'static str>,
        ) -> eyre::Result<Vec<DbShift>>;

        pub async fn update_status(
            &self,
            id: Uuid,
            status: &'static str,
            minutes_late: i32,
        ) -> eyre::Result<Option<DbShift>>;

        pub async fn delete_shift(&self, id: Uuid) -> eyre::Result<bool>;

        pub async fn backfill_clinic_contact(
            &self,
            clinic_id: &'static str,
            name: &'static str,
            phone: &'static str,
            address: &'static str,
            lat: Option<f64>,
            lng: Option<f64>,
        ) -> eyre::Result<u64>;
    }
}

mock! {
    pub ClinicRepo {
        pub async fn get_clinic(
            &self,
            clinic_id: &'static str,
        ) -> eyre::Result<Option<DbClinic>>;

        pub async fn get_clinics_by_ids(
            &self,
            clinic_ids: Vec<String>,
        ) -> eyre::Result<Vec<DbClinic>>;

        pub async fn upsert_clinic(
            &self,
            clinic_id: &'static str,
            name: &'static str,
            phone: &'static str,
            address: &'static str,
            lat: Option<f64>,
            lng: Option<f64>,
        ) -> eyre::Result<DbClinic>;
    }
}

mock! {
    pub TrustRepo {
        pub async fn insert_event(
            &self,
            new: NewAttendanceEvent,
        ) -> eyre::Result<DbAttendanceEvent>;

        pub async fn find_score(
            &self,
            staff_id: &'static str,
        ) -> eyre::Result<Option<DbTrustScore>>;

        pub async fn create_default_score(
            &self,
            staff_id: &'static str,
            base_score: i32,
        ) -> eyre::Result<DbTrustScore>;

        pub async fn update_score(&self, score: TrustScore) -> eyre::Result<DbTrustScore>;

        pub async fn list_recommendable(
            &self,
            excluded_flag: &'static str,
            limit: i64,
        ) -> eyre::Result<Vec<DbTrustScore>>;
    }
}

mock! {
    pub PayrollRepo {
        pub async fn find_close(
            &self,
            employee_id: &'static str,
            month: &'static str,
        ) -> eyre::Result<Option<DbPayrollClose>>;

        pub async fn insert_close(
            &self,
            new: NewPayrollClose,
        ) -> eyre::Result<Option<DbPayrollClose>>;

        pub async fn list_closes(
            &self,
            employee_id: &'static str,
        ) -> eyre::Result<Vec<DbPayrollClose>>;

        pub async fn find_ytd(
            &self,
            employee_id: &'static str,
            tax_year: i32,
        ) -> eyre::Result<Option<DbTaxYtd>>;

        pub async fn create_ytd(
            &self,
            employee_id: &'static str,
            tax_year: i32,
        ) -> eyre::Result<DbTaxYtd>;

        pub async fn update_ytd(
            &self,
            employee_id: &'static str,
            tax_year: i32,
            income_ytd: f64,
            sso_ytd: f64,
            pvd_ytd: f64,
            tax_paid_ytd: f64,
        ) -> eyre::Result<DbTaxYtd>;
    }
}

pub mod sample {
    //! Canned rows shared by handler tests.

    use super::*;

    pub fn availability(staff_id: &str) -> DbAvailability {
        let now = Utc::now();
        DbAvailability {
            id: Uuid::new_v4(),
            staff_id: staff_id.to_string(),
            owner_user_id: "user-1".to_string(),
            full_name: "Test Assistant".to_string(),
            phone: "0800000000".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default(),
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            role: "assistant".to_string(),
            note: String::new(),
            status: "open".to_string(),
            booked_by_clinic_id: None,
            booked_at: None,
            booked_note: String::new(),
            booked_hourly_rate: 0.0,
            shift_id: None,
            clinic_cleared_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn booked_availability(staff_id: &str, clinic_id: &str) -> DbAvailability {
        let mut row = availability(staff_id);
        row.status = "booked".to_string();
        row.booked_by_clinic_id = Some(clinic_id.to_string());
        row.booked_at = Some(Utc::now());
        row.booked_hourly_rate = 120.0;
        row
    }

    pub fn shift(clinic_id: &str, staff_id: &str) -> DbShift {
        let now = Utc::now();
        DbShift {
            id: Uuid::new_v4(),
            clinic_id: clinic_id.to_string(),
            staff_id: staff_id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default(),
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            status: "scheduled".to_string(),
            minutes_late: 0,
            hourly_rate: 120.0,
            note: String::new(),
            clinic_name: "Test Clinic".to_string(),
            clinic_phone: "021234567".to_string(),
            clinic_address: "1 Main Rd".to_string(),
            clinic_lat: None,
            clinic_lng: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn trust_score(staff_id: &str) -> DbTrustScore {
        let now = Utc::now();
        DbTrustScore {
            staff_id: staff_id.to_string(),
            trust_score: 80,
            total_shifts: 0,
            completed: 0,
            late: 0,
            no_show: 0,
            cancelled_early: 0,
            last_no_show_at: None,
            flags: Vec::new(),
            badges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn tax_ytd(employee_id: &str, tax_year: i32) -> DbTaxYtd {
        let now = Utc::now();
        DbTaxYtd {
            employee_id: employee_id.to_string(),
            tax_year,
            income_ytd: 0.0,
            sso_ytd: 0.0,
            pvd_ytd: 0.0,
            tax_paid_ytd: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn payroll_close(employee_id: &str, month: &str) -> DbPayrollClose {
        DbPayrollClose {
            id: Uuid::new_v4(),
            clinic_id: "clinic-1".to_string(),
            employee_id: employee_id.to_string(),
            month: month.to_string(),
            gross_base: 30000.0,
            ot_pay: 0.0,
            bonus: 0.0,
            other_allowance: 0.0,
            other_deduction: 0.0,
            sso_employee_monthly: 750.0,
            pvd_employee_monthly: 0.0,
            gross_monthly: 30000.0,
            withheld_tax_monthly: 500.0,
            net_pay: 28750.0,
            locked: true,
            closed_by: "user-1".to_string(),
            closed_at: Utc::now(),
        }
    }
}
