use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monthly earning components supplied by the clinic at close time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EarningsComponents {
    #[serde(default)]
    pub gross_base: f64,
    #[serde(default)]
    pub ot_pay: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub other_allowance: f64,
    #[serde(default)]
    pub other_deduction: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloseMonthRequest {
    pub clinic_id: String,
    pub employee_id: String,
    /// Year-month key, "YYYY-MM".
    pub month: String,
    #[serde(flatten)]
    pub earnings: EarningsComponents,
    #[serde(default)]
    pub sso_employee_monthly: f64,
    #[serde(default)]
    pub pvd_employee_monthly: f64,
}

/// Immutable monthly closing record. Unique per (employee_id, month); no
/// update path exists once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollClose {
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

/// Running year-to-date tallies per (employee, tax year).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxYtd {
    pub employee_id: String,
    pub tax_year: i32,
    pub income_ytd: f64,
    pub sso_ytd: f64,
    pub pvd_ytd: f64,
    pub tax_paid_ytd: f64,
    pub updated_at: DateTime<Utc>,
}

/// Request body for the external tax-calculation service. Field names are
/// that service's wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct TaxCalcRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    #[serde(rename = "incomeYTD")]
    pub income_ytd: f64,
    #[serde(rename = "ssoYTD")]
    pub sso_ytd: f64,
    #[serde(rename = "pvdYTD")]
    pub pvd_ytd: f64,
    #[serde(rename = "taxPaidYTD")]
    pub tax_paid_ytd: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxCalcResponse {
    #[serde(rename = "withheldThisMonth", default)]
    pub withheld_this_month: f64,
    #[serde(rename = "taxDueYTD", default)]
    pub tax_due_ytd: f64,
    #[serde(rename = "taxableYTD", default)]
    pub taxable_ytd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloseMonthResponse {
    pub payroll_close: PayrollClose,
    pub ytd: TaxYtd,
    pub tax_calc: TaxCalcResponse,
}
