//! Payroll arithmetic for the month-close flow.
//!
//! All amounts are non-negative; negative inputs clamp to zero before any
//! other math so a bad component can never push gross or net below zero.

use crate::errors::{LocumError, LocumResult};
use crate::models::payroll::EarningsComponents;

/// Statutory monthly ceiling for the employee social-security contribution.
pub const SSO_MONTHLY_CEILING: f64 = 750.0;

pub fn clamp_min0(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// `max(0, base + ot + bonus + allowance - deduction)`, each component
/// clamped to >= 0 first.
pub fn compute_gross_monthly(earnings: &EarningsComponents) -> f64 {
    let gross = clamp_min0(earnings.gross_base)
        + clamp_min0(earnings.ot_pay)
        + clamp_min0(earnings.bonus)
        + clamp_min0(earnings.other_allowance)
        - clamp_min0(earnings.other_deduction);
    gross.max(0.0)
}

/// Employee SSO contribution clamped into [0, ceiling].
pub fn clamp_sso_monthly(v: f64) -> f64 {
    clamp_min0(v).min(SSO_MONTHLY_CEILING)
}

/// Provident-fund contribution is only clamped to >= 0.
pub fn clamp_pvd_monthly(v: f64) -> f64 {
    clamp_min0(v)
}

/// `max(0, gross - withheld - sso - pvd)`.
pub fn compute_net_pay(gross_monthly: f64, withheld_tax: f64, sso: f64, pvd: f64) -> f64 {
    (gross_monthly - withheld_tax - sso - pvd).max(0.0)
}

/// Derives the tax year from a "YYYY-MM" month key, validating the key shape.
pub fn month_to_tax_year(month: &str) -> LocumResult<i32> {
    let m = month.trim();
    let mut parts = m.splitn(2, '-');
    let year = parts
        .next()
        .and_then(|y| (y.len() == 4).then(|| y.parse::<i32>().ok()).flatten());
    let month_num = parts
        .next()
        .and_then(|mm| (mm.len() == 2).then(|| mm.parse::<u32>().ok()).flatten());

    match (year, month_num) {
        (Some(y), Some(mm)) if (1..=12).contains(&mm) => Ok(y),
        _ => Err(LocumError::Validation(format!(
            "month must be YYYY-MM, got '{m}'"
        ))),
    }
}
