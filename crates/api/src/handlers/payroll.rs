//! Payroll close handlers.
//!
//! Closing a month snapshots the employee's earning components, rolls the
//! year-to-date tallies forward, asks the external tax service for the
//! withholding amount, and writes the immutable close record. The close is
//! all-or-nothing with respect to the lock: if the tax call fails nothing
//! is locked, and the unique constraint on (employee, month) is the final
//! arbiter between concurrent closers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use locumdesk_core::{
    errors::LocumError,
    models::auth::Role,
    models::payroll::{
        CloseMonthRequest, CloseMonthResponse, PayrollClose, TaxCalcRequest, TaxYtd,
    },
    payroll as math,
};
use locumdesk_db::repositories::payroll::{self, NewPayrollClose};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

/// Closes one employee-month.
#[axum::debug_handler]
pub async fn close_month(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CloseMonthRequest>,
) -> Result<Response, AppError> {
    user.require_admin_or_system()?;
    if user.role == Role::Admin && user.clinic_id != payload.clinic_id {
        return Err(AppError(LocumError::Authorization(
            "cannot close payroll for another clinic".to_string(),
        )));
    }
    if payload.employee_id.trim().is_empty() {
        return Err(AppError(LocumError::Validation(
            "employee_id is required".to_string(),
        )));
    }

    let employee_id = payload.employee_id.trim().to_string();
    let month = payload.month.trim().to_string();
    let tax_year = math::month_to_tax_year(&month)?;

    // Cheap early reject; the insert's unique constraint is the real guard
    if payroll::find_close(&state.db_pool, &employee_id, &month)
        .await
        .map_err(LocumError::Database)?
        .is_some()
    {
        return Err(AppError(LocumError::Conflict(format!(
            "month {month} already closed for employee {employee_id}"
        ))));
    }

    // Monthly amounts, all clamped before any arithmetic
    let gross_monthly = math::compute_gross_monthly(&payload.earnings);
    let sso_monthly = math::clamp_sso_monthly(payload.sso_employee_monthly);
    let pvd_monthly = math::clamp_pvd_monthly(payload.pvd_employee_monthly);

    // Roll the YTD tallies forward over the existing accumulator, creating
    // the zeroed row lazily on the employee's first close of the year
    let prior = match payroll::find_ytd(&state.db_pool, &employee_id, tax_year)
        .await
        .map_err(LocumError::Database)?
    {
        Some(row) => row,
        None => payroll::create_ytd(&state.db_pool, &employee_id, tax_year)
            .await
            .map_err(LocumError::Database)?,
    };
    let income_ytd = prior.income_ytd + gross_monthly;
    let sso_ytd = prior.sso_ytd + sso_monthly;
    let pvd_ytd = prior.pvd_ytd + pvd_monthly;

    // Withholding comes from the external tax service; failure aborts the
    // close before anything is locked
    let tax_request = TaxCalcRequest {
        user_id: user.user_id.clone(),
        employee_id: employee_id.clone(),
        income_ytd,
        sso_ytd,
        pvd_ytd,
        tax_paid_ytd: prior.tax_paid_ytd,
    };
    let tax_calc = state.tax_client.calc_tax_ytd(tax_year, &tax_request).await?;

    let withheld_tax_monthly = math::clamp_min0(tax_calc.withheld_this_month);
    let net_pay = math::compute_net_pay(gross_monthly, withheld_tax_monthly, sso_monthly, pvd_monthly);

    let inserted = payroll::insert_close(
        &state.db_pool,
        NewPayrollClose {
            clinic_id: payload.clinic_id.clone(),
            employee_id: employee_id.clone(),
            month: month.clone(),
            gross_base: math::clamp_min0(payload.earnings.gross_base),
            ot_pay: math::clamp_min0(payload.earnings.ot_pay),
            bonus: math::clamp_min0(payload.earnings.bonus),
            other_allowance: math::clamp_min0(payload.earnings.other_allowance),
            other_deduction: math::clamp_min0(payload.earnings.other_deduction),
            sso_employee_monthly: sso_monthly,
            pvd_employee_monthly: pvd_monthly,
            gross_monthly,
            withheld_tax_monthly,
            net_pay,
            closed_by: user.user_id.clone(),
        },
    )
    .await
    .map_err(LocumError::Database)?
    .ok_or_else(|| {
        LocumError::Conflict(format!(
            "month {month} already closed for employee {employee_id}"
        ))
    })?;

    // The accumulator update is not transactional with the insert; the
    // close record is authoritative and the accumulator can be replayed
    // from closes if the process dies between the two writes
    let ytd_row = payroll::update_ytd(
        &state.db_pool,
        &employee_id,
        tax_year,
        income_ytd,
        sso_ytd,
        pvd_ytd,
        prior.tax_paid_ytd + withheld_tax_monthly,
    )
    .await
    .map_err(LocumError::Database)?;

    let body = CloseMonthResponse {
        payroll_close: PayrollClose::from(inserted),
        ytd: TaxYtd::from(ytd_row),
        tax_calc,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Close history for one employee, newest month first.
#[axum::debug_handler]
pub async fn get_closed_months(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<String>,
) -> Result<Json<Vec<PayrollClose>>, AppError> {
    user.require_admin_or_system()?;

    let rows = payroll::list_closes(&state.db_pool, &employee_id)
        .await
        .map_err(LocumError::Database)?;

    let closes = rows
        .into_iter()
        .filter(|r| user.role != Role::Admin || r.clinic_id == user.clinic_id)
        .map(PayrollClose::from)
        .collect();
    Ok(Json(closes))
}
