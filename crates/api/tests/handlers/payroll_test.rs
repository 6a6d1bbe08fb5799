use locumdesk_api::middleware::error_handling::AppError;
use locumdesk_core::errors::LocumError;
use locumdesk_core::models::payroll::{EarningsComponents, TaxCalcResponse};
use locumdesk_core::payroll as math;
use locumdesk_db::mock::repositories::sample;
use locumdesk_db::models::{DbPayrollClose, DbTaxYtd};
use locumdesk_db::repositories::payroll::NewPayrollClose;

use crate::test_utils::TestContext;

// Mirrors the close-month flow over the mocks, with the tax answer stubbed
// the way a successful upstream call would return it.
async fn test_close_wrapper(
    ctx: &mut TestContext,
    employee_id: &'static str,
    month: &'static str,
    earnings: EarningsComponents,
    sso_monthly: f64,
    pvd_monthly: f64,
    tax_calc: TaxCalcResponse,
) -> Result<(DbPayrollClose, DbTaxYtd), AppError> {
    let tax_year = math::month_to_tax_year(month)?;

    if ctx
        .payroll_repo
        .find_close(employee_id, month)
        .await
        .map_err(LocumError::Database)?
        .is_some()
    {
        return Err(AppError(LocumError::Conflict(format!(
            "month {month} already closed for employee {employee_id}"
        ))));
    }

    let gross_monthly = math::compute_gross_monthly(&earnings);
    let sso = math::clamp_sso_monthly(sso_monthly);
    let pvd = math::clamp_pvd_monthly(pvd_monthly);

    let prior = match ctx
        .payroll_repo
        .find_ytd(employee_id, tax_year)
        .await
        .map_err(LocumError::Database)?
    {
        Some(row) => row,
        None => ctx
            .payroll_repo
            .create_ytd(employee_id, tax_year)
            .await
            .map_err(LocumError::Database)?,
    };
    let income_ytd = prior.income_ytd + gross_monthly;
    let sso_ytd = prior.sso_ytd + sso;
    let pvd_ytd = prior.pvd_ytd + pvd;

    let withheld = math::clamp_min0(tax_calc.withheld_this_month);
    let net_pay = math::compute_net_pay(gross_monthly, withheld, sso, pvd);

    let inserted = ctx
        .payroll_repo
        .insert_close(NewPayrollClose {
            clinic_id: "clinic-1".to_string(),
            employee_id: employee_id.to_string(),
            month: month.to_string(),
            gross_base: math::clamp_min0(earnings.gross_base),
            ot_pay: math::clamp_min0(earnings.ot_pay),
            bonus: math::clamp_min0(earnings.bonus),
            other_allowance: math::clamp_min0(earnings.other_allowance),
            other_deduction: math::clamp_min0(earnings.other_deduction),
            sso_employee_monthly: sso,
            pvd_employee_monthly: pvd,
            gross_monthly,
            withheld_tax_monthly: withheld,
            net_pay,
            closed_by: "admin-1".to_string(),
        })
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| {
            LocumError::Conflict(format!(
                "month {month} already closed for employee {employee_id}"
            ))
        })?;

    let ytd = ctx
        .payroll_repo
        .update_ytd(
            employee_id,
            tax_year,
            income_ytd,
            sso_ytd,
            pvd_ytd,
            prior.tax_paid_ytd + withheld,
        )
        .await
        .map_err(LocumError::Database)?;

    Ok((inserted, ytd))
}

fn earnings(gross_base: f64) -> EarningsComponents {
    EarningsComponents {
        gross_base,
        ot_pay: 0.0,
        bonus: 0.0,
        other_allowance: 0.0,
        other_deduction: 0.0,
    }
}

#[tokio::test]
async fn test_close_month_happy_path_math() {
    let mut ctx = TestContext::new();

    ctx.payroll_repo
        .expect_find_close()
        .returning(|_, _| Ok(None));
    // First close of the year: no accumulator yet, the zeroed row is created
    ctx.payroll_repo
        .expect_find_ytd()
        .returning(|_, _| Ok(None));
    ctx.payroll_repo
        .expect_create_ytd()
        .times(1)
        .returning(|employee_id, tax_year| Ok(sample::tax_ytd(employee_id, tax_year)));
    ctx.payroll_repo.expect_insert_close().returning(|new| {
        let mut close = sample::payroll_close(&new.employee_id, &new.month);
        close.gross_monthly = new.gross_monthly;
        close.withheld_tax_monthly = new.withheld_tax_monthly;
        close.net_pay = new.net_pay;
        close.sso_employee_monthly = new.sso_employee_monthly;
        Ok(Some(close))
    });
    ctx.payroll_repo.expect_update_ytd().returning(
        |employee_id, tax_year, income, sso, pvd, tax_paid| {
            let mut ytd = sample::tax_ytd(employee_id, tax_year);
            ytd.income_ytd = income;
            ytd.sso_ytd = sso;
            ytd.pvd_ytd = pvd;
            ytd.tax_paid_ytd = tax_paid;
            Ok(ytd)
        },
    );

    let tax_calc = TaxCalcResponse {
        withheld_this_month: 500.0,
        tax_due_ytd: 500.0,
        taxable_ytd: 30000.0,
    };
    let (close, ytd) = test_close_wrapper(
        &mut ctx,
        "emp-1",
        "2026-01",
        earnings(30000.0),
        900.0, // over the SSO ceiling, must clamp to 750
        0.0,
        tax_calc,
    )
    .await
    .expect("close should succeed");

    assert_eq!(close.gross_monthly, 30000.0);
    assert_eq!(close.sso_employee_monthly, 750.0);
    assert_eq!(close.withheld_tax_monthly, 500.0);
    assert_eq!(close.net_pay, 28750.0);

    assert_eq!(ytd.income_ytd, 30000.0);
    assert_eq!(ytd.sso_ytd, 750.0);
    assert_eq!(ytd.tax_paid_ytd, 500.0);
}

#[tokio::test]
async fn test_close_month_rolls_forward_existing_accumulator() {
    let mut ctx = TestContext::new();

    ctx.payroll_repo
        .expect_find_close()
        .returning(|_, _| Ok(None));
    // January already closed, so the accumulator exists and is not recreated
    ctx.payroll_repo
        .expect_find_ytd()
        .returning(|employee_id, tax_year| {
            let mut ytd = sample::tax_ytd(employee_id, tax_year);
            ytd.income_ytd = 30000.0;
            ytd.sso_ytd = 750.0;
            ytd.tax_paid_ytd = 500.0;
            Ok(Some(ytd))
        });
    ctx.payroll_repo.expect_create_ytd().times(0);
    ctx.payroll_repo
        .expect_insert_close()
        .returning(|new| Ok(Some(sample::payroll_close(&new.employee_id, &new.month))));
    ctx.payroll_repo.expect_update_ytd().returning(
        |employee_id, tax_year, income, sso, pvd, tax_paid| {
            let mut ytd = sample::tax_ytd(employee_id, tax_year);
            ytd.income_ytd = income;
            ytd.sso_ytd = sso;
            ytd.pvd_ytd = pvd;
            ytd.tax_paid_ytd = tax_paid;
            Ok(ytd)
        },
    );

    let tax_calc = TaxCalcResponse {
        withheld_this_month: 500.0,
        tax_due_ytd: 1000.0,
        taxable_ytd: 60000.0,
    };
    let (_, ytd) = test_close_wrapper(
        &mut ctx,
        "emp-1",
        "2026-02",
        earnings(30000.0),
        750.0,
        0.0,
        tax_calc,
    )
    .await
    .expect("second month should close");

    assert_eq!(ytd.income_ytd, 60000.0);
    assert_eq!(ytd.sso_ytd, 1500.0);
    assert_eq!(ytd.tax_paid_ytd, 1000.0);
}

#[tokio::test]
async fn test_close_month_rejects_already_closed() {
    let mut ctx = TestContext::new();

    ctx.payroll_repo
        .expect_find_close()
        .returning(|employee_id, month| Ok(Some(sample::payroll_close(employee_id, month))));
    ctx.payroll_repo.expect_insert_close().times(0);
    ctx.payroll_repo.expect_update_ytd().times(0);

    let result = test_close_wrapper(
        &mut ctx,
        "emp-1",
        "2026-01",
        earnings(30000.0),
        750.0,
        0.0,
        TaxCalcResponse::default(),
    )
    .await;

    let err = result.expect_err("second close must conflict");
    assert!(matches!(err.0, LocumError::Conflict(_)));
}

#[tokio::test]
async fn test_close_month_conflict_when_unique_constraint_wins() {
    let mut ctx = TestContext::new();

    // Lookup saw nothing but a concurrent closer hit the constraint first
    ctx.payroll_repo
        .expect_find_close()
        .returning(|_, _| Ok(None));
    ctx.payroll_repo
        .expect_find_ytd()
        .returning(|_, _| Ok(None));
    ctx.payroll_repo
        .expect_create_ytd()
        .returning(|employee_id, tax_year| Ok(sample::tax_ytd(employee_id, tax_year)));
    ctx.payroll_repo
        .expect_insert_close()
        .returning(|_| Ok(None));
    ctx.payroll_repo.expect_update_ytd().times(0);

    let result = test_close_wrapper(
        &mut ctx,
        "emp-1",
        "2026-01",
        earnings(30000.0),
        750.0,
        0.0,
        TaxCalcResponse::default(),
    )
    .await;

    let err = result.expect_err("constraint loser must conflict");
    assert!(matches!(err.0, LocumError::Conflict(_)));
}

#[tokio::test]
async fn test_close_month_rejects_bad_month_key() {
    let mut ctx = TestContext::new();
    ctx.payroll_repo.expect_find_close().times(0);

    let result = test_close_wrapper(
        &mut ctx,
        "emp-1",
        "2026-13",
        earnings(30000.0),
        0.0,
        0.0,
        TaxCalcResponse::default(),
    )
    .await;

    let err = result.expect_err("invalid month key must fail");
    assert!(matches!(err.0, LocumError::Validation(_)));
}
