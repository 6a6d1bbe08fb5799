use chrono::Utc;
use locumdesk_api::middleware::error_handling::AppError;
use locumdesk_core::errors::LocumError;
use locumdesk_core::slots;
use locumdesk_db::mock::repositories::sample;
use locumdesk_db::models::{DbAvailability, DbShift};
use locumdesk_db::repositories::shift::NewShift;
use uuid::Uuid;

use crate::test_utils::TestContext;

// Mirrors the booking saga over the mocks: compare-and-swap first, then
// shift creation, with a compensating revert on any failure after the swap.
async fn test_book_wrapper(
    ctx: &mut TestContext,
    id: Uuid,
    clinic_id: &'static str,
) -> Result<(DbAvailability, DbShift), AppError> {
    let booked = ctx
        .availability_repo
        .book_if_open(id, clinic_id, "", 120.0, Utc::now())
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| LocumError::Conflict("availability is not open".to_string()))?;

    let shift_result = async {
        let row = ctx
            .shift_repo
            .create_shift(NewShift {
                clinic_id: clinic_id.to_string(),
                staff_id: booked.staff_id.clone(),
                date: booked.date,
                start_time: booked.start_time,
                end_time: booked.end_time,
                hourly_rate: 120.0,
                note: String::new(),
                clinic_name: "Test Clinic".to_string(),
                clinic_phone: String::new(),
                clinic_address: String::new(),
                clinic_lat: None,
                clinic_lng: None,
            })
            .await
            .map_err(LocumError::Database)?;

        ctx.availability_repo
            .attach_shift(id, clinic_id, row.id)
            .await
            .map_err(LocumError::Database)?;

        Ok::<DbShift, LocumError>(row)
    }
    .await;

    match shift_result {
        Ok(shift) => Ok((booked, shift)),
        Err(err) => {
            let _ = ctx.availability_repo.revert_booking(id, clinic_id).await;
            Err(err.into())
        }
    }
}

#[tokio::test]
async fn test_book_success_creates_shift_and_attaches_it() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.availability_repo
        .expect_book_if_open()
        .times(1)
        .returning(move |_, clinic_id, _, _, _| {
            Ok(Some(sample::booked_availability("staff-1", clinic_id)))
        });
    ctx.shift_repo
        .expect_create_shift()
        .times(1)
        .returning(|new| Ok(sample::shift(&new.clinic_id, &new.staff_id)));
    ctx.availability_repo
        .expect_attach_shift()
        .times(1)
        .returning(|_, _, _| Ok(()));
    ctx.availability_repo.expect_revert_booking().times(0);

    let result = test_book_wrapper(&mut ctx, id, "clinic-1").await;

    let (booked, shift) = result.expect("booking should succeed");
    assert_eq!(booked.status, "booked");
    assert_eq!(booked.booked_by_clinic_id.as_deref(), Some("clinic-1"));
    assert_eq!(shift.clinic_id, "clinic-1");
    assert_eq!(shift.staff_id, "staff-1");
    assert_eq!(shift.status, "scheduled");
}

#[tokio::test]
async fn test_book_lost_race_is_conflict_and_touches_nothing_else() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    // Another clinic won the swap: the CAS returns no row
    ctx.availability_repo
        .expect_book_if_open()
        .times(1)
        .returning(|_, _, _, _, _| Ok(None));
    ctx.shift_repo.expect_create_shift().times(0);
    ctx.availability_repo.expect_revert_booking().times(0);

    let result = test_book_wrapper(&mut ctx, id, "clinic-2").await;

    let err = result.expect_err("lost race must fail");
    assert!(matches!(err.0, LocumError::Conflict(_)));
}

#[tokio::test]
async fn test_book_reverts_when_shift_creation_fails() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.availability_repo
        .expect_book_if_open()
        .times(1)
        .returning(move |_, clinic_id, _, _, _| {
            Ok(Some(sample::booked_availability("staff-1", clinic_id)))
        });
    ctx.shift_repo
        .expect_create_shift()
        .times(1)
        .returning(|_| Err(eyre::eyre!("insert failed")));
    // The compensating revert must run exactly once
    ctx.availability_repo
        .expect_revert_booking()
        .times(1)
        .returning(|_, _| Ok(()));
    ctx.availability_repo.expect_attach_shift().times(0);

    let result = test_book_wrapper(&mut ctx, id, "clinic-1").await;

    let err = result.expect_err("shift failure must surface");
    assert!(matches!(err.0, LocumError::Database(_)));
}

#[tokio::test]
async fn test_book_reverts_when_attach_fails() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.availability_repo
        .expect_book_if_open()
        .times(1)
        .returning(move |_, clinic_id, _, _, _| {
            Ok(Some(sample::booked_availability("staff-1", clinic_id)))
        });
    ctx.shift_repo
        .expect_create_shift()
        .times(1)
        .returning(|new| Ok(sample::shift(&new.clinic_id, &new.staff_id)));
    ctx.availability_repo
        .expect_attach_shift()
        .times(1)
        .returning(|_, _, _| Err(eyre::eyre!("write failed")));
    ctx.availability_repo
        .expect_revert_booking()
        .times(1)
        .returning(|_, _| Ok(()));

    let result = test_book_wrapper(&mut ctx, id, "clinic-1").await;
    assert!(result.is_err());
}

// Creation-time overlap scan over the mock, mirroring the handler's check.
async fn test_create_wrapper(
    ctx: &mut TestContext,
    staff_id: &'static str,
    start: chrono::NaiveTime,
    end: chrono::NaiveTime,
) -> Result<(), AppError> {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    let existing = ctx
        .availability_repo
        .active_on_day(staff_id, date)
        .await
        .map_err(LocumError::Database)?;

    if existing
        .iter()
        .any(|a| slots::overlaps(start, end, a.start_time, a.end_time))
    {
        return Err(AppError(LocumError::Conflict(
            "overlapping availability on the same day".to_string(),
        )));
    }
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_overlapping_window() {
    let mut ctx = TestContext::new();

    // Existing 09:00-17:00 slot
    ctx.availability_repo
        .expect_active_on_day()
        .returning(|staff_id, _| Ok(vec![sample::availability(staff_id)]));

    let start = chrono::NaiveTime::from_hms_opt(16, 0, 0).unwrap();
    let end = chrono::NaiveTime::from_hms_opt(20, 0, 0).unwrap();
    let result = test_create_wrapper(&mut ctx, "staff-1", start, end).await;

    let err = result.expect_err("overlap must be rejected");
    assert!(matches!(err.0, LocumError::Conflict(_)));
}

// Clinic-side clearing over the mock, mirroring the handler's conditional
// update chain: a missed predicate is a Conflict, not a missing resource.
async fn test_clear_wrapper(
    ctx: &mut TestContext,
    id: Uuid,
    clinic_id: &'static str,
) -> Result<DbAvailability, AppError> {
    let row = ctx
        .availability_repo
        .clear_booked(id, clinic_id, Utc::now())
        .await
        .map_err(LocumError::Database)?
        .ok_or_else(|| {
            LocumError::Conflict(format!(
                "Availability {id} is not an active booking of this clinic"
            ))
        })?;
    Ok(row)
}

#[tokio::test]
async fn test_clear_returns_the_cleared_row() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.availability_repo
        .expect_clear_booked()
        .times(1)
        .returning(|_, clinic_id, cleared_at| {
            let mut row = sample::booked_availability("staff-1", clinic_id);
            row.clinic_cleared_at = Some(cleared_at);
            Ok(Some(row))
        });

    let row = test_clear_wrapper(&mut ctx, id, "clinic-1")
        .await
        .expect("clearing an active booking should succeed");
    assert_eq!(row.status, "booked");
    assert!(row.clinic_cleared_at.is_some());
}

#[tokio::test]
async fn test_clear_of_non_active_booking_is_conflict() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    // Already cleared, cancelled, or booked by another clinic: the
    // conditional update matches no row
    ctx.availability_repo
        .expect_clear_booked()
        .times(1)
        .returning(|_, _, _| Ok(None));

    let err = test_clear_wrapper(&mut ctx, id, "clinic-1")
        .await
        .expect_err("missed predicate must fail");
    assert!(matches!(err.0, LocumError::Conflict(_)));
    let response = axum::response::IntoResponse::into_response(err);
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_allows_touching_window() {
    let mut ctx = TestContext::new();

    ctx.availability_repo
        .expect_active_on_day()
        .returning(|staff_id, _| Ok(vec![sample::availability(staff_id)]));

    // Starts exactly when the existing slot ends
    let start = chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap();
    let end = chrono::NaiveTime::from_hms_opt(20, 0, 0).unwrap();
    let result = test_create_wrapper(&mut ctx, "staff-1", start, end).await;

    assert!(result.is_ok());
}
