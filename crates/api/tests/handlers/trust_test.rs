use chrono::Utc;
use locumdesk_api::middleware::error_handling::AppError;
use locumdesk_core::errors::LocumError;
use locumdesk_core::models::trust::{AttendanceStatus, TrustScore};
use locumdesk_core::scoring;
use locumdesk_db::mock::repositories::sample;
use locumdesk_db::models::DbTrustScore;
use locumdesk_db::repositories::trust::NewAttendanceEvent;

use crate::test_utils::TestContext;

// Mirrors the attendance flow over the mocks: append the event, ensure the
// aggregate exists, apply the delta, persist.
async fn test_attendance_wrapper(
    ctx: &mut TestContext,
    staff_id: &'static str,
    raw_status: &str,
    minutes_late: i32,
) -> Result<(i32, DbTrustScore), AppError> {
    let status = AttendanceStatus::parse(raw_status)?;
    let occurred_at = Utc::now();

    ctx.trust_repo
        .insert_event(NewAttendanceEvent {
            clinic_id: "clinic-1".to_string(),
            staff_id: staff_id.to_string(),
            shift_id: String::new(),
            status: status.as_str().to_string(),
            minutes_late,
            occurred_at,
        })
        .await
        .map_err(LocumError::Database)?;

    let row = ctx
        .trust_repo
        .create_default_score(staff_id, scoring::BASE_SCORE)
        .await
        .map_err(LocumError::Database)?;

    let mut score = TrustScore::from(row);
    let delta = scoring::apply_event(&mut score, status, minutes_late, occurred_at);

    let saved = ctx
        .trust_repo
        .update_score(score)
        .await
        .map_err(LocumError::Database)?;

    Ok((delta, saved))
}

#[tokio::test]
async fn test_no_show_event_drops_fresh_score_to_55() {
    let mut ctx = TestContext::new();

    ctx.trust_repo
        .expect_insert_event()
        .times(1)
        .returning(|new| {
            Ok(locumdesk_db::models::DbAttendanceEvent {
                id: uuid::Uuid::new_v4(),
                clinic_id: new.clinic_id,
                staff_id: new.staff_id,
                shift_id: new.shift_id,
                status: new.status,
                minutes_late: new.minutes_late,
                occurred_at: new.occurred_at,
                created_at: Utc::now(),
            })
        });
    ctx.trust_repo
        .expect_create_default_score()
        .returning(|staff_id, _| Ok(sample::trust_score(staff_id)));
    ctx.trust_repo.expect_update_score().returning(|score| {
        let mut row = sample::trust_score(&score.staff_id);
        row.trust_score = score.trust_score;
        row.total_shifts = score.total_shifts;
        row.no_show = score.no_show;
        row.flags = score.flags;
        row.badges = score.badges;
        row.last_no_show_at = score.last_no_show_at;
        Ok(row)
    });

    let (delta, saved) = test_attendance_wrapper(&mut ctx, "staff-1", "no_show", 0)
        .await
        .expect("event should apply");

    assert_eq!(delta, -25);
    assert_eq!(saved.trust_score, 55);
    assert_eq!(saved.no_show, 1);
    assert_eq!(saved.flags, vec![scoring::FLAG_NO_SHOW_30D.to_string()]);
}

#[tokio::test]
async fn test_event_insert_not_attempted_for_invalid_status() {
    let mut ctx = TestContext::new();
    ctx.trust_repo.expect_insert_event().times(0);
    ctx.trust_repo.expect_create_default_score().times(0);

    let result = test_attendance_wrapper(&mut ctx, "staff-1", "ghosted", 0).await;

    let err = result.expect_err("unknown status must fail");
    assert!(matches!(err.0, LocumError::Validation(_)));
}

#[tokio::test]
async fn test_legacy_cancelled_status_applies_cancelled_early_delta() {
    let mut ctx = TestContext::new();

    ctx.trust_repo.expect_insert_event().returning(|new| {
        assert_eq!(new.status, "cancelled_early");
        Ok(locumdesk_db::models::DbAttendanceEvent {
            id: uuid::Uuid::new_v4(),
            clinic_id: new.clinic_id,
            staff_id: new.staff_id,
            shift_id: new.shift_id,
            status: new.status,
            minutes_late: new.minutes_late,
            occurred_at: new.occurred_at,
            created_at: Utc::now(),
        })
    });
    ctx.trust_repo
        .expect_create_default_score()
        .returning(|staff_id, _| Ok(sample::trust_score(staff_id)));
    ctx.trust_repo.expect_update_score().returning(|score| {
        let mut row = sample::trust_score(&score.staff_id);
        row.trust_score = score.trust_score;
        Ok(row)
    });

    let (delta, saved) = test_attendance_wrapper(&mut ctx, "staff-1", "cancelled", 0)
        .await
        .expect("legacy status should normalize");

    assert_eq!(delta, -5);
    assert_eq!(saved.trust_score, 75);
}

// Mirrors the score read: an existing aggregate is returned as-is, a first
// read persists the base aggregate.
async fn test_get_score_wrapper(
    ctx: &mut TestContext,
    staff_id: &'static str,
) -> Result<DbTrustScore, AppError> {
    let row = match ctx
        .trust_repo
        .find_score(staff_id)
        .await
        .map_err(LocumError::Database)?
    {
        Some(row) => row,
        None => ctx
            .trust_repo
            .create_default_score(staff_id, scoring::BASE_SCORE)
            .await
            .map_err(LocumError::Database)?,
    };
    Ok(row)
}

#[tokio::test]
async fn test_get_score_returns_existing_aggregate_without_writing() {
    let mut ctx = TestContext::new();

    ctx.trust_repo
        .expect_find_score()
        .times(1)
        .returning(|staff_id| {
            let mut row = sample::trust_score(staff_id);
            row.trust_score = 67;
            Ok(Some(row))
        });
    ctx.trust_repo.expect_create_default_score().times(0);

    let row = test_get_score_wrapper(&mut ctx, "staff-1")
        .await
        .expect("read should succeed");
    assert_eq!(row.trust_score, 67);
}

#[tokio::test]
async fn test_get_score_first_read_persists_the_base_aggregate() {
    let mut ctx = TestContext::new();

    ctx.trust_repo
        .expect_find_score()
        .times(1)
        .returning(|_| Ok(None));
    ctx.trust_repo
        .expect_create_default_score()
        .times(1)
        .returning(|staff_id, base| {
            let mut row = sample::trust_score(staff_id);
            row.trust_score = base;
            Ok(row)
        });

    let row = test_get_score_wrapper(&mut ctx, "staff-new")
        .await
        .expect("read should succeed");
    assert_eq!(row.trust_score, scoring::BASE_SCORE);
}

#[tokio::test]
async fn test_recommendation_list_excludes_flagged_staff() {
    let mut ctx = TestContext::new();

    // The repository query filters on the flag; the mock returns only the
    // clean rows the query would produce
    ctx.trust_repo
        .expect_list_recommendable()
        .times(1)
        .returning(|excluded_flag, _| {
            assert_eq!(excluded_flag, scoring::FLAG_NO_SHOW_30D);
            let mut good = sample::trust_score("staff-good");
            good.trust_score = 92;
            good.badges = vec![scoring::BADGE_HIGHLY_RELIABLE.to_string()];
            Ok(vec![good])
        });

    let rows = ctx
        .trust_repo
        .list_recommendable(scoring::FLAG_NO_SHOW_30D, 10)
        .await
        .expect("listing should succeed");

    assert_eq!(rows.len(), 1);
    let score = TrustScore::from(rows.into_iter().next().unwrap());
    let reason = scoring::recommendation_reason(&score);
    assert_eq!(reason[0], "trustScore 92");
    assert!(reason.contains(&scoring::BADGE_HIGHLY_RELIABLE.to_string()));
}
