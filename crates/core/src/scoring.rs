//! Trust-score accrual rules.
//!
//! One attendance event applies exactly one delta to the staff member's
//! aggregate. Flags are sticky until cleared elsewhere; badges are derived
//! state and recomputed from scratch on every event.

use chrono::{DateTime, Utc};

use crate::models::trust::{AttendanceStatus, TrustScore};

/// Starting score for a staff member with no history.
pub const BASE_SCORE: i32 = 80;

/// Flag set after any no-show.
pub const FLAG_NO_SHOW_30D: &str = "NO_SHOW_30D";

/// Badge for a clean record of at least [`RELIABLE_MIN_SHIFTS`] shifts.
pub const BADGE_HIGHLY_RELIABLE: &str = "HIGHLY_RELIABLE";

/// Minimum completed history before HIGHLY_RELIABLE can be earned.
pub const RELIABLE_MIN_SHIFTS: i32 = 10;

/// Minutes-late threshold past which an extra penalty point applies.
pub const LATE_PENALTY_THRESHOLD_MINUTES: i32 = 30;

fn clamp(n: i32, lo: i32, hi: i32) -> i32 {
    n.clamp(lo, hi)
}

/// Score delta for one attendance outcome.
pub fn score_delta(status: AttendanceStatus, minutes_late: i32) -> i32 {
    match status {
        AttendanceStatus::Completed => 1,
        AttendanceStatus::Late => {
            if minutes_late > LATE_PENALTY_THRESHOLD_MINUTES {
                -3
            } else {
                -2
            }
        }
        AttendanceStatus::CancelledEarly => -5,
        AttendanceStatus::NoShow => -25,
    }
}

/// Fresh aggregate for a staff member with no recorded history.
pub fn default_score(staff_id: &str, now: DateTime<Utc>) -> TrustScore {
    TrustScore {
        staff_id: staff_id.to_string(),
        trust_score: BASE_SCORE,
        total_shifts: 0,
        completed: 0,
        late: 0,
        no_show: 0,
        cancelled_early: 0,
        last_no_show_at: None,
        flags: Vec::new(),
        badges: Vec::new(),
        updated_at: now,
    }
}

/// Applies one attendance event to the aggregate and returns the delta that
/// was applied. The caller persists the mutated aggregate.
pub fn apply_event(
    score: &mut TrustScore,
    status: AttendanceStatus,
    minutes_late: i32,
    occurred_at: DateTime<Utc>,
) -> i32 {
    let delta = score_delta(status, minutes_late);

    score.total_shifts += 1;
    match status {
        AttendanceStatus::Completed => score.completed += 1,
        AttendanceStatus::Late => score.late += 1,
        AttendanceStatus::CancelledEarly => score.cancelled_early += 1,
        AttendanceStatus::NoShow => {
            score.no_show += 1;
            score.last_no_show_at = Some(occurred_at);
            if !score.flags.iter().any(|f| f == FLAG_NO_SHOW_30D) {
                score.flags.push(FLAG_NO_SHOW_30D.to_string());
            }
        }
    }

    score.trust_score = clamp(score.trust_score + delta, 0, 100);

    // Badges reflect current state only; never sticky once earned.
    let highly_reliable = score.no_show == 0 && score.total_shifts >= RELIABLE_MIN_SHIFTS;
    let has_badge = score.badges.iter().any(|b| b == BADGE_HIGHLY_RELIABLE);
    if highly_reliable && !has_badge {
        score.badges.push(BADGE_HIGHLY_RELIABLE.to_string());
    } else if !highly_reliable && has_badge {
        score.badges.retain(|b| b != BADGE_HIGHLY_RELIABLE);
    }

    delta
}

/// Ranking rationale shown to clinics: the score plus up to two badges.
pub fn recommendation_reason(score: &TrustScore) -> Vec<String> {
    let mut reason = vec![format!("trustScore {}", score.trust_score)];
    reason.extend(score.badges.iter().take(2).cloned());
    reason
}
