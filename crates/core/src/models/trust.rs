use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{LocumError, LocumResult};

/// Attendance outcome of a single shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Completed,
    Late,
    NoShow,
    CancelledEarly,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Completed => "completed",
            AttendanceStatus::Late => "late",
            AttendanceStatus::NoShow => "no_show",
            AttendanceStatus::CancelledEarly => "cancelled_early",
        }
    }

    /// Parses a raw status, accepting the legacy `cancelled` synonym still
    /// sent by older clients.
    pub fn parse(raw: &str) -> LocumResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "completed" => Ok(AttendanceStatus::Completed),
            "late" => Ok(AttendanceStatus::Late),
            "no_show" => Ok(AttendanceStatus::NoShow),
            "cancelled" | "cancelled_early" => Ok(AttendanceStatus::CancelledEarly),
            other => Err(LocumError::Validation(format!(
                "invalid status '{other}' (allowed: completed, late, no_show, cancelled_early)"
            ))),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record of one attendance outcome. Append-only; never
/// rolled back by downstream scoring failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: Uuid,
    pub clinic_id: String,
    pub staff_id: String,
    pub shift_id: String,
    pub status: AttendanceStatus,
    pub minutes_late: i32,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate reputation record, one per staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScore {
    pub staff_id: String,
    /// Bounded reputation number, always within [0, 100].
    pub trust_score: i32,

    pub total_shifts: i32,
    pub completed: i32,
    pub late: i32,
    pub no_show: i32,
    pub cancelled_early: i32,

    pub last_no_show_at: Option<DateTime<Utc>>,
    pub flags: Vec<String>,
    pub badges: Vec<String>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostAttendanceRequest {
    pub clinic_id: String,
    pub staff_id: String,
    #[serde(default)]
    pub shift_id: String,
    /// Raw status; normalized through [`AttendanceStatus::parse`].
    pub status: String,
    #[serde(default)]
    pub minutes_late: i32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedDelta {
    pub status: AttendanceStatus,
    pub delta: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostAttendanceResponse {
    pub applied: AppliedDelta,
    pub event: AttendanceEvent,
    pub score: TrustScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreStats {
    pub total_shifts: i32,
    pub completed: i32,
    pub late: i32,
    pub no_show: i32,
    pub cancelled_early: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub staff_id: String,
    pub trust_score: i32,
    pub flags: Vec<String>,
    pub badges: Vec<String>,
    pub stats: ScoreStats,
}

impl From<TrustScore> for ScoreResponse {
    fn from(score: TrustScore) -> Self {
        Self {
            staff_id: score.staff_id,
            trust_score: score.trust_score,
            flags: score.flags,
            badges: score.badges,
            stats: ScoreStats {
                total_shifts: score.total_shifts,
                completed: score.completed,
                late: score.late,
                no_show: score.no_show,
                cancelled_early: score.cancelled_early,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendQuery {
    pub clinic_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub staff_id: String,
    pub trust_score: i32,
    pub badges: Vec<String>,
    pub flags: Vec<String>,
    /// Human-readable ranking rationale: score plus up to two badges.
    pub reason: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub clinic_id: String,
    pub recommended: Vec<Recommendation>,
}
