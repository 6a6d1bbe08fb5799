use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Scheduled,
    Completed,
    Late,
    Cancelled,
    NoShow,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Scheduled => "scheduled",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Late => "late",
            ShiftStatus::Cancelled => "cancelled",
            ShiftStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(ShiftStatus::Scheduled),
            "completed" => Ok(ShiftStatus::Completed),
            "late" => Ok(ShiftStatus::Late),
            "cancelled" => Ok(ShiftStatus::Cancelled),
            "no_show" => Ok(ShiftStatus::NoShow),
            other => Err(format!("unknown shift status '{other}'")),
        }
    }
}

/// A concrete work commitment, either materialized from a booking or created
/// directly by a clinic admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub clinic_id: String,
    pub staff_id: String,

    pub date: NaiveDate,
    #[serde(with = "crate::slots::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::slots::hhmm")]
    pub end: NaiveTime,

    pub status: ShiftStatus,
    pub minutes_late: i32,

    pub hourly_rate: f64,
    pub note: String,

    /// Denormalized clinic contact; empty/null until backfilled from the
    /// clinic directory.
    pub clinic_name: String,
    pub clinic_phone: String,
    pub clinic_address: String,
    pub clinic_lat: Option<f64>,
    pub clinic_lng: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    pub clinic_id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    #[serde(with = "crate::slots::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::slots::hhmm")]
    pub end: NaiveTime,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListShiftsQuery {
    pub clinic_id: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateShiftStatusRequest {
    pub status: ShiftStatus,
    #[serde(default)]
    pub minutes_late: i32,
}
