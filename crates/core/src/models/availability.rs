use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::clinic::ClinicContact;
use crate::models::shift::Shift;

/// Canonical role tag used for availability records; several synonyms
/// (including the Thai label the mobile clients send) collapse to it.
pub const DEFAULT_ROLE: &str = "assistant";

/// Normalizes a role tag to its canonical form. Unrecognized tags pass
/// through trimmed so clinics can filter on whatever they actually post.
pub fn canonical_role(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "helper" | "assistant" | "dental assistant" => DEFAULT_ROLE.to_string(),
        _ if trimmed == "ผู้ช่วย" => DEFAULT_ROLE.to_string(),
        _ => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Open,
    Booked,
    Cancelled,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Open => "open",
            AvailabilityStatus::Booked => "booked",
            AvailabilityStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(AvailabilityStatus::Open),
            "booked" => Ok(AvailabilityStatus::Booked),
            "cancelled" => Ok(AvailabilityStatus::Cancelled),
            other => Err(format!("unknown availability status '{other}'")),
        }
    }
}

/// A staff member's declared open time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: Uuid,
    pub staff_id: String,
    pub owner_user_id: String,

    /// Contact snapshot taken from the token at creation time.
    pub full_name: String,
    pub phone: String,

    pub date: NaiveDate,
    #[serde(with = "crate::slots::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::slots::hhmm")]
    pub end: NaiveTime,
    pub role: String,
    pub note: String,

    pub status: AvailabilityStatus,

    pub booked_by_clinic_id: Option<String>,
    pub booked_at: Option<DateTime<Utc>>,
    pub booked_note: String,
    pub booked_hourly_rate: f64,
    /// Weak back-reference to the shift a booking materialized.
    pub shift_id: Option<Uuid>,
    /// Clinic-side dismissal marker; never reopens the slot.
    pub clinic_cleared_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub date: NaiveDate,
    #[serde(with = "crate::slots::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::slots::hhmm")]
    pub end: NaiveTime,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub note: String,
    /// Fallbacks when the token carries no contact snapshot.
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Owner-scoped list entry; when booked, enriched with the booking clinic's
/// contact so the staff member can call back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyAvailability {
    #[serde(flatten)]
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_clinic: Option<ClinicContact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListMineQuery {
    pub status: Option<AvailabilityStatus>,
}

/// Date filters shared by the open and booked listings. An exact `date` wins
/// over the range bounds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQuery {
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookAvailabilityRequest {
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub hourly_rate: f64,
    /// Clinic-provided contact overrides; defaults come from the directory.
    pub clinic_name: Option<String>,
    pub clinic_phone: Option<String>,
    pub clinic_address: Option<String>,
    pub clinic_lat: Option<f64>,
    pub clinic_lng: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAvailabilityResponse {
    pub availability: Availability,
    pub shift: Shift,
}
