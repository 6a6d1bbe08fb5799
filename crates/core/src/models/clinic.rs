use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinic directory entry. Full clinic CRUD lives in another service; this
/// side only reads the directory for contact enrichment and accepts location
/// updates from clinic admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub clinic_id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Contact subset denormalized onto shifts and booked-availability listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicContact {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClinicLocationRequest {
    pub clinic_lat: f64,
    pub clinic_lng: f64,
    #[serde(default)]
    pub clinic_name: String,
    #[serde(default)]
    pub clinic_phone: String,
    #[serde(default)]
    pub clinic_address: String,
    /// When set, fills missing clinic contact fields on existing shifts.
    #[serde(default)]
    pub backfill: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateClinicLocationResponse {
    pub clinic: Clinic,
    pub backfilled_shifts: u64,
}
