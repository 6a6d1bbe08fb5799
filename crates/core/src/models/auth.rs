use serde::{Deserialize, Serialize};

use crate::errors::{LocumError, LocumResult};

/// Raw token payload as issued by the identity provider.
///
/// The identity provider uses camelCase claim names; this is the only place
/// they appear. Everything downstream works with [`AuthUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub clinic_id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub staff_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub exp: usize,
}

/// Caller role after claims validation.
///
/// The identity provider issues several staff-flavored role strings
/// ("employee", "helper", "staff"); they all collapse to [`Role::Staff`].
/// [`Role::System`] is only reachable through the internal service key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    System,
}

/// Authenticated caller, validated once at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub clinic_id: String,
    pub role: Role,
    pub staff_id: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
}

impl AuthUser {
    /// Maps verified claims to a typed caller. Unknown roles are rejected
    /// here rather than at each call site.
    pub fn from_claims(claims: Claims) -> LocumResult<Self> {
        let role = match claims.role.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "employee" | "helper" | "staff" => Role::Staff,
            "system" => Role::System,
            other => {
                return Err(LocumError::Authorization(format!(
                    "unrecognized role '{other}'"
                )))
            }
        };

        Ok(Self {
            user_id: claims.user_id.trim().to_string(),
            clinic_id: claims.clinic_id.trim().to_string(),
            role,
            staff_id: claims.staff_id.trim().to_string(),
            full_name: claims.full_name.trim().to_string(),
            phone: claims.phone.trim().to_string(),
            email: claims.email.trim().to_string(),
        })
    }

    /// Caller produced by a valid internal service key.
    pub fn internal() -> Self {
        Self {
            user_id: String::new(),
            clinic_id: String::new(),
            role: Role::System,
            staff_id: String::new(),
            full_name: String::new(),
            phone: String::new(),
            email: String::new(),
        }
    }

    pub fn require_admin(&self) -> LocumResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(LocumError::Authorization("admin only".to_string()))
        }
    }

    pub fn require_admin_or_system(&self) -> LocumResult<()> {
        match self.role {
            Role::Admin | Role::System => Ok(()),
            Role::Staff => Err(LocumError::Authorization(
                "admin or internal service only".to_string(),
            )),
        }
    }

    /// Staff-only access; returns the caller's staff id, which the token is
    /// required to carry for staff roles.
    pub fn require_staff(&self) -> LocumResult<&str> {
        if self.role != Role::Staff {
            return Err(LocumError::Authorization("staff only".to_string()));
        }
        if self.staff_id.is_empty() {
            return Err(LocumError::Validation(
                "missing staffId in token (required)".to_string(),
            ));
        }
        Ok(&self.staff_id)
    }

    /// Admin access scoped to a clinic; returns the caller's clinic id.
    pub fn require_clinic_admin(&self) -> LocumResult<&str> {
        self.require_admin()?;
        if self.clinic_id.is_empty() {
            return Err(LocumError::Validation(
                "missing clinicId in token (required)".to_string(),
            ));
        }
        Ok(&self.clinic_id)
    }
}
