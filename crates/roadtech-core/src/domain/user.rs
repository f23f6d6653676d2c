use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, fixed at registration from the client's point of view.
/// Determines which API surface a session may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Mechanic,
    PartsProvider,
    Admin,
}

impl UserRole {
    /// Wire spelling, as used in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Mechanic => "MECHANIC",
            Self::PartsProvider => "PARTS_PROVIDER",
            Self::Admin => "ADMIN",
        }
    }
}

/// User entity - represents an account in the marketplace.
///
/// Wire format is camelCase: the backend is a Spring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub is_active: bool,
    /// Present only for mechanics and parts providers, which require
    /// administrator verification before going live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Service profile attached to a `MECHANIC` account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicProfile {
    pub id: i64,
    pub user_id: i64,
    pub specializations: Vec<String>,
    pub is_available: bool,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub rating: f64,
    pub total_jobs: u32,
    pub location_updated_at: Option<DateTime<Utc>>,
}
