use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of an audit-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Wire spelling, as used in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// One entry in the backend's audit log, as shown in the admin console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    pub id: i64,
    pub level: LogLevel,
    pub action: String,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub details: String,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A mechanic awaiting administrator verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicVerification {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub specializations: Vec<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// A parts provider awaiting administrator verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderVerification {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub shop_name: String,
    pub address: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_mechanics: u64,
    pub total_parts_providers: u64,
    pub total_requests: u64,
    pub pending_requests: u64,
    pub active_requests: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_today: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_mechanics: Option<u64>,
}
