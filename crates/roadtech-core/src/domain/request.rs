use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::Location;

/// Lifecycle state of a roadside assistance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Whether the request can still change hands.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted | Self::InProgress)
    }
}

/// What went wrong at the roadside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    FlatTire,
    EngineFailure,
    BatteryDead,
    OutOfFuel,
    LockedOut,
    Accident,
    Other,
}

/// A customer's call for assistance, from creation through completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: i64,
    pub user_id: i64,
    pub mechanic_id: Option<i64>,
    pub issue_type: IssueType,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub status: RequestStatus,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Where the customer is waiting.
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
