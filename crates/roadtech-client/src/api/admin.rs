//! Administrator endpoints: verification workflows, user management and the
//! audit log.

use std::sync::Arc;

use roadtech_core::ApiError;
use roadtech_core::domain::{
    DashboardStats, LogLevel, MechanicVerification, ProviderVerification, SystemLog, User,
    UserRole,
};
use roadtech_shared::dto::{Page, VerifyDecision};

use crate::http::ApiClient;

/// Filters for the paginated user listing.
#[derive(Debug, Clone)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            role: None,
            search: None,
            page: 0,
            size: 10,
        }
    }
}

impl UserQuery {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(role) = self.role {
            query.push(("role".to_string(), role.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        query
    }
}

/// Filters for the paginated audit-log listing.
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub level: Option<LogLevel>,
    pub action: Option<String>,
    pub user_id: Option<i64>,
    pub page: u32,
    pub size: u32,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            level: None,
            action: None,
            user_id: None,
            page: 0,
            size: 20,
        }
    }
}

impl LogQuery {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(level) = self.level {
            query.push(("level".to_string(), level.as_str().to_string()));
        }
        if let Some(action) = &self.action {
            query.push(("action".to_string(), action.clone()));
        }
        if let Some(user_id) = self.user_id {
            query.push(("userId".to_string(), user_id.to_string()));
        }
        query
    }
}

#[derive(Clone)]
pub struct AdminApi {
    client: Arc<ApiClient>,
}

impl AdminApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.client.get("/admin/dashboard/stats").await
    }

    pub async fn pending_mechanics(&self) -> Result<Vec<MechanicVerification>, ApiError> {
        self.client.get("/admin/mechanics/pending").await
    }

    pub async fn verify_mechanic(&self, id: i64, reason: &str) -> Result<(), ApiError> {
        self.client
            .put_no_content(
                &format!("/admin/mechanics/{id}/verify"),
                &VerifyDecision {
                    reason: reason.to_string(),
                },
            )
            .await
    }

    pub async fn reject_mechanic(&self, id: i64, reason: &str) -> Result<(), ApiError> {
        self.client
            .put_no_content(
                &format!("/admin/mechanics/{id}/reject"),
                &VerifyDecision {
                    reason: reason.to_string(),
                },
            )
            .await
    }

    pub async fn pending_providers(&self) -> Result<Vec<ProviderVerification>, ApiError> {
        self.client.get("/admin/parts-providers/pending").await
    }

    pub async fn verify_provider(&self, id: i64, reason: &str) -> Result<(), ApiError> {
        self.client
            .put_no_content(
                &format!("/admin/parts-providers/{id}/verify"),
                &VerifyDecision {
                    reason: reason.to_string(),
                },
            )
            .await
    }

    pub async fn reject_provider(&self, id: i64, reason: &str) -> Result<(), ApiError> {
        self.client
            .put_no_content(
                &format!("/admin/parts-providers/{id}/reject"),
                &VerifyDecision {
                    reason: reason.to_string(),
                },
            )
            .await
    }

    pub async fn users(&self, query: &UserQuery) -> Result<Page<User>, ApiError> {
        self.client.get_query("/admin/users", query.to_query()).await
    }

    pub async fn toggle_user_active(&self, id: i64) -> Result<User, ApiError> {
        self.client
            .put_empty(&format!("/admin/users/{id}/toggle-active"))
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/admin/users/{id}")).await
    }

    pub async fn logs(&self, query: &LogQuery) -> Result<Page<SystemLog>, ApiError> {
        self.client.get_query("/admin/logs", query.to_query()).await
    }

    pub async fn delete_log(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/admin/logs/{id}")).await
    }

    /// Purge log entries older than the given number of days.
    pub async fn clear_old_logs(&self, days_old: u32) -> Result<(), ApiError> {
        self.client
            .delete_query(
                "/admin/logs/clear",
                vec![("daysOld".to_string(), days_old.to_string())],
            )
            .await
    }
}
