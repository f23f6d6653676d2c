//! Mechanic endpoints: profile, availability, dispatch queue and the
//! location upload used by the tracker.

use std::sync::Arc;

use serde_json::json;

use roadtech_core::ApiError;
use roadtech_core::domain::{Location, MechanicProfile, ServiceRequest};
use roadtech_shared::dto::UpdateMechanicProfile;

use crate::http::ApiClient;

#[derive(Clone)]
pub struct MechanicApi {
    client: Arc<ApiClient>,
}

impl MechanicApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<MechanicProfile, ApiError> {
        self.client.get("/mechanic/profile").await
    }

    pub async fn update_profile(
        &self,
        request: &UpdateMechanicProfile,
    ) -> Result<MechanicProfile, ApiError> {
        self.client.put("/mechanic/profile", request).await
    }

    pub async fn set_availability(&self, is_available: bool) -> Result<MechanicProfile, ApiError> {
        self.client
            .put("/mechanic/availability", &json!({ "isAvailable": is_available }))
            .await
    }

    /// Fire-and-forget position report; the backend treats the latest
    /// received sample as authoritative.
    pub async fn update_location(&self, location: &Location) -> Result<(), ApiError> {
        self.client.put_no_content("/mechanic/location", location).await
    }

    pub async fn assigned_requests(&self) -> Result<Vec<ServiceRequest>, ApiError> {
        self.client.get("/mechanic/requests").await
    }

    pub async fn pending_requests(&self) -> Result<Vec<ServiceRequest>, ApiError> {
        self.client.get("/mechanic/requests/pending").await
    }

    /// Accepted and in-progress jobs.
    pub async fn active_requests(&self) -> Result<Vec<ServiceRequest>, ApiError> {
        self.client.get("/mechanic/requests/active").await
    }

    pub async fn accept(&self, request_id: i64) -> Result<ServiceRequest, ApiError> {
        self.client
            .put_empty(&format!("/mechanic/requests/{request_id}/accept"))
            .await
    }

    pub async fn reject(&self, request_id: i64) -> Result<ServiceRequest, ApiError> {
        self.client
            .put_empty(&format!("/mechanic/requests/{request_id}/reject"))
            .await
    }

    pub async fn start_service(&self, request_id: i64) -> Result<ServiceRequest, ApiError> {
        self.client
            .put_empty(&format!("/mechanic/requests/{request_id}/start"))
            .await
    }

    pub async fn complete_service(&self, request_id: i64) -> Result<ServiceRequest, ApiError> {
        self.client
            .put_empty(&format!("/mechanic/requests/{request_id}/complete"))
            .await
    }
}
