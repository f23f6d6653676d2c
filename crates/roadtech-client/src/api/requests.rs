//! Service request endpoints for the customer side.

use std::sync::Arc;

use roadtech_core::ApiError;
use roadtech_core::domain::ServiceRequest;
use roadtech_shared::dto::CreateServiceRequest;

use crate::http::ApiClient;

#[derive(Clone)]
pub struct ServiceRequestApi {
    client: Arc<ApiClient>,
}

impl ServiceRequestApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &CreateServiceRequest) -> Result<ServiceRequest, ApiError> {
        self.client.post("/service-requests", request).await
    }

    pub async fn get(&self, id: i64) -> Result<ServiceRequest, ApiError> {
        self.client.get(&format!("/service-requests/{id}")).await
    }

    /// All of the caller's requests, newest first.
    pub async fn list_mine(&self) -> Result<Vec<ServiceRequest>, ApiError> {
        self.client.get("/service-requests").await
    }

    /// The caller's currently open request, if any.
    pub async fn active(&self) -> Result<Option<ServiceRequest>, ApiError> {
        self.client.get("/service-requests/active").await
    }

    pub async fn cancel(&self, id: i64) -> Result<ServiceRequest, ApiError> {
        self.client
            .put_empty(&format!("/service-requests/{id}/cancel"))
            .await
    }
}
