//! Parts provider endpoints: shop status and inventory CRUD.

use std::sync::Arc;

use serde_json::json;

use roadtech_core::ApiError;
use roadtech_core::domain::{Part, PartsProvider};
use roadtech_shared::dto::{CreatePart, UpdatePart};

use crate::http::ApiClient;

#[derive(Clone)]
pub struct ProviderApi {
    client: Arc<ApiClient>,
}

impl ProviderApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<PartsProvider, ApiError> {
        self.client.get("/parts-provider/profile").await
    }

    pub async fn set_open(&self, is_open: bool) -> Result<PartsProvider, ApiError> {
        self.client
            .put("/parts-provider/status", &json!({ "isOpen": is_open }))
            .await
    }

    pub async fn my_parts(&self) -> Result<Vec<Part>, ApiError> {
        self.client.get("/parts-provider/parts").await
    }

    pub async fn add_part(&self, part: &CreatePart) -> Result<Part, ApiError> {
        self.client.post("/parts-provider/parts", part).await
    }

    pub async fn update_part(&self, id: i64, update: &UpdatePart) -> Result<Part, ApiError> {
        self.client
            .put(&format!("/parts-provider/parts/{id}"), update)
            .await
    }

    pub async fn delete_part(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/parts-provider/parts/{id}"))
            .await
    }
}
