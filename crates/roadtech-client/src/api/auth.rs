//! Auth endpoints.
//!
//! Login, register and refresh are exempt from the 401 interception protocol;
//! their failures reach the caller untouched.

use std::sync::Arc;

use roadtech_core::ApiError;
use roadtech_core::domain::User;
use roadtech_shared::dto::{
    AuthResponse, LoginRequest, LogoutRequest, RegisterRequest, UpdateProfileRequest,
};

use crate::http::ApiClient;

#[derive(Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/auth/login", request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/auth/register", request).await
    }

    /// Revoke a refresh token server-side.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        self.client
            .post_no_content(
                "/auth/logout",
                &LogoutRequest {
                    refresh_token: refresh_token.to_string(),
                },
            )
            .await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.get("/users/me").await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User, ApiError> {
        self.client.put("/users/me", request).await
    }
}
