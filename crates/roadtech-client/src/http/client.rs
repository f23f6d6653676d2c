//! The authenticated API client.
//!
//! Every request goes out with the stored access token attached. A 401 on a
//! protected endpoint triggers the single-flight refresh protocol: the first
//! failing request performs one `POST /auth/refresh`, every request failing
//! meanwhile parks on the [`RefreshGate`], and all of them share the one
//! outcome - replay with the fresh token, or rejection with the refresh error
//! and cleared tokens. Auth endpoints are exempt and fail straight through.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use roadtech_core::ApiError;
use roadtech_core::ports::{HttpRequest, HttpResponse, HttpTransport, Method, TokenPair, TokenStore};
use roadtech_shared::ErrorBody;
use roadtech_shared::dto::{RefreshRequest, TokenResponse};

use super::refresh::{GateTicket, RefreshGate};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const REFRESH_PATH: &str = "/auth/refresh";

/// Endpoints whose 401s mean "bad credentials", not "expired access token".
/// They never enter the refresh protocol.
fn is_auth_path(path: &str) -> bool {
    path == LOGIN_PATH || path == REGISTER_PATH || path == REFRESH_PATH
}

/// Authenticated HTTP client for the marketplace API.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    gate: RefreshGate,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            transport,
            tokens,
            gate: RefreshGate::new(),
        }
    }

    /// The token store this client reads its credentials from.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(HttpRequest::new(Method::Get, path)).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let mut request = HttpRequest::new(Method::Get, path);
        request.query = query;
        self.request_json(request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(HttpRequest::new(Method::Post, path).with_body(encode(body)?))
            .await
    }

    pub async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.request_no_content(HttpRequest::new(Method::Post, path).with_body(encode(body)?))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(HttpRequest::new(Method::Put, path).with_body(encode(body)?))
            .await
    }

    pub async fn put_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.request_no_content(HttpRequest::new(Method::Put, path).with_body(encode(body)?))
            .await
    }

    /// PUT without a body, for state-transition endpoints like
    /// `/mechanic/requests/{id}/accept`.
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(HttpRequest::new(Method::Put, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request_no_content(HttpRequest::new(Method::Delete, path))
            .await
    }

    pub async fn delete_query(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<(), ApiError> {
        let mut request = HttpRequest::new(Method::Delete, path);
        request.query = query;
        self.request_no_content(request).await
    }

    async fn request_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.send_with_refresh(request).await?;
        decode(&response)
    }

    async fn request_no_content(&self, request: HttpRequest) -> Result<(), ApiError> {
        self.send_with_refresh(request).await.map(|_| ())
    }

    /// Send a request, running the refresh-and-replay protocol on a 401.
    async fn send_with_refresh(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        request.bearer = self.tokens.access_token().await;

        let response = self
            .transport
            .execute(request.clone())
            .await
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        if response.status != 401 || is_auth_path(&request.path) {
            return check_status(response);
        }

        let access_token = match self.gate.acquire_or_enqueue().await {
            GateTicket::Wait(outcome) => outcome
                .await
                .map_err(|_| ApiError::Unauthenticated)??,
            GateTicket::Lead => {
                let outcome = self.refresh().await;
                self.gate.complete_all(outcome.clone()).await;
                outcome?
            }
        };

        // Replay once, unchanged except for the credential. A second 401 is
        // terminal: no further refresh, tokens gone.
        request.bearer = Some(access_token);
        let replayed = self
            .transport
            .execute(request)
            .await
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        if replayed.status == 401 {
            tracing::warn!("Replayed request was rejected again; clearing session");
            self.clear_tokens().await;
            return Err(ApiError::Unauthenticated);
        }

        check_status(replayed)
    }

    /// One refresh cycle: exchange the stored refresh token for a new pair.
    /// Any failure is terminal for the cycle - tokens are cleared and the
    /// error is shared with every parked request.
    async fn refresh(&self) -> Result<String, ApiError> {
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            tracing::debug!("No refresh token stored; treating session as expired");
            self.clear_tokens().await;
            return Err(ApiError::Unauthenticated);
        };

        let exchange = async {
            let request = HttpRequest::new(Method::Post, REFRESH_PATH)
                .with_body(encode(&RefreshRequest { refresh_token })?);
            let response = self
                .transport
                .execute(request)
                .await
                .map_err(|error| ApiError::Transport(error.to_string()))?;
            let response = check_status(response)?;
            decode::<TokenResponse>(&response)
        };

        match exchange.await {
            Ok(fresh) => {
                let access_token = fresh.access_token.clone();
                self.tokens
                    .set_tokens(TokenPair::new(fresh.access_token, fresh.refresh_token))
                    .await
                    .map_err(|error| ApiError::Storage(error.to_string()))?;
                tracing::debug!("Access token refreshed");
                Ok(access_token)
            }
            Err(error) => {
                tracing::warn!(%error, "Token refresh failed; clearing session");
                self.clear_tokens().await;
                Err(error)
            }
        }
    }

    async fn clear_tokens(&self) {
        if let Err(error) = self.tokens.clear().await {
            tracing::warn!(%error, "Failed to clear stored tokens");
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|error| ApiError::Decode(error.to_string()))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|error| ApiError::Decode(error.to_string()))
}

/// Map a non-success response to the backend's error shape.
fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }

    let body = ErrorBody::from_bytes(&response.body);
    Err(ApiError::Status {
        status: response.status,
        message: body.message_or_status(response.status),
        errors: body.field_errors(),
    })
}
