//! The single source of truth for "who is logged in".
//!
//! Consumers read session state through a watch channel; only the controller
//! writes it, and only the operations here touch the token store.

use std::sync::Arc;

use tokio::sync::watch;

use roadtech_core::ApiError;
use roadtech_core::domain::User;
use roadtech_core::ports::{TokenPair, TokenStore};
use roadtech_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use crate::api::AuthApi;
use crate::http::ApiClient;

/// Snapshot of the current session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Option<User>,
    /// True until [`SessionController::initialize`] has settled; consumers
    /// hold off rendering auth-dependent state while it is set.
    pub loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Owns session state and the login/register/logout flows.
pub struct SessionController {
    auth: AuthApi,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
}

impl SessionController {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let tokens = client.token_store();
        let (state, _) = watch::channel(Session::initial());

        Self {
            auth: AuthApi::new(client),
            tokens,
            state,
        }
    }

    /// The current snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Watch for session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Hydrate the session from stored tokens at startup.
    ///
    /// A stored access token triggers a profile fetch; any failure there
    /// clears the tokens and leaves the session anonymous. The loading flag
    /// drops in every case, so callers may await this before rendering.
    pub async fn initialize(&self) {
        if self.tokens.access_token().await.is_some() {
            self.refresh_user().await;
        }
        self.state.send_modify(|session| session.loading = false);
        tracing::debug!(
            authenticated = self.session().is_authenticated(),
            "Session initialized"
        );
    }

    /// Authenticate with credentials.
    ///
    /// Errors are propagated, not swallowed: the caller owns user feedback.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let response = self.auth.login(request).await?;
        self.establish(response).await
    }

    /// Create an account and start a session with it. Role-specific payload
    /// fields travel inside [`RegisterRequest`]; the contract is the same as
    /// login.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response = self.auth.register(request).await?;
        self.establish(response).await
    }

    /// End the session. The backend call is best effort; local state is
    /// cleared unconditionally.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.tokens.refresh_token().await {
            if let Err(error) = self.auth.logout(&refresh_token).await {
                tracing::debug!(%error, "Ignoring logout endpoint failure");
            }
        }

        self.clear_session().await;
        tracing::info!("Logged out");
    }

    /// Re-fetch the current user's profile, e.g. when the app regains
    /// visibility. A failure means the session is gone server-side: tokens
    /// and state are cleared.
    pub async fn refresh_user(&self) {
        match self.auth.current_user().await {
            Ok(user) => {
                self.state.send_modify(|session| session.user = Some(user));
            }
            Err(error) => {
                tracing::debug!(%error, "Profile fetch failed; clearing session");
                self.clear_session().await;
            }
        }
    }

    async fn establish(&self, response: AuthResponse) -> Result<User, ApiError> {
        self.tokens
            .set_tokens(TokenPair::new(response.access_token, response.refresh_token))
            .await
            .map_err(|error| ApiError::Storage(error.to_string()))?;

        let user = response.user;
        self.state.send_modify(|session| session.user = Some(user.clone()));
        tracing::info!(user_id = user.id, role = ?user.role, "Session established");
        Ok(user)
    }

    async fn clear_session(&self) {
        if let Err(error) = self.tokens.clear().await {
            tracing::warn!(%error, "Failed to clear stored tokens");
        }
        self.state.send_modify(|session| session.user = None);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use roadtech_core::domain::UserRole;
    use roadtech_core::ports::Method;

    use crate::token::InMemoryTokenStore;
    use crate::transport::MemoryTransport;

    use super::*;

    fn user_json() -> serde_json::Value {
        json!({
            "id": 1,
            "email": "a@b.com",
            "fullName": "Ada Lovelace",
            "phone": "+15550100",
            "role": "USER",
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z"
        })
    }

    fn controller_with(
        transport: Arc<MemoryTransport>,
        tokens: Arc<InMemoryTokenStore>,
    ) -> SessionController {
        SessionController::new(Arc::new(ApiClient::new(transport, tokens)))
    }

    #[tokio::test]
    async fn test_login_persists_tokens_and_publishes_user() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on_json(
            Method::Post,
            "/auth/login",
            200,
            &json!({"accessToken": "t1", "refreshToken": "r1", "user": user_json()}),
        );
        let tokens = Arc::new(InMemoryTokenStore::new());
        let controller = controller_with(Arc::clone(&transport), tokens.clone());

        let user = controller
            .login(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::User);
        assert_eq!(tokens.access_token().await.as_deref(), Some("t1"));
        assert_eq!(tokens.refresh_token().await.as_deref(), Some("r1"));
        assert!(controller.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_propagates_and_leaves_session_anonymous() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on_json(
            Method::Post,
            "/auth/login",
            401,
            &json!({"status": 401, "message": "Invalid email or password"}),
        );
        let tokens = Arc::new(InMemoryTokenStore::new());
        let controller = controller_with(Arc::clone(&transport), tokens.clone());

        let result = controller
            .login(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ApiError::Status { status: 401, .. })));
        assert!(!controller.session().is_authenticated());
        assert_eq!(tokens.access_token().await, None);
    }

    #[tokio::test]
    async fn test_register_sends_role_specific_fields() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on_json(
            Method::Post,
            "/auth/register",
            200,
            &json!({"accessToken": "t1", "refreshToken": "r1", "user": user_json()}),
        );
        let controller = controller_with(
            Arc::clone(&transport),
            Arc::new(InMemoryTokenStore::new()),
        );

        let mut request = RegisterRequest::customer("m@b.com", "secret123", "Max Wrench", "+1555");
        request.role = UserRole::Mechanic;
        request.specializations = Some(vec!["ENGINE".to_string(), "TIRES".to_string()]);
        controller.register(&request).await.unwrap();

        let sent = transport.last_request("/auth/register").unwrap();
        let body = sent.body.unwrap();
        assert_eq!(body["role"], "MECHANIC");
        assert_eq!(body["specializations"], json!(["ENGINE", "TIRES"]));
        // Unset provider fields stay off the wire.
        assert!(body.get("shopName").is_none());
    }

    #[tokio::test]
    async fn test_initialize_hydrates_from_valid_token() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on_json(Method::Get, "/users/me", 200, &user_json());
        let tokens = Arc::new(InMemoryTokenStore::with_tokens(TokenPair::new("t1", "r1")));
        let controller = controller_with(Arc::clone(&transport), tokens);

        assert!(controller.session().loading);
        controller.initialize().await;

        let session = controller.session();
        assert!(!session.loading);
        assert!(session.is_authenticated());
        assert_eq!(session.user.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_initialize_with_invalid_token_clears_and_stays_anonymous() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on(Method::Get, "/users/me", |_| Ok(MemoryTransport::empty(401)));
        transport.on_json(
            Method::Post,
            "/auth/refresh",
            400,
            &json!({"status": 400, "message": "Refresh token expired"}),
        );
        let tokens = Arc::new(InMemoryTokenStore::with_tokens(TokenPair::new("bad", "bad")));
        let controller = controller_with(Arc::clone(&transport), tokens.clone());

        controller.initialize().await;

        let session = controller.session();
        assert!(!session.loading);
        assert!(!session.is_authenticated());
        assert_eq!(tokens.access_token().await, None);
        assert_eq!(tokens.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_initialize_without_tokens_skips_profile_fetch() {
        let transport = Arc::new(MemoryTransport::new());
        let controller = controller_with(
            Arc::clone(&transport),
            Arc::new(InMemoryTokenStore::new()),
        );

        controller.initialize().await;

        assert!(!controller.session().loading);
        assert_eq!(transport.calls(Method::Get, "/users/me"), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_locally_even_when_backend_fails() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on_json(
            Method::Post,
            "/auth/login",
            200,
            &json!({"accessToken": "t1", "refreshToken": "r1", "user": user_json()}),
        );
        transport.on(Method::Post, "/auth/logout", |_| {
            Ok(MemoryTransport::empty(500))
        });
        let tokens = Arc::new(InMemoryTokenStore::new());
        let controller = controller_with(Arc::clone(&transport), tokens.clone());

        controller
            .login(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        controller.logout().await;

        // The revocation was attempted with the stored refresh token.
        let sent = transport.last_request("/auth/logout").unwrap();
        assert_eq!(sent.body.unwrap()["refreshToken"], "r1");
        // And local state is gone regardless of the 500.
        assert!(!controller.session().is_authenticated());
        assert_eq!(tokens.access_token().await, None);
    }

    #[tokio::test]
    async fn test_refresh_user_failure_clears_session() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on_json(Method::Get, "/users/me", 200, &user_json());
        let tokens = Arc::new(InMemoryTokenStore::with_tokens(TokenPair::new("t1", "r1")));
        let controller = controller_with(Arc::clone(&transport), tokens.clone());
        controller.initialize().await;
        assert!(controller.session().is_authenticated());

        // The backend invalidates the session; the next profile fetch fails.
        transport.on(Method::Get, "/users/me", |_| Ok(MemoryTransport::empty(403)));
        controller.refresh_user().await;

        assert!(!controller.session().is_authenticated());
        assert_eq!(tokens.access_token().await, None);
    }
}
