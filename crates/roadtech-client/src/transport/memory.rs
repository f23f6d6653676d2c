//! Scripted in-memory transport.
//!
//! Plays the backend's part in tests and offline development: routes are
//! registered up front, every request is recorded, and no socket is opened.

use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use roadtech_core::ports::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    delay: Option<Duration>,
    respond: Responder,
}

/// In-memory transport answering from a scripted route table.
///
/// Routes registered later shadow earlier ones for the same method and path,
/// so a test can change an endpoint's behavior mid-scenario. Unrouted
/// requests get a 404.
pub struct MemoryTransport {
    routes: RwLock<Vec<Route>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Script a response for a method/path pair.
    pub fn on<F>(&self, method: Method, path: &str, respond: F)
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        self.register(method, path, None, Box::new(respond));
    }

    /// Script a response that settles only after `delay`, for tests that need
    /// requests to overlap in flight.
    pub fn on_with_delay<F>(&self, method: Method, path: &str, delay: Duration, respond: F)
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        self.register(method, path, Some(delay), Box::new(respond));
    }

    fn register(&self, method: Method, path: &str, delay: Option<Duration>, respond: Responder) {
        if let Ok(mut routes) = self.routes.write() {
            routes.push(Route {
                method,
                path: path.to_string(),
                delay,
                respond,
            });
        }
    }

    /// Script a fixed JSON response for a method/path pair.
    pub fn on_json(&self, method: Method, path: &str, status: u16, body: &impl Serialize) {
        let response = Self::json(status, body);
        self.on(method, path, move |_| Ok(response.clone()));
    }

    /// Build a JSON response body.
    pub fn json(status: u16, value: &impl Serialize) -> HttpResponse {
        HttpResponse {
            status,
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// Build a bodyless response.
    pub fn empty(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: Vec::new(),
        }
    }

    /// Everything executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// How many times a method/path pair was executed.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// The most recent request to a path, if any.
    pub fn last_request(&self, path: &str) -> Option<HttpRequest> {
        self.requests().into_iter().rev().find(|r| r.path == path)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MemoryTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut log) = self.log.lock() {
            log.push(request.clone());
        }

        // Resolve the route and compute the response before any delay, so the
        // read guard is not held across an await.
        let resolved = {
            let routes = self
                .routes
                .read()
                .map_err(|_| TransportError::Request("route table poisoned".to_string()))?;

            // Later registrations win.
            routes
                .iter()
                .rev()
                .find(|route| route.method == request.method && route.path == request.path)
                .map(|route| (route.delay, (route.respond)(&request)))
        };

        match resolved {
            Some((delay, result)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => {
                tracing::debug!(path = %request.path, "No scripted route; answering 404");
                Ok(Self::empty(404))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_route_and_log() {
        let transport = MemoryTransport::new();
        transport.on_json(Method::Get, "/users/me", 200, &serde_json::json!({"ok": true}));

        let response = transport
            .execute(HttpRequest::new(Method::Get, "/users/me"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.calls(Method::Get, "/users/me"), 1);
    }

    #[tokio::test]
    async fn test_later_registration_shadows_earlier() {
        let transport = MemoryTransport::new();
        transport.on(Method::Get, "/ping", |_| Ok(MemoryTransport::empty(500)));
        transport.on(Method::Get, "/ping", |_| Ok(MemoryTransport::empty(204)));

        let response = transport
            .execute(HttpRequest::new(Method::Get, "/ping"))
            .await
            .unwrap();

        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_unrouted_request_is_404() {
        let transport = MemoryTransport::new();
        let response = transport
            .execute(HttpRequest::new(Method::Delete, "/nowhere"))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
    }
}
