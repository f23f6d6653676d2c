//! HTTP transport over reqwest.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use roadtech_core::ports::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Transport sending requests to the backend with a shared `reqwest::Client`.
///
/// No client-side timeout is configured here; timeouts stay a network-layer
/// concern of the caller's environment.
pub struct ReqwestTransport {
    base_url: Url,
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport rooted at the API base URL, e.g.
    /// `http://localhost:8080/api`.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|error| TransportError::Connect(format!("invalid base URL: {error}")))?;

        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    fn endpoint(&self, request: &HttpRequest) -> Result<Url, TransportError> {
        // Join against base + path while keeping the base's own path prefix.
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&joined)
            .map_err(|error| TransportError::Request(format!("invalid path: {error}")))?;

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.endpoint(&request)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);

        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| {
                if error.is_connect() {
                    TransportError::Connect(error.to_string())
                } else {
                    TransportError::Request(error.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_path_and_query() {
        let transport = ReqwestTransport::new("http://localhost:8080/api").unwrap();
        let request = HttpRequest::new(Method::Get, "/parts/search")
            .with_query("category", "BATTERY")
            .with_query("radiusKm", 10);

        let url = transport.endpoint(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/parts/search?category=BATTERY&radiusKm=10"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ReqwestTransport::new("not a url").is_err());
    }
}
