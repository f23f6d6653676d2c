//! Agent configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use roadtech_core::domain::Location;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub base_url: String,
    pub ws_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub token_file: String,
    pub location_interval: Duration,
    /// Route the simulated geolocator plays back.
    pub route: Vec<Location>,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = env::var("BASE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let ws_url = env::var("WS_URL").unwrap_or_else(|_| derive_ws_url(&base_url));

        Self {
            base_url,
            ws_url,
            email: env::var("AGENT_EMAIL").ok(),
            password: env::var("AGENT_PASSWORD").ok(),
            token_file: env::var("TOKEN_FILE")
                .unwrap_or_else(|_| "roadtech-tokens.json".to_string()),
            location_interval: Duration::from_secs(
                env::var("LOCATION_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            route: env::var("AGENT_ROUTE")
                .ok()
                .and_then(|raw| parse_route(&raw))
                .unwrap_or_else(default_route),
        }
    }

    /// Login credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        Some((self.email.clone()?, self.password.clone()?))
    }
}

fn derive_ws_url(base_url: &str) -> String {
    let ws = base_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1);
    format!("{}/ws", ws.trim_end_matches('/'))
}

/// Parse a route of the form `lat,lon;lat,lon;...`.
fn parse_route(raw: &str) -> Option<Vec<Location>> {
    let mut route = Vec::new();
    for pair in raw.split(';') {
        let (lat, lon) = pair.split_once(',')?;
        route.push(Location {
            latitude: lat.trim().parse().ok()?,
            longitude: lon.trim().parse().ok()?,
        });
    }
    (!route.is_empty()).then_some(route)
}

fn default_route() -> Vec<Location> {
    vec![
        Location {
            latitude: 52.5200,
            longitude: 13.4050,
        },
        Location {
            latitude: 52.5215,
            longitude: 13.4095,
        },
        Location {
            latitude: 52.5230,
            longitude: 13.4060,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_ws_url() {
        assert_eq!(
            derive_ws_url("http://localhost:8080/api"),
            "ws://localhost:8080/api/ws"
        );
        assert_eq!(
            derive_ws_url("https://api.example.com/api/"),
            "wss://api.example.com/api/ws"
        );
    }

    #[test]
    fn test_parse_route() {
        let route = parse_route("52.52,13.405; 52.53,13.41").unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route[1].latitude, 52.53);
    }

    #[test]
    fn test_parse_route_rejects_garbage() {
        assert!(parse_route("not a route").is_none());
        assert!(parse_route("").is_none());
    }
}
