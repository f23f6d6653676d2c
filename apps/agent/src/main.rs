//! # RoadTech Agent
//!
//! Headless mechanic duty agent: hydrates or opens a session, goes available,
//! streams location while on duty, and listens for dispatch events on the
//! push channel. Polling through the regular API remains authoritative; the
//! channel only lowers latency.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use roadtech_client::api::MechanicApi;
use roadtech_client::{
    ApiClient, FileTokenStore, LocationTracker, ReqwestTransport, SessionController,
    SimulatedGeolocator, TrackerOptions, WsChannel, WsConfig,
};
use roadtech_core::domain::UserRole;
use roadtech_core::ports::{PushChannel, Subscription};
use roadtech_shared::dto::LoginRequest;

mod config;
mod telemetry;

use config::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&telemetry::TelemetryConfig::from_env());

    let config = AgentConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Starting RoadTech agent");

    let transport = Arc::new(ReqwestTransport::new(&config.base_url)?);
    let tokens = Arc::new(FileTokenStore::new(&config.token_file));
    let client = Arc::new(ApiClient::new(transport, tokens));

    // Hydrate from stored tokens, or log in with configured credentials.
    let session = SessionController::new(Arc::clone(&client));
    session.initialize().await;

    if !session.session().is_authenticated() {
        let (email, password) = config
            .credentials()
            .context("no stored session and no AGENT_EMAIL/AGENT_PASSWORD configured")?;
        session.login(&LoginRequest { email, password }).await?;
    }

    let user = session
        .session()
        .user
        .context("session lost after login")?;
    if user.role != UserRole::Mechanic {
        anyhow::bail!("account {} is not a mechanic", user.email);
    }
    tracing::info!(user_id = user.id, name = %user.full_name, "On duty");

    // Dispatch events over the push channel, best effort.
    let channel = WsChannel::new(WsConfig::new(config.ws_url.clone()), client.token_store());
    channel.connect();
    for _ in 0..20 {
        if channel.is_connected() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let topic = format!("/topic/mechanic/{}", user.id);
    let _subscription = if channel.is_connected() {
        channel.subscribe(
            &topic,
            Arc::new(|message| {
                tracing::info!(kind = ?message.kind, payload = %message.payload, "Dispatch update");
            }),
        )
    } else {
        tracing::warn!("Realtime channel unavailable; relying on polling");
        Subscription::noop()
    };

    let mechanic = MechanicApi::new(Arc::clone(&client));
    if let Err(error) = mechanic.set_availability(true).await {
        tracing::warn!(%error, "Could not flag availability");
    }

    // Stream position from the configured route.
    let geolocator = Arc::new(SimulatedGeolocator::new(
        config.route.clone(),
        Duration::from_secs(10),
    ));
    let tracker = LocationTracker::new(mechanic, geolocator);
    tracker
        .start(
            TrackerOptions::with_interval(config.location_interval).on_error(|error| {
                tracing::warn!(%error, "Geolocation error");
            }),
        )
        .await?;

    tracing::info!("Agent running; press ctrl-c to go off duty");
    tokio::signal::ctrl_c().await?;

    tracker.stop().await;
    channel.disconnect();
    session.logout().await;
    tracing::info!("Off duty");

    Ok(())
}
