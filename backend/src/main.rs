//! Guardian Vision entry-point: loads settings, chooses the care API adapter
//! and serves the dashboard endpoints.

mod server;

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use guardian_vision::domain::ports::{CareApi, FixtureCareApi};
use guardian_vision::inbound::http::health::HealthState;
use guardian_vision::inbound::http::session_config::{BuildMode, session_settings_from_env};
use guardian_vision::inbound::http::state::HttpState;
use guardian_vision::outbound::care_api::CareApiHttpClient;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(fingerprint = %session.fingerprint(), "session key loaded");

    let care_api: Arc<dyn CareApi> = if settings.fixtures {
        warn!("serving fixture data; the care API is not contacted");
        Arc::new(FixtureCareApi)
    } else {
        let base = settings.api_base_url()?;
        info!(api = %base, timeout = ?settings.request_timeout(), "using care API");
        Arc::new(
            CareApiHttpClient::new(base, settings.request_timeout())
                .map_err(std::io::Error::other)?,
        )
    };
    let http_state = HttpState::new(care_api).with_max_upload_bytes(settings.max_upload_bytes());

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
        http_state,
    );
    info!(addr = %config.bind_addr(), "starting server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; failing liveness");
            health_state.mark_unhealthy();
        }
    });
    server.await
}
