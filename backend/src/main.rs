//! Backend entry-point: loads settings, prepares the store, starts the
//! monthly report scheduler, and serves HTTP and WebSocket traffic.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use facility_backend::config::AppSettings;
use facility_backend::inbound::http::health::HealthState;
use facility_backend::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use server::{AppStates, ServerConfig, build_states, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );

    let AppStates {
        http,
        ws,
        sessions,
        scheduler,
    } = build_states(&settings).await?;
    actix_web::rt::spawn(scheduler.run());

    let bind_addr = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        http,
        ws,
        sessions,
        ServerConfig::new(session, bind_addr),
    )
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "facility backend listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated abnormally")
}
