//! # licmgr: Binary Entry Point
//!
//! Loads the client registry, connects to the external signer, starts the
//! summary scheduler and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use licmgr_api::state::{AppConfig, AppState, LogFormat};
use licmgr_signer_client::{DocumentSigner, SignerClient, SignerConfig};
use licmgr_state::{ClientRegistry, JsonFileStore};
use licmgr_summary::{spawn_scheduler, SchedulerMessage};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());

    let config = AppConfig::from_env();
    tracing::info!(?config, "starting licmgr");

    // A missing store file is an empty registry; an unreadable one is fatal.
    let store = Arc::new(JsonFileStore::new(config.store_path.clone()));
    let registry = ClientRegistry::open(store).map_err(|e| {
        tracing::error!(error = %e, "failed to load client registry");
        e
    })?;
    tracing::info!(clients = registry.len(), path = %config.store_path.display(), "client registry loaded");

    let signer_config = SignerConfig::from_env().context("signer configuration")?;
    let mut signer = SignerClient::new(signer_config).context("signer client")?;
    if signer.public_key().is_none() {
        match signer.info().await {
            Ok(info) => match info.public_key {
                Some(pk) => {
                    tracing::info!(device_id = ?info.device_id, public_key = %pk.to_base64(), "signer key discovered");
                    signer = signer.with_public_key(pk);
                }
                None => tracing::warn!(present = info.present, "signer did not report a public key"),
            },
            Err(e) => tracing::warn!(
                error = %e,
                "signer info unavailable; registrations will omit server_pub_key"
            ),
        }
    }

    let interval = config.summary_interval;
    let port = config.port;
    let state = AppState::new(config, Arc::new(registry), Arc::new(signer));
    let (scheduler, control) = spawn_scheduler(Arc::clone(&state.generator), interval);

    let app = licmgr_api::app(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("licmgr listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = control.send(SchedulerMessage::Shutdown).await;
    if let Err(e) = scheduler.await {
        tracing::error!(error = %e, "summary scheduler task failed");
    }
    tracing::info!("licmgr stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
