/// LigaMX Live — Stats Server
///
/// Co dělá:
///   1. Proxuje livescore-api.com (standings, livescores, fixtures, history)
///   2. Skládá /api/metrics a /api/dashboard z více upstream endpointů
///   3. Každé upstream volání trackuje do JSON statistik pro dashboard
///   4. Obsah pouští jen přes reCAPTCHA verified session
///
/// Spuštění:
///   LIVESCORE_API_KEY=... LIVESCORE_API_SECRET=... RECAPTCHA_SECRET=... \
///   cargo run --bin ligamx-server

use anyhow::{Context, Result};
use dotenv::dotenv;
use ligamx_live::{config::Config, routes, state::AppState};
use std::env;
use std::fs::File;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("=== LigaMX Live — STATS SERVER ===");

    // Single instance lock — stats soubor musí mít jediného writera
    let lock_file_path = env::temp_dir().join("ligamx_live_server.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another instance of ligamx-server is already running! Exiting.");
            return Ok(());
        }
    };

    let config = Config::from_env()?;
    let bind = config.bind.clone();
    let state = Arc::new(AppState::new(config));
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind failed on {bind}"))?;
    info!("Listening on http://{bind}");
    info!("API: /api/standings /api/livescores /api/fixtures /api/history /api/results /api/metrics /api/dashboard");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("server error")?;

    Ok(())
}
