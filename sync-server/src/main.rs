//! marksync-server binary entry point.
//!
//! Usage:
//! ```bash
//! marksync-server --config server.toml
//! ```
//!
//! Without `--config` (or when the default `server.toml` is absent) the
//! built-in defaults apply: bind 0.0.0.0:8080, blobs under `./data`.

use anyhow::Context;
use marksync_server::config::Config;
use marksync_server::http::{build_router, AppState};
use marksync_server::limits::PutLimiter;
use marksync_server::storage::FsBlobStore;
use marksync_server::sweep::spawn_sweep_task;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = get_config_path();
    let config = if config_path.exists() {
        tracing::info!(path = %config_path.display(), "loading configuration");
        Config::from_file(&config_path)?
    } else {
        tracing::info!("no configuration file, using defaults");
        Config::default()
    };

    let store = FsBlobStore::new(&config.storage.data_dir, config.storage.max_blob_size)
        .with_context(|| format!("opening data dir {}", config.storage.data_dir.display()))?;
    let limiter = Arc::new(PutLimiter::new(Duration::from_secs(
        config.limits.put_interval_secs,
    )));
    let _sweep = spawn_sweep_task(Arc::clone(&limiter), config.sweep.clone());

    let state = Arc::new(AppState {
        store: Arc::new(store),
        limiter,
        max_blob_size: config.storage.max_blob_size,
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("binding {}", config.server.bind_address))?;
    tracing::info!(
        addr = %config.server.bind_address,
        version = env!("CARGO_PKG_VERSION"),
        "marksync-server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

fn get_config_path() -> PathBuf {
    std::env::args()
        .skip_while(|arg| arg != "--config")
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("server.toml"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
