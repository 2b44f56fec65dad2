use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use ppl_api::config::Config;
use ppl_api::logging::{self, LogSettings};
use ppl_api::{server, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    // ── 1. Logging ───────────────────────────────────────────────
    let _log_guards = match logging::init(&LogSettings::from_env()) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("failed to set up logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── 2. Event config ──────────────────────────────────────────
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "aborting startup");
            return ExitCode::FAILURE;
        }
    };
    info!(event = %config.event, "configs initialized");

    // ── 3. Serve until Ctrl-C ────────────────────────────────────
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> std::io::Result<()> {
    let listen = config.listen_addr;
    let state = Arc::new(AppState::new(config));

    if let Err(e) = state.metrics.init() {
        warn!(error = %e, "metrics pruning not started");
    }

    let app = server::create_router(state.clone());
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(%listen, "ppl-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.metrics.close();
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
