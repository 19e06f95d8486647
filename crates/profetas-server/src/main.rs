mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use profetas_api::state::{AppStateInner, payment_info};
use profetas_core::board::{MatchBoard, run_refresh_loop};
use profetas_core::loader::MatchLoader;
use profetas_core::submission::SubmissionFlow;
use profetas_store::{Backend, Database, RestBackend, SqliteStore};
use profetas_types::models::ENTRY_FEE;

use crate::config::{BackendKind, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profetas=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let backend: Arc<dyn Backend> = match &config.backend {
        BackendKind::Supabase { url, key } => Arc::new(RestBackend::new(url.as_str(), key.as_str())),
        BackendKind::Sqlite { path } => {
            let db = Database::open(path)?;
            Arc::new(SqliteStore::new(Arc::new(db)))
        }
    };

    // Shared state
    let loader = MatchLoader::new(backend.clone(), config.match_limit);
    let flow = SubmissionFlow::new(backend.clone(), config.orphan_policy);
    info!(
        "Using {} backend: up to {} matches, orphan policy {}",
        backend.name(),
        loader.limit(),
        flow.policy()
    );

    let board = MatchBoard::new();
    let state = Arc::new(AppStateInner {
        loader: loader.clone(),
        board: board.clone(),
        flow,
        payment: payment_info(ENTRY_FEE, config.bank.as_str(), config.account.as_str()),
        display_tz: config.timezone,
    });

    // Lock re-evaluation
    let cancel = CancellationToken::new();
    let refresh = tokio::spawn(run_refresh_loop(board, loader, config.lock_poll, cancel.clone()));

    let app = profetas_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Liga de Profetas listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    refresh.await?;
    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
