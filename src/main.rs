use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    service::config::{ConfigService, ConfigServiceImpl},
    state::{AppState, SeaOrmDatabaseClient},
};

mod config;
mod db;
mod entities;
mod error;
mod handler;
mod middleware;
mod openapi;
mod repo;
mod schema;
mod service;
mod state;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "store_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ConfigServiceImpl::new());

    let db = match SeaOrmDatabaseClient::connect().await {
        Ok(db) => Arc::new(db),
        Err(err) => {
            tracing::error!(error = %err, "database unavailable");
            std::process::exit(1);
        }
    };

    let state = AppState::new(db, config.clone());
    if let Err(err) = state.accounts().ensure_bootstrap_admin().await {
        tracing::error!(error = %err, "failed to ensure bootstrap administrator");
    }

    let app = handler::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "store-api listening");
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }
    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
