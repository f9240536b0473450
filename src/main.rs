mod api_doc;
mod app;
mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("rust-mongo-items starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = storage::from_config(&config).await?;
    let app = app::build_router(AppState::new(store));

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}{}", addr, routes::SWAGGER_UI);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
