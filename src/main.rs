use anyhow::anyhow;
use axum::http::HeaderValue;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use townsquare::config::{AppConfig, StoreBackend};
use townsquare::http::{self, HttpOptions};
use townsquare::infra::db::Db;
use townsquare::infra::store::{memory::MemoryStore, StoreClient};
use townsquare::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store = match config.store_backend {
        StoreBackend::Postgres => {
            let db = Db::connect(&config).await?;
            db.migrate().await?;
            StoreClient::postgres(db)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on shutdown");
            StoreClient::memory(MemoryStore::new())
        }
    };

    let cors_allow_origin = config
        .cors_allow_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .map_err(|err| anyhow!("invalid CORS_ALLOW_ORIGIN: {}", err))?;

    let app = http::service(
        AppState { store },
        HttpOptions {
            cors_allow_origin,
            max_body_bytes: config.max_body_bytes,
        },
    );

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
