//! Kickoff Back binary entrypoint wiring configuration, the snapshot store and the REST layer.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kickoff_back::{
    config::{AppConfig, StorageBackend},
    dao::snapshot_store::{SnapshotStore, memory::MemorySnapshotStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(&config).await?;
    let app_state = AppState::bootstrap(config, store)
        .await
        .context("loading persisted snapshot")?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the snapshot store selected by the configuration.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("using in-memory snapshot store; data is lost on shutdown");
            Ok(Arc::new(MemorySnapshotStore::new()))
        }
        #[cfg(feature = "file-store")]
        StorageBackend::File => {
            use kickoff_back::dao::snapshot_store::file::FileSnapshotStore;

            let dir = &config.storage.data_dir;
            info!(path = %dir.display(), "using file snapshot store");
            let store = FileSnapshotStore::open(dir.clone())
                .await
                .with_context(|| format!("opening data directory {}", dir.display()))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "file-store"))]
        StorageBackend::File => {
            anyhow::bail!("file storage requested but the `file-store` feature is disabled")
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
