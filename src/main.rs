// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use telemetry_dashboard::application::connection_manager::ConnectionManager;
use telemetry_dashboard::application::dashboard_service::DashboardService;
use telemetry_dashboard::application::layout_store::{KeyValueStore, LayoutStore};
use telemetry_dashboard::infrastructure::config::{load_dashboard_config, StorageBackend};
use telemetry_dashboard::infrastructure::file_store::FileStore;
use telemetry_dashboard::infrastructure::memory_store::MemoryStore;
use telemetry_dashboard::infrastructure::websocket_feed::WebSocketTransport;
use telemetry_dashboard::presentation::{self, app_state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Layout persistence (infrastructure layer)
    let storage: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.storage.dir)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!("Layout storage: {}", storage.name());

    // Feed connection and facade (application layer)
    let connection = ConnectionManager::new(
        Arc::new(WebSocketTransport::new()),
        config.reconnect.policy(),
    );
    let dashboard = Arc::new(DashboardService::new(
        connection,
        LayoutStore::new(storage),
        config.feed.endpoint.clone(),
    ));
    dashboard.subscribe(|snapshot| {
        tracing::trace!(
            status = %snapshot.connection_status,
            value = snapshot.current_value,
            points = snapshot.history.len(),
            "dashboard updated"
        );
    });
    dashboard.start();

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        dashboard: dashboard.clone(),
    });
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting telemetry-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(presentation::shutdown_on(
            shutdown_signal(),
            dashboard,
        ))
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
