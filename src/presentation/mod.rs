// Presentation layer - HTTP surface for dashboard clients
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_layout, health_check, reset_layout, save_layout, stream_dashboard,
};
use crate::application::dashboard_service::DashboardService;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/layout", get(get_layout).put(save_layout))
        .route("/layout/reset", post(reset_layout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Graceful shutdown future for `axum::serve`: once `signal` fires the
/// dashboard is shut down, which also ends open snapshot streams so the
/// server can drain.
pub async fn shutdown_on(signal: impl Future<Output = ()>, dashboard: Arc<DashboardService>) {
    signal.await;
    dashboard.shutdown().await;
}
