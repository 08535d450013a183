// HTTP request handlers
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::layout::{LayoutSet, LayoutVersion};
use crate::infrastructure::snapshot_stream::snapshot_sse;
use crate::presentation::app_state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub layout: LayoutSet,
    pub layout_version: LayoutVersion,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current view model
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot())
}

/// Snapshot stream for live clients
pub async fn stream_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    snapshot_sse(state.dashboard.watch())
}

pub async fn get_layout(State(state): State<Arc<AppState>>) -> Json<LayoutResponse> {
    let snapshot = state.dashboard.snapshot();
    Json(LayoutResponse {
        layout: snapshot.layout,
        layout_version: snapshot.layout_version,
    })
}

/// Save a layout after a drag/resize. The layout is adopted even when the
/// write fails; 202 tells the client it will not survive a restart.
pub async fn save_layout(
    State(state): State<Arc<AppState>>,
    Json(layout): Json<LayoutSet>,
) -> impl IntoResponse {
    let persisted = state.dashboard.save_layout(layout);
    let snapshot = state.dashboard.snapshot();
    let status = if persisted {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };

    (
        status,
        Json(LayoutResponse {
            layout: snapshot.layout,
            layout_version: snapshot.layout_version,
        }),
    )
}

pub async fn reset_layout(State(state): State<Arc<AppState>>) -> Json<LayoutResponse> {
    let (layout, layout_version) = state.dashboard.reset_layout();
    Json(LayoutResponse {
        layout,
        layout_version,
    })
}
