// Dashboard view model handed to the presentation layer
use super::connection::ConnectionState;
use super::layout::{LayoutSet, LayoutVersion};
use super::telemetry::HistoryWindow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Latest decoded value, 0 until the first frame arrives
    pub current_value: f64,
    pub history: HistoryWindow,
    pub connection_status: ConnectionState,
    pub layout: LayoutSet,
    pub layout_version: LayoutVersion,
}

impl DashboardSnapshot {
    pub fn new(layout: LayoutSet, layout_version: LayoutVersion) -> Self {
        Self {
            current_value: 0.0,
            history: HistoryWindow::new(),
            connection_status: ConnectionState::Disconnected,
            layout,
            layout_version,
        }
    }
}
