//! Streaming-data core of a live telemetry dashboard.
//!
//! A WebSocket feed of `{battery_temperature, timestamp}` frames is decoded
//! into a bounded history window, and the panel arrangement is persisted
//! with reset support. [`application::dashboard_service::DashboardService`]
//! composes both into the view model the presentation layer reads.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
