// Application layer - Feed lifecycle, decoding, layout persistence and the dashboard facade
pub mod connection_manager;
pub mod dashboard_service;
pub mod layout_store;
pub mod telemetry_decoder;
