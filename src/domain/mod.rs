// Domain layer - Core data types with no I/O
pub mod connection;
pub mod dashboard;
pub mod layout;
pub mod telemetry;
