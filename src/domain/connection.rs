// Feed connection state
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        }
    }

    /// Whether moving from `self` to `next` follows the connection lifecycle
    /// Disconnected -> Connecting -> Connected -> Disconnected.
    ///
    /// Stopping the feed mid-connect also publishes Connecting -> Disconnected.
    /// That edge is teardown only and is reported by
    /// [`is_teardown`](Self::is_teardown), not here.
    pub fn leads_to(&self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::Disconnected, ConnectionState::Connecting)
                | (ConnectionState::Connecting, ConnectionState::Connected)
                | (ConnectionState::Connected, ConnectionState::Disconnected)
        )
    }

    /// Whether `self -> next` is the edge published when the feed is stopped
    /// before a connection was established.
    pub fn is_teardown(&self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::Connecting, ConnectionState::Disconnected)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
