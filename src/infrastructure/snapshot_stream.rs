// Server-sent event stream of dashboard snapshots
use crate::domain::dashboard::DashboardSnapshot;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub const SNAPSHOT_EVENT: &str = "snapshot";

fn snapshot_event(snapshot: &DashboardSnapshot) -> Result<Event, axum::Error> {
    Event::default().event(SNAPSHOT_EVENT).json_data(snapshot)
}

/// Emits the current snapshot immediately, then the latest one after each
/// change. Slow clients skip intermediate snapshots rather than queueing them.
pub fn snapshot_sse(
    snapshots: watch::Receiver<DashboardSnapshot>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = WatchStream::new(snapshots).map(|snapshot| snapshot_event(&snapshot));

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
