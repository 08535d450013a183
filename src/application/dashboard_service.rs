// Dashboard service - Composes the feed, history and layout into one view model
use crate::application::connection_manager::{ConnectionManager, FeedHandler};
use crate::application::layout_store::LayoutStore;
use crate::application::telemetry_decoder::decode_frame;
use crate::domain::connection::ConnectionState;
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::layout::{LayoutSet, LayoutVersion};
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

pub type Listener = Arc<dyn Fn(&DashboardSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

/// Snapshots waiting to be handed to listeners, in mutation order
#[derive(Default)]
struct Dispatch {
    pending: VecDeque<DashboardSnapshot>,
    running: bool,
}

struct Shared {
    state: Mutex<DashboardSnapshot>,
    listeners: Mutex<Listeners>,
    dispatch: Mutex<Dispatch>,
    /// Taken on shutdown so every open snapshot stream ends
    snapshots: Mutex<Option<watch::Sender<DashboardSnapshot>>>,
    layout_store: LayoutStore,
    /// Held across a layout store call and the matching state update
    layout_lock: Mutex<()>,
    closed: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn update(&self, mutate: impl FnOnce(&mut DashboardSnapshot)) {
        if self.apply(mutate) {
            self.drain();
        }
    }

    /// Apply `mutate` and queue the resulting snapshot for listeners.
    ///
    /// The snapshot is queued under the state lock, so queue order is
    /// mutation order. Returns true when the caller must drain the queue
    /// because no other caller is already draining it.
    fn apply(&self, mutate: impl FnOnce(&mut DashboardSnapshot)) -> bool {
        let mut state = lock(&self.state);
        mutate(&mut *state);
        let snapshot = state.clone();

        if let Some(snapshots) = lock(&self.snapshots).as_ref() {
            snapshots.send_replace(snapshot.clone());
        }

        let mut dispatch = lock(&self.dispatch);
        dispatch.pending.push_back(snapshot);
        if dispatch.running {
            return false;
        }
        dispatch.running = true;
        true
    }

    /// Call listeners with no lock held. A listener may call back into the
    /// service; snapshots produced that way are delivered after it returns.
    fn drain(&self) {
        loop {
            let snapshot = {
                let mut dispatch = lock(&self.dispatch);
                match dispatch.pending.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        dispatch.running = false;
                        return;
                    }
                }
            };

            let listeners: Vec<Listener> = lock(&self.listeners)
                .entries
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in &listeners {
                listener(&snapshot);
            }
        }
    }
}

impl FeedHandler for Shared {
    fn on_state(&self, state: ConnectionState) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        self.update(|s| s.connection_status = state);
    }

    fn on_frame(&self, frame: Bytes) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        tracing::debug!("Received: {}", String::from_utf8_lossy(&frame));

        match decode_frame(&frame) {
            Ok(record) => {
                tracing::trace!(at = ?record.observed_at(), value = record.value, "Decoded frame");
                self.update(|s| {
                    s.current_value = record.value;
                    s.history = s.history.append(record);
                });
            }
            Err(e) => tracing::warn!("Dropping telemetry frame: {}", e),
        }
    }
}

/// Owned dashboard state plus the components that feed it
pub struct DashboardService {
    shared: Arc<Shared>,
    connection: ConnectionManager,
    endpoint: String,
}

impl DashboardService {
    /// Loads the saved layout immediately; the feed connects on [`start`](Self::start).
    pub fn new(
        connection: ConnectionManager,
        layout_store: LayoutStore,
        endpoint: impl Into<String>,
    ) -> Self {
        let initial = DashboardSnapshot::new(layout_store.load(), layout_store.version());
        let (snapshots, _) = watch::channel(initial.clone());

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(initial),
                listeners: Mutex::new(Listeners::default()),
                dispatch: Mutex::new(Dispatch::default()),
                snapshots: Mutex::new(Some(snapshots)),
                layout_store,
                layout_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
            connection,
            endpoint: endpoint.into(),
        }
    }

    pub fn start(&self) {
        tracing::info!("Starting telemetry feed from {}", self.endpoint);
        self.connection.start(self.endpoint.clone(), self.shared.clone());
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        lock(&self.shared.state).clone()
    }

    /// Latest snapshot for async consumers; intermediate values may be skipped.
    /// The channel closes on [`shutdown`](Self::shutdown).
    pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
        let live = lock(&self.shared.snapshots).as_ref().map(|tx| tx.subscribe());
        live.unwrap_or_else(|| watch::channel(self.snapshot()).1)
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&DashboardSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut listeners = lock(&self.shared.listeners);
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// A dispatch already in progress on another thread may still deliver
    /// one more snapshot to the removed listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.shared.listeners);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    /// Persist a user-edited layout and make it the current one
    pub fn save_layout(&self, layouts: LayoutSet) -> bool {
        let (saved, drain) = {
            let _layout = lock(&self.shared.layout_lock);
            let saved = self.shared.layout_store.save(&layouts);
            (saved, self.shared.apply(|s| s.layout = layouts))
        };
        if drain {
            self.shared.drain();
        }
        saved
    }

    pub fn reset_layout(&self) -> (LayoutSet, LayoutVersion) {
        let (layouts, version, drain) = {
            let _layout = lock(&self.shared.layout_lock);
            let (layouts, version) = self.shared.layout_store.reset();
            let drain = self.shared.apply(|s| {
                s.layout = layouts.clone();
                s.layout_version = version;
            });
            (layouts, version, drain)
        };
        if drain {
            self.shared.drain();
        }
        (layouts, version)
    }

    /// Stop the feed, drop every listener and close every snapshot stream.
    ///
    /// Once this returns no frame is applied and no listener is called.
    pub async fn shutdown(&self) {
        self.connection.stop().await;
        self.shared.closed.store(true, Ordering::SeqCst);
        lock(&self.shared.listeners).entries.clear();
        let snapshots = lock(&self.shared.snapshots).take();
        drop(snapshots);
        tracing::info!("Dashboard shut down");
    }
}
