// Connection manager - Owns the feed connection and its reconnect loop
use crate::domain::connection::ConnectionState;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Inbound frames of one live connection. The stream ending means the peer
/// closed the connection; an `Err` item means it failed.
pub type FrameStream = BoxStream<'static, anyhow::Result<Bytes>>;

#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Open a receive-only connection to `endpoint`
    async fn connect(&self, endpoint: &str) -> anyhow::Result<FrameStream>;
}

/// Receives connection events synchronously, in the order they happen
pub trait FeedHandler: Send + Sync {
    fn on_state(&self, state: ConnectionState);
    fn on_frame(&self, frame: Bytes);
}

/// Exponential backoff between reconnect attempts
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    /// Retry as soon as a connection drops, with no delay at all
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `attempt` (0-based) since the last successful open
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = attempt.min(32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

struct Worker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct ConnectionManager {
    transport: Arc<dyn FeedTransport>,
    policy: ReconnectPolicy,
    state: Arc<watch::Sender<ConnectionState>>,
    worker: Mutex<Option<Worker>>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn FeedTransport>, policy: ReconnectPolicy) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            policy,
            state: Arc::new(state),
            worker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.worker()
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Spawn the connection task on the current tokio runtime.
    ///
    /// Every state transition and every inbound frame is delivered to
    /// `handler` from that single task. Calling `start` while a connection
    /// task is already running does nothing.
    pub fn start(&self, endpoint: impl Into<String>, handler: Arc<dyn FeedHandler>) {
        let mut worker = self.worker();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            tracing::warn!("Feed connection already running, ignoring start");
            return;
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let feed = FeedLoop {
            transport: self.transport.clone(),
            endpoint: endpoint.into(),
            policy: self.policy.clone(),
            state: self.state.clone(),
            handler,
        };
        let handle = tokio::spawn(feed.run(shutdown_rx));

        *worker = Some(Worker { shutdown, handle });
    }

    /// Tear down the live connection and stop retrying.
    ///
    /// Returns once the connection task has exited; the handler is not
    /// invoked again after that.
    pub async fn stop(&self) {
        let worker = self.worker().take();
        let Some(worker) = worker else {
            return;
        };

        let _ = worker.shutdown.send(());
        if let Err(e) = worker.handle.await {
            if !e.is_cancelled() {
                tracing::error!("Feed connection task failed: {}", e);
            }
        }
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(worker) = self.worker().take() {
            worker.handle.abort();
        }
    }
}

struct FeedLoop {
    transport: Arc<dyn FeedTransport>,
    endpoint: String,
    policy: ReconnectPolicy,
    state: Arc<watch::Sender<ConnectionState>>,
    handler: Arc<dyn FeedHandler>,
}

impl FeedLoop {
    fn publish(&self, next: ConnectionState) {
        self.state.send_replace(next);
        self.handler.on_state(next);
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut attempt: u32 = 0;
        self.publish(ConnectionState::Connecting);

        loop {
            let connected = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.transport.connect(&self.endpoint) => result,
            };

            match connected {
                Ok(mut frames) => {
                    attempt = 0;
                    self.publish(ConnectionState::Connected);
                    tracing::info!("Connected to streaming service at {}", self.endpoint);

                    loop {
                        tokio::select! {
                            biased;
                            _ = &mut shutdown => {
                                self.publish(ConnectionState::Disconnected);
                                return;
                            }
                            next = frames.next() => match next {
                                Some(Ok(frame)) => self.handler.on_frame(frame),
                                Some(Err(e)) => {
                                    tracing::warn!("Feed connection error: {:#}", e);
                                    break;
                                }
                                None => {
                                    tracing::info!("Disconnected from streaming service");
                                    break;
                                }
                            }
                        }
                    }

                    self.publish(ConnectionState::Disconnected);
                    self.publish(ConnectionState::Connecting);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        "Failed to connect to {}: {:#}",
                        self.endpoint,
                        e
                    );
                }
            }

            let delay = self.policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            if !delay.is_zero() {
                tracing::debug!("Reconnecting in {:?}", delay);
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            } else {
                // Keep an unreachable endpoint from starving the runtime
                tokio::task::yield_now().await;
            }
        }

        self.publish(ConnectionState::Disconnected);
    }
}
