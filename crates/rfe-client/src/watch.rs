//! Reconnecting change-notification channel.
//!
//! The client subscribes one directory at a time by sending
//! `{"action":"watch","path":...}`; the server answers with a bare `change`
//! text frame whenever that directory changes. A dropped connection is
//! retried after a fixed delay and the subscription is re-sent on every
//! reconnect.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rfe_core::RemoteResult;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::WATCH_CHANNEL_SIZE;

/// Text frame pushed by the server when the watched directory changed.
pub const CHANGE_NOTIFICATION: &str = "change";

#[derive(Debug, Serialize)]
struct WatchMessage<'a> {
    action: &'static str,
    path: &'a str,
}

/// Encode the subscription frame for `path`.
pub fn subscribe_frame(path: &str) -> String {
    serde_json::to_string(&WatchMessage {
        action: "watch",
        path,
    })
    .unwrap_or_default()
}

/// Connection state, independent of the transport.
#[derive(Debug, Clone)]
pub struct WatchConnection {
    connected: bool,
    path: Option<String>,
    reconnect_delay: Duration,
}

impl WatchConnection {
    /// Create a disconnected state.
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            connected: false,
            path: None,
            reconnect_delay,
        }
    }

    /// Whether the channel is open.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The subscribed directory.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Delay before reconnecting.
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// The channel opened. Returns the frame re-subscribing the current path.
    pub fn on_open(&mut self) -> Option<String> {
        self.connected = true;
        self.path.as_deref().map(subscribe_frame)
    }

    /// Switch the subscription. Returns the frame to send while connected.
    pub fn subscribe(&mut self, path: impl Into<String>) -> Option<String> {
        let path = path.into();
        let frame = self.connected.then(|| subscribe_frame(&path));
        self.path = Some(path);
        frame
    }

    /// Whether an inbound frame asks for a reload.
    pub fn on_message(&self, text: &str) -> bool {
        text.trim() == CHANGE_NOTIFICATION
    }

    /// The channel closed. Returns whether it had been open.
    pub fn on_close(&mut self) -> bool {
        std::mem::replace(&mut self.connected, false)
    }
}

/// An open watch socket.
#[async_trait]
pub trait WatchSocket: Send {
    /// Send a text frame.
    async fn send(&mut self, text: String) -> RemoteResult<()>;

    /// Next text frame. `None` once the peer closed the connection.
    async fn recv(&mut self) -> Option<RemoteResult<String>>;

    /// Close the connection.
    async fn close(&mut self);
}

/// Opens watch sockets.
#[async_trait]
pub trait WatchTransport: Send + Sync {
    async fn connect(&self) -> RemoteResult<Box<dyn WatchSocket>>;
}

/// Notifications from the watch driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// The channel opened and the current path was subscribed.
    Connected,
    /// The subscribed directory changed; reload it silently.
    Change,
    /// The channel closed; a reconnect is scheduled.
    Disconnected,
}

/// Handle to a running watch driver. Dropping it stops the driver.
#[derive(Debug)]
pub struct WatchHandle {
    path_tx: watch::Sender<Option<String>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Subscribe to `path`. Safe to call redundantly.
    pub fn subscribe(&self, path: &str) {
        self.path_tx.send_replace(Some(path.to_string()));
    }

    /// Stop the driver and wait for the socket to close.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start the watch driver on the current runtime.
pub fn start_watch(
    transport: Arc<dyn WatchTransport>,
    initial_path: Option<String>,
    reconnect_delay: Duration,
) -> (WatchHandle, mpsc::Receiver<WatchEvent>) {
    let (tx, rx) = mpsc::channel(WATCH_CHANNEL_SIZE);
    let (path_tx, path_rx) = watch::channel(initial_path);
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    let task = tokio::spawn(async move {
        watch_loop(transport, path_rx, reconnect_delay, tx, token).await;
    });

    let handle = WatchHandle {
        path_tx,
        cancel,
        task: Some(task),
    };
    (handle, rx)
}

enum Step {
    PathChanged,
    Stop,
    Inbound(Option<RemoteResult<String>>),
}

async fn watch_loop(
    transport: Arc<dyn WatchTransport>,
    mut path_rx: watch::Receiver<Option<String>>,
    reconnect_delay: Duration,
    tx: mpsc::Sender<WatchEvent>,
    cancel: CancellationToken,
) {
    let mut conn = WatchConnection::new(reconnect_delay);

    loop {
        let latest = path_rx.borrow_and_update().clone();
        if let Some(path) = latest {
            conn.subscribe(path);
        }

        let connected = tokio::select! {
            _ = cancel.cancelled() => return,
            connected = transport.connect() => connected,
        };

        match connected {
            Ok(mut socket) => {
                let frame = conn.on_open();
                debug!(path = ?conn.path(), "Watch channel open");
                if let Some(frame) = frame {
                    if let Err(e) = socket.send(frame).await {
                        warn!(error = %e, "Failed to send watch subscription");
                    }
                }
                if tx.send(WatchEvent::Connected).await.is_err() {
                    return;
                }

                loop {
                    let step = tokio::select! {
                        _ = cancel.cancelled() => Step::Stop,
                        changed = path_rx.changed() => match changed {
                            Ok(()) => Step::PathChanged,
                            Err(_) => Step::Stop,
                        },
                        inbound = socket.recv() => Step::Inbound(inbound),
                    };

                    match step {
                        Step::PathChanged => {
                            let latest = path_rx.borrow_and_update().clone();
                            let Some(path) = latest else { continue };
                            let Some(frame) = conn.subscribe(path) else { continue };
                            if let Err(e) = socket.send(frame).await {
                                warn!(error = %e, "Watch send failed, closing");
                                socket.close().await;
                                break;
                            }
                        }
                        Step::Stop => {
                            debug!("Watch driver stopping");
                            socket.close().await;
                            return;
                        }
                        Step::Inbound(Some(Ok(text))) => {
                            if conn.on_message(&text) && tx.send(WatchEvent::Change).await.is_err() {
                                return;
                            }
                        }
                        Step::Inbound(Some(Err(e))) => {
                            warn!(error = %e, "Watch channel error, closing");
                            socket.close().await;
                            break;
                        }
                        Step::Inbound(None) => break,
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "Watch channel connect failed");
            }
        }

        if conn.on_close() && tx.send(WatchEvent::Disconnected).await.is_err() {
            return;
        }
        debug!(delay_ms = conn.reconnect_delay().as_millis() as u64, "Watch channel reconnecting");
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(conn.reconnect_delay()) => {}
        }
    }
}
