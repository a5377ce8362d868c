//! Messages pushed to connected hot-reload clients.

use serde::Serialize;
use tokio::sync::broadcast;

/// Capacity of the client broadcast channel.
const CHANNEL_CAPACITY: usize = 64;

/// HMR message types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HmrMessage {
    /// Sent once when a client connects.
    Connected,
    /// A rebuild started.
    Building,
    /// The app should reload completely.
    Reload,
    /// Build error.
    Error { message: String },
}

impl HmrMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"error"}"#.to_string())
    }
}

/// Fan-out of [`HmrMessage`]s to every connected client.
#[derive(Debug, Clone)]
pub struct HmrBroadcaster {
    tx: broadcast::Sender<HmrMessage>,
}

impl HmrBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Send to all clients. Returns how many received it.
    pub fn send(&self, message: HmrMessage) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HmrMessage> {
        self.tx.subscribe()
    }
}

/// Next message for one client.
///
/// A client that fell behind skips the dropped messages and keeps receiving.
/// `None` once the broadcaster is gone.
pub(crate) async fn next_message(rx: &mut broadcast::Receiver<HmrMessage>) -> Option<HmrMessage> {
    loop {
        match rx.recv().await {
            Ok(message) => return Some(message),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "hot client lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

impl Default for HmrBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
