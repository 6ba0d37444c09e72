//! Test client side.
//!
//! Wraps a [`NetworkConnection`] and its event channel so tests can
//! assert on the event sequence.

use slirc_net::config::ServerSettings;
use slirc_net::network::{NetworkConnection, NetworkEvent, TransportContext};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// A connection under test together with the receiving end of its events.
pub struct TestClient {
    pub conn: NetworkConnection,
    pub events: mpsc::Receiver<NetworkEvent>,
}

impl TestClient {
    /// Settings for a plain connection to `127.0.0.1:port` with flood
    /// control effectively disabled.
    pub fn settings(port: u16) -> ServerSettings {
        let mut settings = ServerSettings::new("testnet", "127.0.0.1");
        settings.port = Some(port);
        settings.flood_penalty = 0.001;
        settings.flood_threshold = 1000.0;
        settings.connect_timeout = 5;
        settings
    }

    pub fn connect(settings: ServerSettings) -> Self {
        let (tx, events) = mpsc::channel(64);
        let name = settings.name.clone();
        let conn = NetworkConnection::create(name, TransportContext::new(), settings, tx);
        Self { conn, events }
    }

    /// Receive the next event.
    pub async fn next_event(&mut self) -> anyhow::Result<NetworkEvent> {
        match timeout(Duration::from_secs(5), self.events.recv()).await? {
            Some(event) => Ok(event),
            None => anyhow::bail!("event channel closed"),
        }
    }

    /// Receive the next event and require it to be a line.
    pub async fn expect_line(&mut self) -> anyhow::Result<Vec<u8>> {
        match self.next_event().await? {
            NetworkEvent::Line { line, .. } => Ok(line.to_vec()),
            other => anyhow::bail!("expected a line, got {:?}", other),
        }
    }

    /// Assert no event arrives within `wait`.
    pub async fn expect_silence(&mut self, wait: Duration) {
        if let Ok(event) = timeout(wait, self.events.recv()).await {
            panic!("unexpected event: {event:?}");
        }
    }
}
