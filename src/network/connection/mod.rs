//! Per-network connection handle.
//!
//! ```text
//!  send() ──▶ outbound queue ──▶ send_loop ──▶ RateLimit ──┐
//!                                                          ▼
//!                                                      transport
//!                                                          │
//!  events ◀── Line / Error / Close ◀── recv_loop ◀─────────┘
//! ```
//!
//! [`NetworkConnection::create`] returns immediately; the supervisor task
//! does all I/O in the background and reports through the shared event
//! channel.

mod event;
mod lifecycle;
mod tasks;

pub use event::{ConnectionId, NetworkEvent};
pub use lifecycle::{ConnectionState, Outcome, race};
pub use tasks::{recv_loop, send_loop};

use crate::config::ServerSettings;
use crate::metrics;
use crate::network::transport::TransportContext;
use crate::telemetry::spans;
use bytes::Bytes;
use lifecycle::Supervisor;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info};

/// A live connection to one IRC network.
#[derive(Debug)]
pub struct NetworkConnection {
    network: Arc<str>,
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Bytes>,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl NetworkConnection {
    /// Start connecting to the server described by `settings`.
    ///
    /// Must be called within a tokio runtime. Failures are reported as an
    /// `Error` event on `events`, never returned from here.
    pub fn create(
        network: impl Into<Arc<str>>,
        ctx: TransportContext,
        settings: ServerSettings,
        events: mpsc::Sender<NetworkEvent>,
    ) -> Self {
        let network = network.into();
        let id = ConnectionId::next();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);

        let span = spans::connection(&network, id, &settings.host);
        let supervisor = Supervisor {
            network: Arc::clone(&network),
            id,
            settings,
            ctx,
            events,
            outbound: outbound_rx,
            state: state_tx,
        };
        let task = tokio::spawn(supervisor.run().instrument(span));

        Self {
            network,
            id,
            outbound,
            state,
            task,
        }
    }

    /// Queue one raw line, terminator included.
    ///
    /// Never blocks. Lines queued after the connection terminated are
    /// silently dropped.
    pub fn send(&self, line: impl Into<Bytes>) {
        let _ = self.outbound.send(line.into());
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// True once the supervisor task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the connection and wait for the teardown to finish.
    ///
    /// Both loops are stopped and the transport is closed before this
    /// returns. No `Error` or `Close` event is produced by the abort itself;
    /// a terminal event already queued by a connection that ended on its
    /// own stays in the channel.
    pub async fn abort(self) {
        self.task.abort();
        match self.task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => error!(network = %self.network, id = %self.id, error = %e, "Connection task panicked"),
        }
        metrics::record_outcome("aborted");
        info!(network = %self.network, id = %self.id, "Connection aborted");
    }
}
