//! Connection supervisor.
//!
//! One supervisor task per connection walks `Connecting -> Running ->
//! Terminated`: it acquires the transport, races the send and receive
//! loops over it, releases it and reports exactly one terminal event.
//! Cancellation happens by aborting the task, in which case nothing is
//! reported.

use super::event::{ConnectionId, NetworkEvent};
use super::tasks::{recv_loop, send_loop};
use crate::config::ServerSettings;
use crate::error::ConnectionError;
use crate::metrics;
use crate::network::limit::RateLimit;
use crate::network::params::build_connection_params;
use crate::network::transport::{self, TransportContext};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Acquiring the transport.
    Connecting,
    /// Send and receive loops are running.
    Running,
    /// The terminal event has been decided.
    Terminated,
}

/// How the race between the send and receive loops ended.
#[derive(Debug)]
pub enum Outcome {
    /// The server closed the connection.
    Closed,
    /// Either side failed.
    Failed(ConnectionError),
}

/// Everything the supervisor task owns.
pub(super) struct Supervisor {
    pub network: Arc<str>,
    pub id: ConnectionId,
    pub settings: ServerSettings,
    pub ctx: TransportContext,
    pub events: mpsc::Sender<NetworkEvent>,
    pub outbound: mpsc::UnboundedReceiver<Bytes>,
    pub state: watch::Sender<ConnectionState>,
}

impl Supervisor {
    pub(super) async fn run(self) {
        let Supervisor {
            network,
            id,
            settings,
            ctx,
            events,
            outbound,
            state,
        } = self;

        let params = build_connection_params(&settings);
        debug!(port = params.port, tls = params.tls.is_some(), "Connecting");

        let outcome = match transport::acquire(&params, &ctx).await {
            Ok(transport) => {
                info!(peer = ?transport.peer_addr().ok(), "Connected");
                state.send_replace(ConnectionState::Running);
                let limit = RateLimit::from_secs_f64(settings.flood_penalty, settings.flood_threshold);
                race(
                    transport.into_stream(),
                    outbound,
                    limit,
                    &events,
                    &network,
                    id,
                )
                .await
            }
            Err(e) => Outcome::Failed(ConnectionError::Transport(e)),
        };

        state.send_replace(ConnectionState::Terminated);
        let event = terminal_event(outcome, network, id);
        if events.send(event).await.is_err() {
            debug!("Event receiver dropped before terminal event");
        }
    }
}

/// Run the send and receive loops over `stream` until one of them ends.
///
/// The losing loop is dropped mid-flight and the stream is released
/// before this returns.
pub async fn race<S>(
    stream: S,
    mut outbound: mpsc::UnboundedReceiver<Bytes>,
    mut limit: RateLimit,
    events: &mpsc::Sender<NetworkEvent>,
    network: &Arc<str>,
    id: ConnectionId,
) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let outcome = tokio::select! {
        result = send_loop(&mut writer, &mut outbound, &mut limit) => match result {
            // Every sender is gone; the handle was dropped without abort
            Ok(()) => Outcome::Failed(ConnectionError::QueueClosed),
            Err(e) => Outcome::Failed(e),
        },
        result = recv_loop(&mut reader, events, network, id) => match result {
            Ok(()) => Outcome::Closed,
            Err(e) => Outcome::Failed(e),
        },
    };

    transport::release(reader.unsplit(writer)).await;
    outcome
}

fn terminal_event(outcome: Outcome, network: Arc<str>, id: ConnectionId) -> NetworkEvent {
    let time = Utc::now();
    match outcome {
        Outcome::Closed => {
            info!("Connection closed by server");
            metrics::record_outcome("close");
            NetworkEvent::Close { network, id, time }
        }
        Outcome::Failed(cause) => {
            warn!(error = %cause, code = cause.error_code(), "Connection failed");
            metrics::record_outcome(cause.error_code());
            NetworkEvent::Error {
                network,
                id,
                time,
                cause: Arc::new(cause),
            }
        }
    }
}
