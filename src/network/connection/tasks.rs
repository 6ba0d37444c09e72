//! Send and receive loops.
//!
//! Both loops borrow their half of the transport so the supervisor can
//! reassemble and release it once the race between them is decided.

use super::event::{ConnectionId, NetworkEvent};
use crate::error::{CodecError, ConnectionError};
use crate::metrics;
use crate::network::codec::LineCodec;
use crate::network::limit::RateLimit;
use bytes::Bytes;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace};

/// Drain the outbound queue onto `writer`, one rate-limited line at a time.
///
/// Only returns `Ok` once every sender for the queue is gone.
pub async fn send_loop<W>(
    writer: &mut W,
    outbound: &mut mpsc::UnboundedReceiver<Bytes>,
    limit: &mut RateLimit,
) -> Result<(), ConnectionError>
where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, LineCodec::new());

    while let Some(line) = outbound.recv().await {
        limit.tick().await;

        let len = line.len();
        sink.send(line).await.map_err(write_error)?;
        metrics::record_line_sent(len);
        trace!(bytes = len, "Sent line");
    }

    Ok(())
}

/// Forward inbound lines from `reader` to `events` until EOF.
///
/// Returns `Ok` on a clean close. A dropped event receiver does not stop
/// the loop; lines are discarded instead.
pub async fn recv_loop<R>(
    reader: &mut R,
    events: &mpsc::Sender<NetworkEvent>,
    network: &Arc<str>,
    id: ConnectionId,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(reader, LineCodec::new());

    while let Some(line) = lines.next().await {
        let line = line?;
        metrics::record_line_received(line.len());
        trace!(bytes = line.len(), "Received line");

        let event = NetworkEvent::Line {
            network: Arc::clone(network),
            id,
            time: Utc::now(),
            line,
        };
        if events.send(event).await.is_err() {
            debug!("Event receiver dropped; discarding line");
        }
    }

    Ok(())
}

fn write_error(e: CodecError) -> ConnectionError {
    match e {
        CodecError::Io(e) => ConnectionError::Write(e),
        other => ConnectionError::Write(io::Error::new(io::ErrorKind::InvalidInput, other)),
    }
}
