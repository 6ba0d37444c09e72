//! Events reported by network connections.

use crate::error::ConnectionError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one connection instance.
///
/// Every call to [`NetworkConnection::create`](super::NetworkConnection::create)
/// gets a fresh id, so events from an aborted connection can be told apart
/// from those of its replacement on the same network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened on a network connection.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// An inbound line with its terminator removed.
    Line {
        network: Arc<str>,
        id: ConnectionId,
        time: DateTime<Utc>,
        line: Bytes,
    },
    /// The connection failed. Terminal.
    Error {
        network: Arc<str>,
        id: ConnectionId,
        time: DateTime<Utc>,
        cause: Arc<ConnectionError>,
    },
    /// The server closed the connection. Terminal.
    Close {
        network: Arc<str>,
        id: ConnectionId,
        time: DateTime<Utc>,
    },
}

impl NetworkEvent {
    pub fn network(&self) -> &str {
        match self {
            Self::Line { network, .. } | Self::Error { network, .. } | Self::Close { network, .. } => {
                network
            }
        }
    }

    pub fn id(&self) -> ConnectionId {
        match self {
            Self::Line { id, .. } | Self::Error { id, .. } | Self::Close { id, .. } => *id,
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Self::Line { time, .. } | Self::Error { time, .. } | Self::Close { time, .. } => *time,
        }
    }

    /// True for `Error` and `Close`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Line { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line { .. } => "line",
            Self::Error { .. } => "error",
            Self::Close { .. } => "close",
        }
    }
}
