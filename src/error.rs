//! Unified error handling for slirc-net.
//!
//! Errors are split by the phase of a connection they belong to:
//! acquiring the transport, decoding inbound lines, and the running
//! connection as a whole.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Transport Errors (acquisition)
// ============================================================================

/// Errors raised while opening a transport to a server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("no usable address for {0}")]
    NoAddress(String),

    #[error("failed to bind local address {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("connection attempt timed out after {0}s")]
    Timeout(u64),

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("certificate error ({}): {message}", path.display())]
    Certificate { path: PathBuf, message: String },

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("SOCKS proxy rejected the request: {0}")]
    Proxy(&'static str),

    #[error("SOCKS protocol error: {0}")]
    ProxyProtocol(String),

    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "resolve",
            Self::NoAddress(_) => "no_address",
            Self::Bind { .. } => "bind",
            Self::Connect { .. } => "connect",
            Self::Timeout(_) => "timeout",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::Certificate { .. } => "certificate",
            Self::Tls(_) => "tls",
            Self::Proxy(_) => "proxy_rejected",
            Self::ProxyProtocol(_) => "proxy_protocol",
            Self::Io(_) => "io",
        }
    }
}

impl From<tokio_rustls::rustls::Error> for TransportError {
    fn from(e: tokio_rustls::rustls::Error) -> Self {
        Self::Tls(e.to_string())
    }
}

// ============================================================================
// Codec Errors (inbound framing)
// ============================================================================

/// Errors produced by the line codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong { actual: usize, limit: usize },

    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Connection Errors (running connection)
// ============================================================================

/// Reasons a connection terminated with an `Error` event.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Read(#[from] CodecError),

    #[error("write error: {0}")]
    Write(#[source] io::Error),

    /// The send loop ran out of work, which only happens when every
    /// producer handle for the outbound queue is gone.
    #[error("internal error: outbound queue closed")]
    QueueClosed,
}

impl ConnectionError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(e) => e.error_code(),
            Self::Read(CodecError::LineTooLong { .. }) => "line_too_long",
            Self::Read(CodecError::Io(_)) => "read",
            Self::Write(_) => "write",
            Self::QueueClosed => "queue_closed",
        }
    }
}
