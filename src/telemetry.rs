//! Telemetry utilities.

/// Standardized span constructors.
pub mod spans {
    use crate::network::ConnectionId;
    use tracing::{Span, info_span};

    /// Span for one connection's supervisor task.
    pub fn connection(network: &str, id: ConnectionId, host: &str) -> Span {
        info_span!("connection", network = %network, id = %id, host = %host)
    }
}
