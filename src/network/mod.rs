//! Network module.
//!
//! Contains transport acquisition (TCP, SOCKS5, TLS), outbound flood
//! control, line framing and the per-network connection supervisor.

pub mod codec;
pub mod connection;
pub mod limit;
pub mod params;
pub mod socks;
pub mod stream;
pub mod tls;
pub mod transport;

pub use codec::{LineCodec, MAX_LINE_LEN};
pub use connection::{ConnectionId, ConnectionState, NetworkConnection, NetworkEvent};
pub use limit::RateLimit;
pub use params::{ConnectionParams, SocksAuth, SocksParams, TlsParams, build_connection_params};
pub use stream::NetStream;
pub use transport::{Transport, TransportContext, acquire, release};
