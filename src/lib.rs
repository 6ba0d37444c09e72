//! slirc-net - network layer for the Straylight IRC client.
//!
//! Opens plain, TLS and SOCKS5-proxied connections to IRC servers, paces
//! outbound lines with a leaky-bucket flood limiter and reports inbound
//! lines and connection termination as [`NetworkEvent`]s.
//!
//! ```no_run
//! use slirc_net::config::ServerSettings;
//! use slirc_net::network::{NetworkConnection, NetworkEvent, TransportContext};
//! use tokio::sync::mpsc;
//!
//! # async fn demo() {
//! let (events, mut rx) = mpsc::channel(1024);
//! let settings = ServerSettings::new("libera", "irc.libera.chat");
//! let conn = NetworkConnection::create("libera", TransportContext::new(), settings, events);
//! conn.send(&b"NICK demo\r\nUSER demo 0 * :demo\r\n"[..]);
//!
//! while let Some(event) = rx.recv().await {
//!     if let NetworkEvent::Line { line, .. } = &event {
//!         println!("{}", String::from_utf8_lossy(line));
//!     }
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! conn.abort().await;
//! # }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod telemetry;

pub use error::{CodecError, ConnectionError, TransportError};
pub use network::{NetworkConnection, NetworkEvent};
