//! Connection parameters derived from server settings.
//!
//! [`build_connection_params`] is a pure mapping: no I/O happens here and it
//! cannot fail. Files named by the TLS parameters are only opened during
//! transport acquisition.

use crate::config::{AddressFamily, ServerSettings, TlsMode};
use std::path::PathBuf;
use std::time::Duration;

/// Default plain-text IRC port.
pub const PLAIN_PORT: u16 = 6667;
/// Default TLS IRC port.
pub const TLS_PORT: u16 = 6697;

/// Everything needed to open a transport to one server.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsParams>,
    pub socks: Option<SocksParams>,
    pub bind_hostname: Option<String>,
    pub family: Option<AddressFamily>,
    pub connect_timeout: Duration,
}

/// TLS client parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsParams {
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub server_cert: Option<PathBuf>,
    pub ciphers: String,
    pub tls13_ciphers: Option<String>,
    pub verify: bool,
    pub key_password: Option<String>,
}

/// SOCKS5 proxy parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocksParams {
    pub host: String,
    pub port: u16,
    pub auth: Option<SocksAuth>,
}

/// RFC 1929 username/password credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SocksAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SocksAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocksAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Build the connection parameters for `settings`.
///
/// TLS parameters are attached only for [`TlsMode::Yes`]. With
/// [`TlsMode::StartTls`] the connection starts in plain text; use
/// [`build_tls_params`] for the later upgrade.
pub fn build_connection_params(settings: &ServerSettings) -> ConnectionParams {
    let tls = build_tls_params(settings);
    let use_tls = settings.tls == TlsMode::Yes;

    ConnectionParams {
        host: settings.host.clone(),
        port: settings
            .port
            .unwrap_or(if use_tls { TLS_PORT } else { PLAIN_PORT }),
        tls: use_tls.then_some(tls),
        socks: build_socks_params(settings),
        bind_hostname: settings.bind_hostname.clone(),
        family: settings.protocol_family,
        connect_timeout: Duration::from_secs(settings.connect_timeout),
    }
}

/// Build TLS parameters regardless of the configured TLS mode.
pub fn build_tls_params(settings: &ServerSettings) -> TlsParams {
    TlsParams {
        client_cert: settings.tls_client_cert.clone(),
        client_key: settings
            .tls_client_key
            .clone()
            .or_else(|| settings.tls_client_cert.clone()),
        server_cert: settings.tls_server_cert.clone(),
        ciphers: settings.tls_ciphers.clone(),
        tls13_ciphers: settings.tls13_ciphers.clone(),
        verify: settings.tls_verify,
        key_password: settings.tls_client_key_password.clone(),
    }
}

fn build_socks_params(settings: &ServerSettings) -> Option<SocksParams> {
    let host = settings.socks_host.clone()?;
    let auth = match (&settings.socks_username, &settings.socks_password) {
        (Some(username), Some(password)) => Some(SocksAuth {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };
    Some(SocksParams {
        host,
        port: settings.socks_port,
        auth,
    })
}
