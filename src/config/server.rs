//! Per-server connection settings.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{
    default_connect_timeout, default_flood_penalty, default_flood_threshold, default_socks_port,
    default_tls_ciphers, default_true,
};

/// How TLS is applied to a server connection.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Wrap the connection in TLS immediately.
    Yes,
    /// Plain text only.
    #[default]
    No,
    /// Connect in plain text; the in-band upgrade happens above this layer.
    StartTls,
}

/// Restricts which resolved addresses are tried.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4 only.
    Inet,
    /// IPv6 only.
    Inet6,
}

/// Connection settings for one IRC server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Network name used to tag events (e.g., "libera").
    pub name: String,
    /// Server hostname or IP address.
    pub host: String,
    /// Explicit port. Defaults to 6697 with TLS, 6667 without.
    #[serde(default)]
    pub port: Option<u16>,
    /// TLS mode.
    #[serde(default)]
    pub tls: TlsMode,
    /// Client certificate (PEM) for SASL EXTERNAL / CertFP.
    #[serde(default)]
    pub tls_client_cert: Option<PathBuf>,
    /// Client private key (PEM). Falls back to `tls_client_cert`.
    #[serde(default)]
    pub tls_client_key: Option<PathBuf>,
    /// Passphrase for an encrypted client key.
    #[serde(default)]
    pub tls_client_key_password: Option<String>,
    /// Trusted server certificate or CA bundle (PEM). Replaces the system roots.
    #[serde(default)]
    pub tls_server_cert: Option<PathBuf>,
    /// TLS 1.2 cipher suite selection, colon-separated.
    #[serde(default = "default_tls_ciphers")]
    pub tls_ciphers: String,
    /// TLS 1.3 cipher suite selection, colon-separated.
    #[serde(default)]
    pub tls13_ciphers: Option<String>,
    /// Verify the server certificate. Disable only for self-signed test servers.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
    /// SOCKS5 proxy host.
    #[serde(default)]
    pub socks_host: Option<String>,
    /// SOCKS5 proxy port.
    #[serde(default = "default_socks_port")]
    pub socks_port: u16,
    /// SOCKS5 username (RFC 1929).
    #[serde(default)]
    pub socks_username: Option<String>,
    /// SOCKS5 password (RFC 1929).
    #[serde(default)]
    pub socks_password: Option<String>,
    /// Local hostname or address to bind before connecting.
    #[serde(default)]
    pub bind_hostname: Option<String>,
    /// Restrict resolution to one address family.
    #[serde(default)]
    pub protocol_family: Option<AddressFamily>,
    /// Seconds allowed for resolve + connect + proxy + TLS handshake.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Seconds of flood budget charged per outbound line.
    #[serde(default = "default_flood_penalty")]
    pub flood_penalty: f64,
    /// Seconds of flood budget that may be outstanding before sends are delayed.
    #[serde(default = "default_flood_threshold")]
    pub flood_threshold: f64,
}

impl ServerSettings {
    /// Settings for `host` with every optional knob at its default.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: None,
            tls: TlsMode::default(),
            tls_client_cert: None,
            tls_client_key: None,
            tls_client_key_password: None,
            tls_server_cert: None,
            tls_ciphers: default_tls_ciphers(),
            tls13_ciphers: None,
            tls_verify: true,
            socks_host: None,
            socks_port: default_socks_port(),
            socks_username: None,
            socks_password: None,
            bind_hostname: None,
            protocol_family: None,
            connect_timeout: default_connect_timeout(),
            flood_penalty: default_flood_penalty(),
            flood_threshold: default_flood_threshold(),
        }
    }
}
