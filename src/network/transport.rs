//! Transport acquisition and release.
//!
//! [`acquire`] resolves the server (or proxy), opens the TCP socket, runs
//! the SOCKS5 handshake when a proxy is configured and finally wraps the
//! stream in TLS. The whole sequence is bounded by the connect timeout.

use crate::config::AddressFamily;
use crate::error::TransportError;
use crate::network::params::ConnectionParams;
use crate::network::stream::NetStream;
use crate::network::{socks, tls};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream, lookup_host};
use tokio::sync::OnceCell;
use tokio_rustls::rustls::RootCertStore;
use tokio_rustls::rustls::crypto::{CryptoProvider, aws_lc_rs};
use tracing::{debug, info, warn};

/// Upper bound on the graceful shutdown performed by [`release`].
const RELEASE_TIMEOUT: Duration = Duration::from_secs(1);

/// Shared state for transport acquisition.
///
/// Cheap to clone. The operating system's root store is loaded the first
/// time a verifying TLS connection needs it and reused afterwards.
#[derive(Clone)]
pub struct TransportContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    provider: Arc<CryptoProvider>,
    native_roots: OnceCell<Arc<RootCertStore>>,
}

impl TransportContext {
    /// Context using the default aws-lc-rs crypto provider.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(aws_lc_rs::default_provider()))
    }

    pub fn with_provider(provider: Arc<CryptoProvider>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                provider,
                native_roots: OnceCell::new(),
            }),
        }
    }

    pub fn crypto_provider(&self) -> Arc<CryptoProvider> {
        Arc::clone(&self.inner.provider)
    }

    /// The system root certificates, loaded on first use.
    pub async fn native_roots(&self) -> Result<Arc<RootCertStore>, TransportError> {
        self.inner
            .native_roots
            .get_or_try_init(|| async {
                let roots = tokio::task::spawn_blocking(tls::load_native_roots)
                    .await
                    .map_err(|e| TransportError::Tls(format!("loading native roots failed: {e}")))?;
                Ok::<_, TransportError>(Arc::new(roots))
            })
            .await
            .cloned()
    }
}

impl Default for TransportContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportContext")
            .field("native_roots_loaded", &self.inner.native_roots.initialized())
            .finish()
    }
}

/// An established byte stream to an IRC server.
#[derive(Debug)]
pub struct Transport {
    stream: NetStream,
    host: String,
    port: u16,
}

impl Transport {
    /// The server hostname this transport was opened for.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }

    /// Address of the socket peer: the proxy when one is in use.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.tcp().peer_addr()
    }

    pub fn stream_mut(&mut self) -> &mut NetStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> NetStream {
        self.stream
    }

    /// Shut the transport down gracefully.
    pub async fn release(self) {
        release(self.stream).await
    }
}

/// Open a transport according to `params`.
pub async fn acquire(
    params: &ConnectionParams,
    ctx: &TransportContext,
) -> Result<Transport, TransportError> {
    if params.connect_timeout.is_zero() {
        return establish(params, ctx).await;
    }
    match tokio::time::timeout(params.connect_timeout, establish(params, ctx)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(params.connect_timeout.as_secs())),
    }
}

/// Shut down `stream` with a bounded wait, then drop it.
///
/// For TLS this sends close_notify before the TCP FIN. Failures are only
/// logged; the socket is closed on drop either way.
pub async fn release<S>(mut stream: S)
where
    S: AsyncWrite + Unpin,
{
    match tokio::time::timeout(RELEASE_TIMEOUT, stream.shutdown()).await {
        Ok(Ok(())) => debug!("Transport shut down"),
        Ok(Err(e)) => debug!(error = %e, "Transport shutdown failed"),
        Err(_) => debug!("Transport shutdown timed out"),
    }
}

async fn establish(
    params: &ConnectionParams,
    ctx: &TransportContext,
) -> Result<Transport, TransportError> {
    let (dial_host, dial_port) = match &params.socks {
        Some(proxy) => (proxy.host.as_str(), proxy.port),
        None => (params.host.as_str(), params.port),
    };

    let mut tcp = connect_tcp(
        dial_host,
        dial_port,
        params.family,
        params.bind_hostname.as_deref(),
    )
    .await?;

    if let Err(e) = enable_keepalive(&tcp) {
        warn!("failed to enable TCP keepalive: {}", e);
    }

    if let Some(proxy) = &params.socks {
        debug!(proxy = %proxy.host, port = proxy.port, "Negotiating SOCKS5 tunnel");
        socks::connect(&mut tcp, &params.host, params.port, proxy.auth.as_ref()).await?;
    }

    let stream = match &params.tls {
        Some(tls_params) => {
            let config = tls::client_config(tls_params, ctx).await?;
            NetStream::Tls(Box::new(tls::upgrade(tcp, &params.host, config).await?))
        }
        None => NetStream::Plain(tcp),
    };

    info!(
        host = %params.host,
        port = params.port,
        tls = stream.is_tls(),
        proxied = params.socks.is_some(),
        "Transport established"
    );

    Ok(Transport {
        stream,
        host: params.host.clone(),
        port: params.port,
    })
}

fn family_matches(family: Option<AddressFamily>, addr: &SocketAddr) -> bool {
    match family {
        None => true,
        Some(AddressFamily::Inet) => addr.is_ipv4(),
        Some(AddressFamily::Inet6) => addr.is_ipv6(),
    }
}

/// Resolve `host` and connect to the first address that accepts.
async fn connect_tcp(
    host: &str,
    port: u16,
    family: Option<AddressFamily>,
    bind: Option<&str>,
) -> Result<TcpStream, TransportError> {
    let candidates: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            source,
        })?
        .filter(|addr| family_matches(family, addr))
        .collect();

    if candidates.is_empty() {
        return Err(TransportError::NoAddress(host.to_string()));
    }

    let locals: Option<Vec<SocketAddr>> = match bind {
        Some(bind) => Some(
            lookup_host((bind, 0))
                .await
                .map_err(|source| TransportError::Resolve {
                    host: bind.to_string(),
                    source,
                })?
                .collect(),
        ),
        None => None,
    };

    let mut last_error = None;
    for addr in candidates {
        match connect_one(addr, bind, locals.as_deref()).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "Connection attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| TransportError::NoAddress(host.to_string())))
}

async fn connect_one(
    addr: SocketAddr,
    bind: Option<&str>,
    locals: Option<&[SocketAddr]>,
) -> Result<TcpStream, TransportError> {
    let connect_err = |source| TransportError::Connect {
        addr: addr.to_string(),
        source,
    };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(connect_err)?;

    if let (Some(bind), Some(locals)) = (bind, locals) {
        let local = locals
            .iter()
            .find(|local| local.is_ipv4() == addr.is_ipv4())
            .ok_or_else(|| TransportError::Bind {
                addr: bind.to_string(),
                source: io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no local address of the same family",
                ),
            })?;
        socket.bind(*local).map_err(|source| TransportError::Bind {
            addr: local.to_string(),
            source,
        })?;
    }

    socket.connect(addr).await.map_err(connect_err)
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}
