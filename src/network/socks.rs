//! SOCKS5 client handshake (RFC 1928, RFC 1929).
//!
//! Only the CONNECT command with a domain-name destination is used; the
//! proxy resolves the IRC server's hostname.

use crate::error::TransportError;
use crate::network::params::SocksAuth;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const VERSION: u8 = 0x05;
const AUTH_VERSION: u8 = 0x01;

const METHOD_NONE: u8 = 0x00;
const METHOD_USERPASS: u8 = 0x02;
const METHOD_UNACCEPTABLE: u8 = 0xFF;

const CMD_CONNECT: u8 = 0x01;

const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Ask the proxy on `stream` to connect to `host:port`.
///
/// On success the stream carries the tunnelled connection.
pub async fn connect<S>(
    stream: &mut S,
    host: &str,
    port: u16,
    auth: Option<&SocksAuth>,
) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    negotiate_method(stream, auth).await?;
    send_connect(stream, host, port).await?;
    read_reply(stream).await
}

async fn negotiate_method<S>(stream: &mut S, auth: Option<&SocksAuth>) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let greeting: &[u8] = match auth {
        Some(_) => &[VERSION, 2, METHOD_NONE, METHOD_USERPASS],
        None => &[VERSION, 1, METHOD_NONE],
    };
    stream.write_all(greeting).await?;

    let mut choice = [0u8; 2];
    stream.read_exact(&mut choice).await?;
    if choice[0] != VERSION {
        return Err(TransportError::ProxyProtocol(format!(
            "unexpected version {:#04x} in method selection",
            choice[0]
        )));
    }

    match (choice[1], auth) {
        (METHOD_NONE, _) => Ok(()),
        (METHOD_USERPASS, Some(auth)) => authenticate(stream, auth).await,
        (METHOD_UNACCEPTABLE, _) => Err(TransportError::Proxy("no acceptable authentication method")),
        (other, _) => Err(TransportError::ProxyProtocol(format!(
            "proxy selected unsupported method {:#04x}",
            other
        ))),
    }
}

async fn authenticate<S>(stream: &mut S, auth: &SocksAuth) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let username = auth.username.as_bytes();
    let password = auth.password.as_bytes();
    let ulen = u8::try_from(username.len())
        .map_err(|_| TransportError::ProxyProtocol("username longer than 255 bytes".into()))?;
    let plen = u8::try_from(password.len())
        .map_err(|_| TransportError::ProxyProtocol("password longer than 255 bytes".into()))?;

    let mut request = Vec::with_capacity(3 + username.len() + password.len());
    request.push(AUTH_VERSION);
    request.push(ulen);
    request.extend_from_slice(username);
    request.push(plen);
    request.extend_from_slice(password);
    stream.write_all(&request).await?;

    let mut status = [0u8; 2];
    stream.read_exact(&mut status).await?;
    if status[1] != 0x00 {
        return Err(TransportError::Proxy("authentication failed"));
    }
    Ok(())
}

async fn send_connect<S>(stream: &mut S, host: &str, port: u16) -> Result<(), TransportError>
where
    S: AsyncWrite + Unpin,
{
    let host = host.as_bytes();
    let len = u8::try_from(host.len())
        .map_err(|_| TransportError::ProxyProtocol("hostname longer than 255 bytes".into()))?;

    let mut request = Vec::with_capacity(7 + host.len());
    request.extend_from_slice(&[VERSION, CMD_CONNECT, 0x00, ATYP_DOMAIN, len]);
    request.extend_from_slice(host);
    request.extend_from_slice(&port.to_be_bytes());
    stream.write_all(&request).await?;
    Ok(())
}

async fn read_reply<S>(stream: &mut S) -> Result<(), TransportError>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;
    if header[0] != VERSION {
        return Err(TransportError::ProxyProtocol(format!(
            "unexpected version {:#04x} in reply",
            header[0]
        )));
    }
    if header[1] != 0x00 {
        return Err(TransportError::Proxy(reply_message(header[1])));
    }

    // Drain the bound address; it is not needed by the client
    let addr_len = match header[3] {
        ATYP_IPV4 => 4,
        ATYP_IPV6 => 16,
        ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await?;
            usize::from(len[0])
        }
        other => {
            return Err(TransportError::ProxyProtocol(format!(
                "unknown address type {:#04x}",
                other
            )));
        }
    };
    let mut rest = vec![0u8; addr_len + 2];
    stream.read_exact(&mut rest).await?;
    Ok(())
}

/// Text for a SOCKS5 reply code.
pub fn reply_message(code: u8) -> &'static str {
    match code {
        0x01 => "general SOCKS server failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unknown failure",
    }
}
