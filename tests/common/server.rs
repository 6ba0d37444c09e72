//! Loopback test server.
//!
//! Plays the IRC server side of a connection: accepts one client and lets
//! the test read what the client sent and script what it receives.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// A listening loopback server.
pub struct TestServer {
    listener: TcpListener,
    port: u16,
}

impl TestServer {
    /// Bind to an ephemeral port on 127.0.0.1.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept the next client.
    pub async fn accept(&self) -> anyhow::Result<Peer<tokio::net::TcpStream>> {
        let (stream, _) = timeout(Duration::from_secs(5), self.listener.accept()).await??;
        Ok(Peer::new(stream))
    }

    /// Accept a plain TCP client without wrapping it.
    pub async fn accept_raw(&self) -> anyhow::Result<tokio::net::TcpStream> {
        let (stream, _) = timeout(Duration::from_secs(5), self.listener.accept()).await??;
        Ok(stream)
    }
}

/// The server end of one accepted connection.
pub struct Peer<S> {
    stream: BufReader<S>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Peer<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Write raw bytes to the client.
    pub async fn write_raw(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.stream.get_mut().write_all(data).await?;
        self.stream.get_mut().flush().await?;
        Ok(())
    }

    /// Read one line sent by the client, terminator included.
    pub async fn read_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.stream.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("client closed the connection");
        }
        Ok(line)
    }

    /// Wait for the client to close its end.
    pub async fn expect_eof(&mut self) -> anyhow::Result<()> {
        let mut rest = Vec::new();
        timeout(Duration::from_secs(5), self.stream.read_to_end(&mut rest)).await??;
        Ok(())
    }

    /// Close the server end cleanly.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }
}

impl Peer<tokio::net::TcpStream> {
    /// Drop the connection with an RST instead of a FIN.
    pub fn reset(self) -> anyhow::Result<()> {
        let stream = self.stream.into_inner();
        socket2::SockRef::from(&stream).set_linger(Some(Duration::ZERO))?;
        drop(stream);
        Ok(())
    }
}
