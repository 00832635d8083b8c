//! How the client obtains a byte stream to the server.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Opens a fresh stream for every connection attempt.
#[async_trait]
pub trait Connector: Send {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn connect(&mut self) -> io::Result<Self::Stream>;
}

/// Plain TCP to an already-resolved endpoint.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: SocketAddr,
}

impl TcpConnector {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&mut self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(self.addr).await?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!("failed to set TCP_NODELAY: {}", e);
        }
        Ok(stream)
    }
}
