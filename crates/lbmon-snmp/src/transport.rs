//! Datagram transport seam
//!
//! A walk opens one transport through a [`Connector`], owns it exclusively and
//! closes it before returning. The UDP implementation binds an ephemeral local
//! port; tests substitute scripted transports.

use async_trait::async_trait;
use lbmon_common::{Result, SnmpError};
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// One open datagram channel to an agent
#[async_trait]
pub trait Transport: Send {
    /// Send one datagram to the agent
    async fn send(&mut self, datagram: &[u8]) -> io::Result<()>;

    /// Wait for the next datagram from the agent and return its length.
    /// Callers bound the wait with their own timeout.
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the channel
    async fn close(self: Box<Self>) -> io::Result<()>;
}

/// Opens transports to one agent endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    /// Create and bind a fresh transport. Failures are setup errors.
    async fn open(&self) -> Result<Box<dyn Transport>>;

    /// Human-readable agent endpoint, for logs and snapshots
    fn endpoint(&self) -> String;
}

/// Connector for a UDP agent at `host:port`
#[derive(Debug, Clone)]
pub struct UdpConnector {
    host: String,
    port: u16,
}

impl UdpConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| SnmpError::setup(format!("resolving {}", self.endpoint()), e))?;
        addrs.next().ok_or_else(|| {
            SnmpError::setup(
                format!("resolving {}", self.endpoint()),
                io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            )
        })
    }
}

#[async_trait]
impl Connector for UdpConnector {
    async fn open(&self) -> Result<Box<dyn Transport>> {
        let target = self.resolve().await?;
        let local: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| SnmpError::setup(format!("unable to listen on {}", local), e))?;

        if let Ok(bound) = socket.local_addr() {
            debug!(local = %bound, agent = %target, "Opened UDP transport");
        }
        Ok(Box::new(UdpTransport { socket, target }))
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ephemeral UDP socket talking to one agent
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(datagram, self.target).await?;
        if sent != datagram.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short send: {} of {} bytes", sent, datagram.len()),
            ));
        }
        Ok(())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Not connect(): an ICMP port-unreachable would then fail the recv
        // instead of reading as a lost packet
        loop {
            let (len, from) = self.socket.recv_from(buf).await?;
            if from == self.target {
                return Ok(len);
            }
            warn!(%from, agent = %self.target, len, "Discarding datagram from foreign host");
        }
    }

    async fn close(self: Box<Self>) -> io::Result<()> {
        // Dropping the socket releases the port
        drop(self.socket);
        Ok(())
    }
}
