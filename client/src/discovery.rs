//! Offer discovery: wait for a server broadcast on the well-known port

use anyhow::{Context, Result};
use protocol::packets::{Message, OfferPacket, PacketError};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

/// A server that advertised itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredServer {
    /// Sender address combined with the advertised TCP port
    pub addr: SocketAddr,
    pub name: String,
}

/// Bind the discovery port with address reuse so several clients can
/// listen on the same host
pub fn bind_listener(port: u16) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .context("Failed to create UDP socket")?;

    socket
        .set_reuse_address(true)
        .context("Failed to set SO_REUSEADDR")?;
    socket
        .set_nonblocking(true)
        .context("Failed to make discovery socket non-blocking")?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket
        .bind(&addr.into())
        .with_context(|| format!("Failed to bind discovery port {}", port))?;

    UdpSocket::from_std(socket.into()).context("Failed to register discovery socket with tokio")
}

/// Validate one datagram as an offer from `from`
pub fn accept_offer(datagram: &[u8], from: SocketAddr) -> Result<DiscoveredServer, PacketError> {
    let offer = OfferPacket::from_bytes(datagram)?;
    Ok(DiscoveredServer {
        addr: SocketAddr::new(from.ip(), offer.tcp_port),
        name: offer.server_name,
    })
}

/// Block until the first valid offer arrives; everything else is noise
pub async fn wait_for_offer(socket: &UdpSocket) -> Result<DiscoveredServer> {
    let mut buf = [0u8; 1024];

    loop {
        let (len, from) = socket
            .recv_from(&mut buf)
            .await
            .context("Failed to receive on discovery socket")?;

        match accept_offer(&buf[..len], from) {
            Ok(server) => return Ok(server),
            Err(e) => debug!("Ignoring datagram from {}: {}", from, e),
        }
    }
}
