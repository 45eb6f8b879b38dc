//! Offer beacon: periodic UDP broadcast advertising the game port

use anyhow::{Context, Result};
use protocol::packets::{Message, OfferPacket};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

pub struct Beacon {
    socket: UdpSocket,
    target: SocketAddr,
    datagram: Vec<u8>,
    interval: Duration,
}

impl Beacon {
    /// Bind an ephemeral broadcast-capable socket for `offer`
    pub async fn bind(offer: &OfferPacket, target: SocketAddr, interval: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("Failed to bind beacon socket")?;

        socket
            .set_broadcast(true)
            .context("Failed to enable SO_BROADCAST on beacon socket")?;

        Ok(Self {
            socket,
            target,
            datagram: offer.to_bytes(),
            interval,
        })
    }

    /// Broadcast forever. A failed send is logged and the next tick retries.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        let mut sent: u64 = 0;

        loop {
            ticker.tick().await;

            match self.socket.send_to(&self.datagram, self.target).await {
                Ok(_) => {
                    sent += 1;
                    debug!("Sent offer #{} to {}", sent, self.target);
                }
                Err(e) => {
                    warn!("Failed to send offer to {}: {}", self.target, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_beacon_repeats_offer() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap();

        let offer = OfferPacket {
            tcp_port: 40123,
            server_name: "Test Table".to_string(),
        };
        let beacon = Beacon::bind(&offer, target, Duration::from_millis(20))
            .await
            .unwrap();
        let handle = tokio::spawn(beacon.run());

        let mut buf = [0u8; 128];
        for _ in 0..2 {
            let (len, _) = tokio::time::timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
                .await
                .expect("no offer received")
                .unwrap();
            assert_eq!(len, OfferPacket::SIZE);
            assert_eq!(OfferPacket::from_bytes(&buf[..len]).unwrap(), offer);
        }

        handle.abort();
    }
}
