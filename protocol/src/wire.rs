//! Framed reads and writes of fixed-size messages over a byte stream

use crate::error::ProtocolError;
use crate::packets::Message;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read exactly one `M` from the stream, waiting at most `timeout`.
///
/// A peer that closes the stream mid-message yields
/// [`ProtocolError::ConnectionClosed`].
pub async fn read_message<M, R>(reader: &mut R, timeout: Duration) -> Result<M, ProtocolError>
where
    M: Message,
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; M::SIZE];

    match tokio::time::timeout(timeout, reader.read_exact(&mut buf)).await {
        Err(_) => Err(ProtocolError::Timeout(timeout)),
        Ok(Err(e)) if e.kind() == ErrorKind::UnexpectedEof => Err(ProtocolError::ConnectionClosed),
        Ok(Err(e)) => Err(ProtocolError::Io(e)),
        Ok(Ok(_)) => Ok(M::from_bytes(&buf)?),
    }
}

pub async fn write_message<M, W>(writer: &mut W, message: &M) -> Result<(), ProtocolError>
where
    M: Message,
    W: AsyncWrite + Unpin,
{
    writer.write_all(&message.to_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RoundResult;
    use crate::packets::{RequestPacket, RoundUpdate};

    #[tokio::test]
    async fn test_read_after_write() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let request = RequestPacket {
            round_count: 2,
            team_name: "Aces".to_string(),
        };

        write_message(&mut a, &request).await.unwrap();
        let received: RequestPacket = read_message(&mut b, Duration::from_secs(1)).await.unwrap();
        assert_eq!(received, request);
    }

    #[tokio::test]
    async fn test_read_times_out() {
        let (_a, mut b) = tokio::io::duplex(64);
        let result = read_message::<RoundUpdate, _>(&mut b, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(ProtocolError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_read_reports_closed_stream() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let bytes = RoundUpdate::result(RoundResult::Win).to_bytes();
        a.write_all(&bytes[..4]).await.unwrap();
        drop(a);

        let result = read_message::<RoundUpdate, _>(&mut b, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_rejects_malformed() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let mut bytes = RoundUpdate::result(RoundResult::Win).to_bytes();
        bytes[1] = 0;
        a.write_all(&bytes).await.unwrap();

        let result = read_message::<RoundUpdate, _>(&mut b, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProtocolError::Packet(_))));
    }
}
