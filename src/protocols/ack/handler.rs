//! Acknowledgment protocol handler for the Tokio runtime.

use bytes::BytesMut;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use super::parser::{decode, format_response};
use crate::config::ServerId;

/// Read buffer size, one chunk at most
const BUFFER_SIZE: usize = 64 * 1024;

/// Handle an acknowledgment protocol connection.
///
/// Every successful read is answered with exactly one response. Returns
/// `Ok` when the peer ends its stream and `Err` on the first socket error;
/// either way the caller drops the stream afterwards.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    id: ServerId,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    loop {
        buffer.clear();

        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            info!(%peer, "Client disconnected");
            return Ok(());
        }

        info!(
            %peer,
            data = %String::from_utf8_lossy(&buffer),
            "Data received from client"
        );

        let message = decode(&buffer);
        stream.write_all(&format_response(&id, &message)).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_single_chunk() {
        let stream = Builder::new()
            .read(b"  hello world  \n")
            .write(b"Your request handled by server No. 7. he received this: \"hello world\"")
            .build();

        handle_connection(stream, peer(), ServerId::new("7"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_blank_chunk_gets_empty_quotes() {
        let stream = Builder::new()
            .read(b" \r\n")
            .write(b"Your request handled by server No. 1. he received this: \"\"")
            .build();

        handle_connection(stream, peer(), ServerId::new("1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sequential_chunks_in_order() {
        let stream = Builder::new()
            .read(b"first\n")
            .write(b"Your request handled by server No. 3. he received this: \"first\"")
            .read(b"second\n")
            .write(b"Your request handled by server No. 3. he received this: \"second\"")
            .read(b"third")
            .write(b"Your request handled by server No. 3. he received this: \"third\"")
            .build();

        handle_connection(stream, peer(), ServerId::new("3"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_one_response_per_chunk() {
        // Two lines in one read are one message.
        let stream = Builder::new()
            .read(b"a\nb\n")
            .write(b"Your request handled by server No. 9. he received this: \"a\nb\"")
            .build();

        handle_connection(stream, peer(), ServerId::new("9"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_split_message_gets_two_responses() {
        let stream = Builder::new()
            .read(b"hel")
            .write(b"Your request handled by server No. 6. he received this: \"hel\"")
            .read(b"lo\n")
            .write(b"Your request handled by server No. 6. he received this: \"lo\"")
            .build();

        handle_connection(stream, peer(), ServerId::new("6"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_read_error_ends_connection() {
        let stream = Builder::new()
            .read(b"ok")
            .write(b"Your request handled by server No. 4. he received this: \"ok\"")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer",
            ))
            .build();

        let err = handle_connection(stream, peer(), ServerId::new("4"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn test_write_error_ends_connection() {
        let stream = Builder::new()
            .read(b"ok")
            .write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "broken pipe",
            ))
            .build();

        let err = handle_connection(stream, peer(), ServerId::new("4"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_immediate_eof() {
        let stream = Builder::new().build();

        handle_connection(stream, peer(), ServerId::new("5"))
            .await
            .unwrap();
    }
}
