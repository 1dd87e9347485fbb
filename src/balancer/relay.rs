//! Per-client relay: one backend round trip for every client chunk.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::pool::BackendPool;

/// Client and backend reads are capped at this many bytes.
const CHUNK_SIZE: usize = 1024;

/// Where a relay stopped.
#[derive(Debug)]
pub enum RelayError {
    ClientRead(io::Error),
    Connect { backend: String, source: io::Error },
    BackendWrite { backend: String, source: io::Error },
    BackendRead { backend: String, source: io::Error },
    BackendClosed { backend: String },
    ClientWrite(io::Error),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::ClientRead(e) => write!(f, "Error reading: {e}"),
            RelayError::Connect { backend, source } => {
                write!(f, "Error connecting to server {backend}: {source}")
            }
            RelayError::BackendWrite { backend, source } => {
                write!(f, "Error sending to server {backend}: {source}")
            }
            RelayError::BackendRead { backend, source } => {
                write!(f, "Error receiving from server {backend}: {source}")
            }
            RelayError::BackendClosed { backend } => {
                write!(f, "Error receiving from server {backend}: connection closed")
            }
            RelayError::ClientWrite(e) => write!(f, "Error sending to client: {e}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::ClientRead(e) | RelayError::ClientWrite(e) => Some(e),
            RelayError::Connect { source, .. }
            | RelayError::BackendWrite { source, .. }
            | RelayError::BackendRead { source, .. } => Some(source),
            RelayError::BackendClosed { .. } => None,
        }
    }
}

/// Relay one client connection until it ends or a hop fails.
///
/// A fresh backend connection is opened per chunk and closed once its
/// single reply has been passed back.
pub async fn relay_client<S>(
    mut client: S,
    peer: SocketAddr,
    pool: &BackendPool,
) -> Result<(), RelayError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request = [0u8; CHUNK_SIZE];
    let mut reply = [0u8; CHUNK_SIZE];

    loop {
        let n = client.read(&mut request).await.map_err(RelayError::ClientRead)?;
        if n == 0 {
            debug!(%peer, "Client disconnected");
            return Ok(());
        }

        info!(
            %peer,
            data = %String::from_utf8_lossy(&request[..n]),
            "Received from client"
        );

        let backend = pool.next();
        let m = round_trip(backend, &request[..n], &mut reply).await?;

        client
            .write_all(&reply[..m])
            .await
            .map_err(RelayError::ClientWrite)?;
    }
}

/// Send `request` to `backend` and read back one reply into `reply`.
async fn round_trip(backend: &str, request: &[u8], reply: &mut [u8]) -> Result<usize, RelayError> {
    let mut conn = TcpStream::connect(backend)
        .await
        .map_err(|source| RelayError::Connect {
            backend: backend.to_string(),
            source,
        })?;

    conn.write_all(request)
        .await
        .map_err(|source| RelayError::BackendWrite {
            backend: backend.to_string(),
            source,
        })?;

    let n = conn
        .read(reply)
        .await
        .map_err(|source| RelayError::BackendRead {
            backend: backend.to_string(),
            source,
        })?;
    if n == 0 {
        return Err(RelayError::BackendClosed {
            backend: backend.to_string(),
        });
    }

    debug!(backend, bytes = n, "Relayed reply");
    Ok(n)
}
