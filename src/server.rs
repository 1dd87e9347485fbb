//! TCP server for acknowledgment connections.
//!
//! Binds the listening socket, accepts connections, and hands each one to
//! the protocol handler on its own task.

use crate::config::{Config, ServerId};
use crate::protocols::ack;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tracing::{error, info};

/// Pending connection backlog for the listening socket
const LISTEN_BACKLOG: i32 = 1024;

/// Server instance
pub struct Server {
    listener: TcpListener,
    id: ServerId,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// Fails if the address is malformed or already taken.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let addr: SocketAddr = config
            .listen
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::from_std(create_listener(addr)?)?;

        Ok(Server {
            listener,
            id: config.server_id.clone(),
        })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the task is dropped.
    pub async fn run(self) -> io::Result<()> {
        let addr = self.local_addr()?;
        info!(address = %addr, "Server {} listening on port {}", self.id, addr.port());

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    info!(%peer, "New connection established");

                    let id = self.id.clone();
                    tokio::spawn(async move {
                        if let Err(e) = ack::handle_connection(stream, peer, id).await {
                            error!(%peer, error = %e, "Server error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Build the Tokio runtime. One worker keeps everything on the calling thread.
pub fn build_runtime(workers: usize) -> io::Result<Runtime> {
    if workers <= 1 {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
    } else {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()
    }
}

/// Create a non-blocking TCP listener with SO_REUSEADDR.
///
/// SO_REUSEPORT stays off so a second instance on the same port fails to bind.
pub(crate) fn create_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}
