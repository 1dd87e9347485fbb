//! TCP balancer in front of a pool of ack-servers.
//!
//! Each chunk a client sends is forwarded to one backend picked by the
//! configured [`Algorithm`], and that backend's first reply is written
//! back to the client:
//!
//! ```text
//! client --"hi"--> balancer --"hi"--> 127.0.0.1:1237
//! client <--ack--- balancer <--ack--- 127.0.0.1:1237
//! ```
//!
//! Consecutive chunks from the same client may land on different backends.

pub mod config;
pub mod pool;
pub mod relay;

pub use config::BalancerConfig;
pub use pool::{Algorithm, BackendPool};
pub use relay::{relay_client, RelayError};

use crate::server::create_listener;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Balancer instance
pub struct Balancer {
    listener: TcpListener,
    pool: Arc<BackendPool>,
}

impl Balancer {
    /// Bind the client-facing listener.
    ///
    /// Fails with `InvalidInput` for a malformed address or an empty backend list.
    pub fn bind(config: &BalancerConfig) -> io::Result<Self> {
        let addr: SocketAddr = config
            .listen
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let pool = BackendPool::new(config.backends.clone(), config.algorithm)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::from_std(create_listener(addr)?)?;

        Ok(Balancer {
            listener,
            pool: Arc::new(pool),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept clients until the task is dropped.
    pub async fn run(self) -> io::Result<()> {
        let addr = self.local_addr()?;
        info!(
            address = %addr,
            backends = self.pool.len(),
            algorithm = ?self.pool.algorithm(),
            "Balancer is listening on port {}",
            addr.port()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    info!(%peer, "New connection");

                    let pool = Arc::clone(&self.pool);
                    tokio::spawn(async move {
                        if let Err(e) = relay_client(stream, peer, &pool).await {
                            error!(%peer, error = %e, "Relay failed");
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
