//! ack-server: tags every received chunk with this instance's identifier
//!
//! Each chunk read from a client is decoded as text, trimmed, and answered
//! with `Your request handled by server No. <ID>. he received this: "<text>"`.
//!
//! Several instances with distinct identifiers can sit behind
//! `ack-balancer` to show which one served a request.

use ack_echo::config::Config;
use ack_echo::logging;
use ack_echo::server::{self, Server};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    logging::init(&config.log_level);

    info!(
        id = %config.server_id,
        listen = %config.listen,
        workers = config.workers,
        "Starting ack-server"
    );

    let runtime = server::build_runtime(config.workers)?;
    runtime.block_on(async {
        let server = Server::bind(&config)?;
        server.run().await
    })?;

    Ok(())
}
