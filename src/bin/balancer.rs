//! ack-balancer: forwards client chunks to a pool of ack-servers
//!
//! Backends are picked round-robin by default, or uniformly at random
//! with `--algo random`.

use ack_echo::balancer::{Balancer, BalancerConfig};
use ack_echo::logging;
use ack_echo::server;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BalancerConfig::load()?;

    logging::init(&config.log_level);

    info!(
        listen = %config.listen,
        backends = ?config.backends,
        algorithm = ?config.algorithm,
        "Starting ack-balancer"
    );

    // One worker per core
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let runtime = server::build_runtime(workers)?;
    runtime.block_on(async {
        let balancer = Balancer::bind(&config)?;
        balancer.run().await
    })?;

    Ok(())
}
