//! ack-echo: a TCP acknowledgment server and the balancer that fronts it.
//!
//! - `server` + `protocols::ack`: answer every received chunk with the
//!   server identifier and the trimmed chunk text
//! - `balancer`: spread client chunks over a pool of servers, round-robin
//!   or at random
//! - `config` / `logging`: CLI + TOML configuration and tracing setup

pub mod balancer;
pub mod config;
pub mod logging;
pub mod protocols;
pub mod server;
