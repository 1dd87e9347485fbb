//! Protocol implementations.
//!
//! Each protocol has a parser module with the pure byte handling and a
//! handler module that drives one Tokio connection.
//!
//! - `ack`: acknowledges every received chunk with the server identifier
//!   and the trimmed text of the chunk

pub mod ack;
