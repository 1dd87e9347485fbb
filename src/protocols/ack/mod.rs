//! Acknowledgment protocol.
//!
//! There is no framing. Whatever a single read returns is one message:
//!
//! ```text
//! Request:  "  hello world  \n"
//! Response: Your request handled by server No. 7. he received this: "hello world"
//! ```
//!
//! The response carries no delimiter. A message split across two reads
//! gets two responses, and two messages delivered in one read share one.

pub mod handler;
pub mod parser;

pub use handler::handle_connection;
pub use parser::{decode, format_response};
