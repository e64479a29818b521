//! Probe and stub the 4DIAC/FORTE management protocol
//!
//! # Introduction
//!
//! [4DIAC FORTE](https://eclipse.dev/4diac/) is an IEC 61499 runtime for
//! distributed control applications.  It is managed over a plain TCP socket
//! where requests and responses are small XML documents naming resources and
//! function blocks.
//!
//! This crate contains two diagnostic tools for that dialogue:
//!
//! * [`Client`] connects to a runtime, sends raw buffers and reports a
//!   multi-format [`analysis::Analysis`] of everything that goes over the wire.
//! * [`Server`] is a request stub that answers `QUERY` and `READ` requests
//!   with canned responses, one connection at a time.
//!
//! Neither side frames messages: whatever a single read returns is treated
//! as one message.

pub mod analysis;
pub mod client;
pub mod errors;
pub mod request;
pub mod response;
pub mod server;

pub use analysis::Analysis;
pub use client::{Client, Timeouts};
pub use errors::{Error, Result};
pub use request::Request;
pub use response::Response;
pub use server::Server;

/// Default TCP port of a FORTE runtime.
pub const FORTE_PORT: u16 = 61499;

/// Size of the buffer for a single receive, on both sides.
pub const RECV_BUFFER_SIZE: usize = 1024;

#[cfg(test)]
mod test;
