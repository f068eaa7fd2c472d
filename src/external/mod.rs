//! Clients for services outside this process.

pub mod client;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpTransport, OutboundRequest, ReqwestTransport, TransportError};
