//! Proxy Module
//!
//! The caching façade over an HTTP transport, and the request and response
//! types that flow through it.

mod client;
mod options;
mod response;
mod transport;

pub use client::CacheProxy;
pub use options::RequestOptions;
pub use response::Response;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest};
