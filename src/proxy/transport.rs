//! Transport Module
//!
//! The seam between the cache proxy and whatever actually performs HTTP
//! requests, plus a reqwest-backed implementation.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::cache::{Method, RequestBody};
use crate::proxy::Response;

// == Transport Error ==
/// Failures reported by a transport. The proxy hands these back to the
/// caller unchanged and never caches them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or its response could not be read
    #[error("Request failed: {0}")]
    Request(String),

    /// The upstream did not answer in time
    #[error("Request timed out")]
    Timeout,

    /// The upstream answered with a non-success status
    #[error("Upstream {url} responded with status {status}")]
    Status { status: u16, url: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

// == Transport Request ==
/// A fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
}

// == Transport Trait ==
/// Something that can issue an HTTP request.
pub trait Transport: Send + Sync + 'static {
    fn issue(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

// == Reqwest Transport ==
/// [`Transport`] backed by a `reqwest::Client`.
///
/// Non-2xx responses are reported as [`TransportError::Status`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn issue(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        let client = self.client.clone();

        async move {
            let mut builder = client.request(reqwest_method(request.method), &request.url);

            let has_content_type = request
                .headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                if body.is_json() && !has_content_type {
                    builder = builder.header("content-type", "application/json");
                }
                builder = builder.body(body.canonical());
            }

            debug!("Issuing {} {}", request.method, request.url);
            let response = builder.send().await?;

            let status = response.status().as_u16();
            let url = response.url().to_string();
            if !response.status().is_success() {
                return Err(TransportError::Status { status, url });
            }

            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await?.to_vec();

            Ok(Response {
                status,
                headers,
                body,
                url,
            })
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Head => reqwest::Method::HEAD,
        Method::Patch => reqwest::Method::PATCH,
    }
}
