//! Cache Proxy
//!
//! Wraps a [`Transport`] so that every outbound request first consults the
//! cache, and fresh responses of registered endpoints are recorded.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{derive_key, Method, RequestBody};
use crate::context::HttpCache;
use crate::error::{CacheError, Result};
use crate::proxy::{RequestOptions, Response, Transport, TransportRequest};

// == Cache Proxy ==
/// Caching façade in front of a transport.
pub struct CacheProxy<T: Transport> {
    transport: T,
    cache: Arc<HttpCache>,
    /// Options every call is merged over
    defaults: RequestOptions,
}

impl<T: Transport> CacheProxy<T> {
    pub fn new(transport: T, cache: Arc<HttpCache>) -> Self {
        Self {
            transport,
            cache,
            defaults: RequestOptions::default(),
        }
    }

    /// Replaces the library defaults merged under every call.
    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn cache(&self) -> &Arc<HttpCache> {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn defaults(&self) -> &RequestOptions {
        &self.defaults
    }

    // == Request ==
    /// Sends a request through the cache.
    ///
    /// Without a method in either the options or the defaults the request
    /// is a GET. A method that does not resolve fails with
    /// [`CacheError::UnknownMethod`] before anything else happens.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<Response> {
        let options = self.defaults.merge(options);

        let method = match &options.method {
            None => Method::Get,
            Some(spec) => {
                Method::resolve(spec).ok_or_else(|| CacheError::UnknownMethod(spec.to_string()))?
            }
        };
        let key = derive_key(method, url, options.body.as_ref())
            .ok_or_else(|| CacheError::UnknownMethod(method.to_string()))?;

        // A stored entry is proof the endpoint was cacheable when written
        if let Some(cached) = self.cache.lookup(&key, &options) {
            debug!("Serving {} {} from cache", method, url);
            return Ok(cached);
        }

        let response = self
            .transport
            .issue(TransportRequest {
                method,
                url: url.to_string(),
                body: options.body.clone(),
                headers: options.headers.clone(),
            })
            .await?;

        self.cache
            .cache_response(&key, url, method, &response, &options);
        Ok(response)
    }

    // == Verb Helpers ==
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(url, options.method(Method::Get)).await
    }

    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(url, options.method(Method::Delete)).await
    }

    pub async fn head(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(url, options.method(Method::Head)).await
    }

    pub async fn options(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(url, options.method(Method::Options)).await
    }

    pub async fn post(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(url, options.method(Method::Post).body(body))
            .await
    }

    pub async fn put(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(url, options.method(Method::Put).body(body)).await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(url, options.method(Method::Patch).body(body))
            .await
    }
}
