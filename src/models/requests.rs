//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies and queries.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::RequestBody;
use crate::proxy::RequestOptions;

/// Request body for service registration (POST /services)
///
/// # Fields
/// - `url`: The endpoint URL
/// - `methods`: Methods to mark cacheable; all methods when omitted
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// The endpoint URL
    pub url: String,
    /// Optional list of verb names
    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

impl RegisterRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        None
    }
}

/// Query for GET /services/cacheable
#[derive(Debug, Clone, Deserialize)]
pub struct CacheableQuery {
    pub url: String,
    pub method: String,
}

/// Request body for PUT /config
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigRequest {
    /// New entry TTL in seconds
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    /// New sweep interval in milliseconds
    #[serde(default)]
    pub sweep_interval_ms: Option<u64>,
}

/// Request body for POST /fetch
///
/// A JSON string body is sent as raw text; any other JSON value is sent as
/// a JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    /// Verb name; GET when omitted
    #[serde(default)]
    pub method: Option<String>,
    /// Upstream URL
    pub url: String,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub do_not_use_cached_response: Option<bool>,
    #[serde(default)]
    pub do_not_cache_response: Option<bool>,
}

impl FetchRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        None
    }

    /// Converts the request into proxy options.
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            method: self.method.clone().map(Into::into),
            body: self.body.clone().map(|body| match body {
                Value::String(text) => RequestBody::Text(text),
                other => RequestBody::Json(other),
            }),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            do_not_use_cached_response: self.do_not_use_cached_response,
            do_not_cache_response: self.do_not_cache_response,
        }
    }
}
