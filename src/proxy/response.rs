//! Response Module
//!
//! The subset of an HTTP response that is returned to callers and persisted
//! in the cache: status, headers, body and final URL.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// == Response ==
/// An HTTP response as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Header name/value pairs in received order
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Raw body bytes; persisted as a string when valid UTF-8
    #[serde(default, with = "body_repr")]
    pub body: Vec<u8>,
    /// URL the response was served from
    #[serde(default)]
    pub url: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            url: String::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

// == Body Representation ==
/// Writes UTF-8 bodies as a JSON string and anything else as a byte array,
/// reading either form back.
mod body_repr {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    #[serde(untagged)]
    enum Body<'a> {
        Text(&'a str),
        Bytes(&'a [u8]),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OwnedBody {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(body) {
            Ok(text) => Body::Text(text).serialize(serializer),
            Err(_) => Body::Bytes(body).serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(match OwnedBody::deserialize(deserializer)? {
            OwnedBody::Text(text) => text.into_bytes(),
            OwnedBody::Bytes(bytes) => bytes,
        })
    }
}
