//! Cache Key Module
//!
//! Derives deterministic cache keys from request identity.

use serde_json::Value;

use crate::cache::method::{Method, MethodSpec};

/// Storage prefix shared by every cache entry key.
pub const ENTRY_PREFIX: &str = "http_cache.entry.";

// == Request Body ==
/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Raw text, sent and hashed as-is
    Text(String),
    /// Structured body, serialized to JSON with sorted object keys
    Json(Value),
}

impl RequestBody {
    /// Canonical string form used both on the wire and for fingerprinting.
    pub fn canonical(&self) -> String {
        match self {
            RequestBody::Text(text) => text.clone(),
            // Value's maps are ordered, so this output is stable.
            RequestBody::Json(value) => value.to_string(),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, RequestBody::Json(_))
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

// == Body Fingerprint ==
/// Compact summary of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyFingerprint {
    /// Length in UTF-16 code units
    pub length: usize,
    /// 32-bit rolling hash
    pub hash: i32,
}

impl BodyFingerprint {
    /// Fingerprint of a request without a body. An empty text body maps to
    /// the same pair.
    pub const ABSENT: BodyFingerprint = BodyFingerprint { length: 0, hash: 0 };

    pub fn of(body: Option<&RequestBody>) -> Self {
        match body {
            Some(body) => Self::of_str(&body.canonical()),
            None => Self::ABSENT,
        }
    }

    pub fn of_str(text: &str) -> Self {
        Self {
            length: text.encode_utf16().count(),
            hash: hash_string(text),
        }
    }
}

// == Hash ==
/// Java-style string hash over UTF-16 code units, wrapping at 32 bits.
pub fn hash_string(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

// == Derive Key ==
/// Derives the storage key for a request.
///
/// Returns `None` when the method cannot be resolved; such requests never
/// take part in caching.
pub fn derive_key(
    method: impl Into<MethodSpec>,
    url: &str,
    body: Option<&RequestBody>,
) -> Option<String> {
    let method = Method::resolve(method)?;
    let fingerprint = BodyFingerprint::of(body);
    Some(format!(
        "{}{}.{}.{}.{}",
        ENTRY_PREFIX,
        method.id(),
        fingerprint.length,
        fingerprint.hash,
        url
    ))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://www.mock.com/test-service-one";

    #[test]
    fn test_hash_known_values() {
        assert_eq!(hash_string(""), 0);
        assert_eq!(hash_string("a"), 97);
        assert_eq!(hash_string("ab"), 97 * 31 + 98);
        // Matches java.lang.String#hashCode
        assert_eq!(hash_string("hello"), 99162322);
    }

    #[test]
    fn test_hash_wraps_to_signed_32_bits() {
        let long = "the quick brown fox jumps over the lazy dog".repeat(4);
        let expected = long
            .encode_utf16()
            .fold(0i64, |h, u| ((h * 31 + i64::from(u)) as i32) as i64);
        assert_eq!(i64::from(hash_string(&long)), expected);
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // U+1F600 is a surrogate pair: two code units
        let fp = BodyFingerprint::of_str("\u{1F600}");
        assert_eq!(fp.length, 2);
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(fp.hash, expected);
    }

    #[test]
    fn test_key_format() {
        let key = derive_key("get", URL, None).unwrap();
        assert_eq!(key, format!("{}0.0.0.{}", ENTRY_PREFIX, URL));

        let body = RequestBody::from("ab");
        let key = derive_key(Method::Post, URL, Some(&body)).unwrap();
        assert_eq!(key, format!("{}1.2.{}.{}", ENTRY_PREFIX, 97 * 31 + 98, URL));
    }

    #[test]
    fn test_unknown_method_has_no_key() {
        assert!(derive_key("somethingbad", URL, None).is_none());
    }

    #[test]
    fn test_bodiless_requests_share_key() {
        assert_eq!(derive_key("get", URL, None), derive_key(Method::Get, URL, None));
    }

    #[test]
    fn test_empty_text_body_keys_like_absent_body() {
        let empty = RequestBody::from("");
        assert_eq!(BodyFingerprint::of(Some(&empty)), BodyFingerprint::ABSENT);
        assert_eq!(
            derive_key("post", URL, Some(&empty)),
            derive_key("post", URL, None)
        );
        assert!(derive_key("post", URL, None).unwrap().contains(".0.0."));

        let blank = RequestBody::from(" ");
        assert_ne!(BodyFingerprint::of(Some(&blank)), BodyFingerprint::ABSENT);
    }

    #[test]
    fn test_json_body_is_stable() {
        let a = RequestBody::from(json!({"b": 2, "a": 1}));
        let b = RequestBody::from(json!({"a": 1, "b": 2}));
        assert_eq!(a.canonical(), r#"{"a":1,"b":2}"#);
        assert_eq!(derive_key("post", URL, Some(&a)), derive_key("post", URL, Some(&b)));
    }

    #[test]
    fn test_key_differs_by_component() {
        let body = RequestBody::from(json!({"test": 1}));
        let other = RequestBody::from(json!({"test": 2}));
        let base = derive_key("post", URL, Some(&body));

        assert_ne!(base, derive_key("put", URL, Some(&body)));
        assert_ne!(base, derive_key("post", "http://www.mock.com/other", Some(&body)));
        assert_ne!(base, derive_key("post", URL, Some(&other)));
        assert_ne!(base, derive_key("post", URL, None));
    }
}
