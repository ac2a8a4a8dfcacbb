//! Per-call request options, including the two cache overrides.

use crate::cache::{MethodSpec, RequestBody};

// == Request Options ==
/// Options for a single request.
///
/// Unset fields fall back to the proxy's defaults when the two are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Verb; GET when neither the call nor the defaults name one
    pub method: Option<MethodSpec>,
    /// Request body
    pub body: Option<RequestBody>,
    /// Extra headers; same-named defaults are replaced
    pub headers: Vec<(String, String)>,
    /// Skip the cache lookup and always reach the transport
    pub do_not_use_cached_response: Option<bool>,
    /// Do not store the fresh response even if the endpoint is cacheable
    pub do_not_cache_response: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<MethodSpec>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn do_not_use_cached_response(mut self, value: bool) -> Self {
        self.do_not_use_cached_response = Some(value);
        self
    }

    pub fn do_not_cache_response(mut self, value: bool) -> Self {
        self.do_not_cache_response = Some(value);
        self
    }

    /// Whether the lookup should be skipped.
    pub fn bypasses_cache(&self) -> bool {
        self.do_not_use_cached_response.unwrap_or(false)
    }

    /// Whether the store should be skipped.
    pub fn suppresses_store(&self) -> bool {
        self.do_not_cache_response.unwrap_or(false)
    }

    // == Merge ==
    /// Layers `overrides` on top of `self`, returning a new value.
    ///
    /// `self` is left untouched, so a shared set of defaults can be merged
    /// into any number of calls.
    pub fn merge(&self, overrides: RequestOptions) -> RequestOptions {
        let mut headers = self.headers.clone();
        for (name, value) in overrides.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        RequestOptions {
            method: overrides.method.or_else(|| self.method.clone()),
            body: overrides.body.or_else(|| self.body.clone()),
            headers,
            do_not_use_cached_response: overrides
                .do_not_use_cached_response
                .or(self.do_not_use_cached_response),
            do_not_cache_response: overrides
                .do_not_cache_response
                .or(self.do_not_cache_response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Method;

    #[test]
    fn test_flags_default_to_false() {
        let options = RequestOptions::new();
        assert!(!options.bypasses_cache());
        assert!(!options.suppresses_store());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let defaults = RequestOptions::new()
            .method(Method::Get)
            .header("Accept", "application/json")
            .header("X-Trace", "default")
            .do_not_cache_response(true);
        let call = RequestOptions::new()
            .method("post")
            .header("x-trace", "call")
            .do_not_cache_response(false);

        let merged = defaults.merge(call);

        assert_eq!(merged.method, Some(MethodSpec::from("post")));
        assert_eq!(
            merged.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("x-trace".to_string(), "call".to_string()),
            ]
        );
        assert!(!merged.suppresses_store());
    }

    #[test]
    fn test_merge_does_not_mutate_defaults() {
        let defaults = RequestOptions::new().header("Accept", "text/plain");
        let snapshot = defaults.clone();

        let _ = defaults.merge(RequestOptions::new().header("Accept", "application/json"));
        let _ = defaults.merge(RequestOptions::new().do_not_use_cached_response(true));

        assert_eq!(defaults, snapshot);
    }

    #[test]
    fn test_merge_keeps_default_flags() {
        let defaults = RequestOptions::new().do_not_use_cached_response(true);
        let merged = defaults.merge(RequestOptions::new());
        assert!(merged.bypasses_cache());
    }
}
