//! Fixed response headers module
//!
//! Holds the ordered header set stamped onto every response.

use hyper::header::{HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN};

pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");
pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");

/// Ordered list of headers added to every response
#[derive(Debug, Clone)]
pub struct HeaderSet {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderSet {
    /// Permissive CORS plus the COOP/COEP pair browsers require before
    /// enabling `SharedArrayBuffer` for WebAssembly threads.
    pub fn cross_origin_isolation() -> Self {
        Self {
            entries: vec![
                (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
                (CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("same-origin")),
                (CROSS_ORIGIN_EMBEDDER_POLICY, HeaderValue::from_static("require-corp")),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    /// Write every header into `headers`, in order.
    ///
    /// A value already present under the same name is replaced.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_set_values() {
        let set = HeaderSet::cross_origin_isolation();
        let pairs: Vec<(&str, &str)> = set
            .iter()
            .map(|(n, v)| (n.as_str(), v.to_str().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("access-control-allow-origin", "*"),
                ("cross-origin-opener-policy", "same-origin"),
                ("cross-origin-embedder-policy", "require-corp"),
            ]
        );
    }

    #[test]
    fn test_apply_replaces_existing() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("https://a.test"));
        headers.insert("content-type", HeaderValue::from_static("text/css"));

        HeaderSet::cross_origin_isolation().apply(&mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[CROSS_ORIGIN_EMBEDDER_POLICY], "require-corp");
        assert_eq!(headers["content-type"], "text/css");
        assert_eq!(headers.len(), 4);
    }
}
