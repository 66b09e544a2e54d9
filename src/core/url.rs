//! Lossless URL splitting for endpoint transforms.
//!
//! Endpoint add/remove must round-trip byte-for-byte, so URLs are split
//! into raw slices instead of being parsed and re-serialized.
//!
//! - Absolute URLs: `https://example.org/path/?q=1#frag`
//! - Request URIs: `/path/?q=1`

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Raw slices of a URL string.
///
/// Invariant: `head + path + ["?" + query] + ["#" + fragment]` reproduces
/// the input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlParts<'a> {
    /// Scheme and authority (e.g. `https://example.org`), empty for request URIs
    pub head: &'a str,
    /// Path component, possibly empty
    pub path: &'a str,
    /// Query string without the leading `?`
    pub query: Option<&'a str>,
    /// Fragment without the leading `#`
    pub fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    /// Split a URL or request URI into its raw parts.
    pub fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };

        let (head, path) = match rest.find("://") {
            Some(idx) => {
                let authority_start = idx + 3;
                match rest[authority_start..].find('/') {
                    Some(slash) => rest.split_at(authority_start + slash),
                    None => (rest, ""),
                }
            }
            None => ("", rest),
        };

        Self {
            head,
            path,
            query,
            fragment,
        }
    }

    /// Reassemble with a replacement path.
    pub fn with_path(&self, path: &str) -> String {
        assemble(self.head, path, self.query, self.fragment)
    }

    /// Reassemble with a replacement query. `None` drops the `?`, an empty
    /// query keeps it.
    pub fn with_query(&self, query: Option<&str>) -> String {
        assemble(self.head, self.path, query, self.fragment)
    }

    /// Path with an empty path normalized to `/`.
    pub fn path_or_root(&self) -> &'a str {
        if self.path.is_empty() { "/" } else { self.path }
    }
}

/// Join raw URL parts back into a string.
pub fn assemble(head: &str, path: &str, query: Option<&str>, fragment: Option<&str>) -> String {
    let mut url = String::with_capacity(head.len() + path.len() + 16);
    url.push_str(head);
    url.push_str(path);
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

// ============================================================================
// Query String Helpers
// ============================================================================

/// Decode a form-encoded query component (`+` is a space).
pub fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['%', '+']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    Cow::Owned(
        percent_decode_str(&spaced)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| spaced.clone()),
    )
}

/// Iterate `(decoded_key, decoded_value, raw_pair)` over a query string.
pub fn query_pairs(query: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>, &str)> {
    query.split('&').filter(|pair| !pair.is_empty()).map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (decode_component(key), decode_component(value), pair)
    })
}

/// Get the decoded value of the first occurrence of `key`.
pub fn query_value(query: &str, key: &str) -> Option<String> {
    query_pairs(query)
        .find(|(k, _, _)| k == key)
        .map(|(_, v, _)| v.into_owned())
}

/// Remove every occurrence of `key`, keeping other pieces byte-for-byte.
///
/// Empty pieces count as kept, so `""` and `"&amp=1"` both leave `Some("")`.
/// `None` when nothing is left.
pub fn remove_query_key(query: &str, key: &str) -> Option<String> {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let raw_key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            pair.is_empty() || decode_component(raw_key) != key
        })
        .collect();
    (!kept.is_empty()).then(|| kept.join("&"))
}

// ============================================================================
// Path Helpers
// ============================================================================

/// Ensure a single trailing slash.
pub fn trailingslashit(path: &str) -> String {
    format!("{}/", path.trim_end_matches('/'))
}

/// Remove all trailing slashes.
pub fn untrailingslashit(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Host-style request path: URI path without query and surrounding slashes.
///
/// `/2024/01/02/hello/amp/?x=1` -> `2024/01/02/hello/amp`
pub fn request_path(uri: &str) -> &str {
    UrlParts::split(uri).path.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_absolute() {
        let parts = UrlParts::split("https://example.org/foo/?a=1&b=2#top");
        assert_eq!(parts.head, "https://example.org");
        assert_eq!(parts.path, "/foo/");
        assert_eq!(parts.query, Some("a=1&b=2"));
        assert_eq!(parts.fragment, Some("top"));
    }

    #[test]
    fn test_split_request_uri() {
        let parts = UrlParts::split("/2024/01/02/hello/?amp=1");
        assert_eq!(parts.head, "");
        assert_eq!(parts.path, "/2024/01/02/hello/");
        assert_eq!(parts.query, Some("amp=1"));
        assert_eq!(parts.fragment, None);
    }

    #[test]
    fn test_split_bare_host() {
        let parts = UrlParts::split("https://example.org?x=1");
        assert_eq!(parts.head, "https://example.org");
        assert_eq!(parts.path, "");
        assert_eq!(parts.path_or_root(), "/");
        assert_eq!(parts.query, Some("x=1"));
    }

    #[test]
    fn test_split_roundtrip_is_lossless() {
        for url in [
            "https://example.org/a/b/?x=%20y&z#f",
            "/?amp",
            "/p/?&&a=1",
            "http://user:pw@host:8080/path#only-fragment",
            "",
        ] {
            let parts = UrlParts::split(url);
            assert_eq!(
                assemble(parts.head, parts.path, parts.query, parts.fragment),
                url
            );
        }
    }

    #[test]
    fn test_query_value_decodes() {
        assert_eq!(query_value("a=1&amp=1", "amp"), Some("1".to_string()));
        assert_eq!(query_value("a=hello+world", "a"), Some("hello world".to_string()));
        assert_eq!(query_value("a%6Dp=1", "amp"), Some("1".to_string()));
        assert_eq!(query_value("amp", "amp"), Some(String::new()));
        assert_eq!(query_value("foo=1", "amp"), None);
    }

    #[test]
    fn test_remove_query_key_keeps_others_raw() {
        assert_eq!(remove_query_key("a=%20&amp=1&b", "amp").as_deref(), Some("a=%20&b"));
        assert_eq!(remove_query_key("amp=1&amp=2&c=3", "amp").as_deref(), Some("c=3"));
        assert_eq!(remove_query_key("a%6Dp=1&c=3", "amp").as_deref(), Some("c=3"));
        assert_eq!(remove_query_key("amp=1", "amp"), None);
    }

    #[test]
    fn test_remove_query_key_keeps_empty_query() {
        assert_eq!(remove_query_key("", "amp").as_deref(), Some(""));
        assert_eq!(remove_query_key("&amp=1", "amp").as_deref(), Some(""));
        assert_eq!(remove_query_key("a=1&&amp=1", "amp").as_deref(), Some("a=1&"));
    }

    #[test]
    fn test_slash_helpers() {
        assert_eq!(trailingslashit("/foo"), "/foo/");
        assert_eq!(trailingslashit("/foo//"), "/foo/");
        assert_eq!(trailingslashit(""), "/");
        assert_eq!(untrailingslashit("/foo/"), "/foo");
        assert_eq!(untrailingslashit("/"), "");
    }

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/2024/01/02/hello/amp/?x=1"), "2024/01/02/hello/amp");
        assert_eq!(request_path("/"), "");
        assert_eq!(request_path("/?amp=1"), "");
    }
}
