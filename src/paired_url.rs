//! Single-marker URL primitives.
//!
//! The paired marker can ride on a URL in two shapes:
//!
//! ```text
//! query var     https://example.org/hello/?amp=1
//! path suffix   https://example.org/hello/amp/
//! ```
//!
//! Structures compose these primitives; the redirect logic also uses
//! `add_query_var` directly because the query form is always recognized.

use crate::core::UrlParts;
use crate::core::url::{query_value, remove_query_key, trailingslashit, untrailingslashit};

/// Marker value written by `add_query_var`.
pub const QUERY_VAR_VALUE: &str = "1";

/// Marker primitives bound to a slug and the host's trailing-slash convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedUrl {
    slug: String,
    trailing_slash: bool,
}

impl PairedUrl {
    pub fn new(slug: impl Into<String>, trailing_slash: bool) -> Self {
        Self {
            slug: slug.into(),
            trailing_slash,
        }
    }

    /// Marker slug (e.g. `amp`).
    #[inline]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Whether permalinks end with `/`.
    #[inline]
    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    // ------------------------------------------------------------------------
    // Query var
    // ------------------------------------------------------------------------

    /// Whether the URL carries a non-empty marker query parameter.
    pub fn has_query_var(&self, url: &str) -> bool {
        UrlParts::split(url)
            .query
            .and_then(|query| query_value(query, &self.slug))
            .is_some_and(|value| !value.is_empty())
    }

    /// Set `<slug>=1`, replacing any other marker parameter.
    ///
    /// A URL already carrying `<slug>=1` is returned unchanged.
    pub fn add_query_var(&self, url: &str) -> String {
        let parts = UrlParts::split(url);
        if parts
            .query
            .and_then(|query| query_value(query, &self.slug))
            .is_some_and(|value| value == QUERY_VAR_VALUE)
        {
            return url.to_string();
        }

        // An empty query keeps its `?` as an empty leading piece.
        let marker = format!("{}={}", self.slug, QUERY_VAR_VALUE);
        let query = match parts.query.and_then(|query| remove_query_key(query, &self.slug)) {
            Some(rest) => format!("{rest}&{marker}"),
            None => marker,
        };
        parts.with_query(Some(&query))
    }

    /// Drop every marker parameter; other parameters are kept verbatim.
    pub fn remove_query_var(&self, url: &str) -> String {
        let parts = UrlParts::split(url);
        match parts.query {
            Some(query) if query_value(query, &self.slug).is_some() => {
                parts.with_query(remove_query_key(query, &self.slug).as_deref())
            }
            _ => url.to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Path suffix
    // ------------------------------------------------------------------------

    /// Whether the last path segment is the marker slug.
    pub fn has_path_suffix(&self, url: &str) -> bool {
        let path = untrailingslashit(UrlParts::split(url).path);
        path.rsplit_once('/')
            .is_some_and(|(_, last)| last == self.slug)
    }

    /// Append the marker segment before query and fragment.
    ///
    /// `/hello/` -> `/hello/amp/` with trailing slashes, `/hello` -> `/hello/amp` without.
    pub fn add_path_suffix(&self, url: &str) -> String {
        if self.has_path_suffix(url) {
            return url.to_string();
        }

        let parts = UrlParts::split(url);
        let mut path = trailingslashit(untrailingslashit(parts.path));
        path.push_str(&self.slug);
        if self.trailing_slash {
            path.push('/');
        }
        parts.with_path(&path)
    }

    /// Strip the marker segment, restoring the trailing-slash convention.
    pub fn remove_path_suffix(&self, url: &str) -> String {
        if !self.has_path_suffix(url) {
            return url.to_string();
        }

        let parts = UrlParts::split(url);
        let trimmed = untrailingslashit(parts.path);
        let stem = &trimmed[..trimmed.len() - self.slug.len() - 1];
        let path = if self.trailing_slash {
            trailingslashit(stem)
        } else if stem.is_empty() {
            "/".to_string()
        } else {
            stem.to_string()
        };
        parts.with_path(&path)
    }
}
