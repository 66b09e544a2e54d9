//! Host boundary.
//!
//! Routing never parses requests or queries content itself. Everything it
//! needs from the content-management host goes through [`Host`]; the request
//! flow goes through [`Lifecycle`](crate::pipeline::Lifecycle) stages the
//! host runs.
//!
//! [`MemoryHost`] is a complete in-process host with date-based permalinks,
//! used by the tests and as a reference for embedding.

mod memory;

pub use memory::{MemoryHost, Post, PostDate, sanitize_title};

use url::Url;

use crate::pipeline::Query;

/// Redirect status used for every corrective redirect.
pub const REDIRECT_STATUS: u16 = 301;

/// What routing needs from the content-management host.
pub trait Host: Send + Sync {
    /// Site home URL, ending with `/`.
    fn home_url(&self) -> String;

    /// Whether pretty permalinks are enabled.
    fn using_permalinks(&self) -> bool;

    /// Whether permalinks end with `/`.
    fn trailing_slash(&self) -> bool;

    fn find_posts_by_slug(&self, slug: &str) -> Vec<u64>;

    fn find_terms_by_slug(&self, slug: &str) -> Vec<u64>;

    fn find_users_by_login(&self, login: &str) -> Vec<u64>;

    fn post_type_exists(&self, name: &str) -> bool;

    fn taxonomy_exists(&self, name: &str) -> bool;

    /// Whether another post of `post_type` already uses `slug`.
    fn post_slug_taken(&self, slug: &str, exclude: Option<u64>, post_type: &str) -> bool;

    /// Static front page, when the site shows one.
    fn front_page_id(&self) -> Option<u64>;

    /// Current permalink of the post a not-found query asked for by a previous slug.
    fn old_slug_redirect(&self, query: &Query) -> Option<String>;

    /// Run the host's redirect filters. `None` or an empty location vetoes the redirect.
    fn filter_redirect_location(&self, location: String, status: u16) -> Option<String>;

    /// Permalink of the most recent post, if any.
    fn latest_post_permalink(&self) -> Option<String>;
}

/// Absolute URL of a request URI on the host's origin.
///
/// `None` when the home URL has no usable origin.
pub fn current_url(host: &dyn Host, request_uri: &str) -> Option<String> {
    let home = Url::parse(&host.home_url()).ok()?;
    let origin = home.origin();
    if !origin.is_tuple() {
        return None;
    }
    let origin = origin.ascii_serialization();
    if request_uri.starts_with('/') {
        Some(format!("{origin}{request_uri}"))
    } else {
        Some(format!("{origin}/{request_uri}"))
    }
}
