//! Front page correction.
//!
//! With a static front page, the host treats `/?amp=1` as the posts listing
//! because a query variable is set. Only the marker (and pagination or
//! preview variables) being set means the front page was asked for.

use super::PairedRouting;
use crate::pipeline::Query;

/// Request variables that may accompany the marker on the front page.
const FRONT_PAGE_QUERY_VARS: [&str; 4] = ["preview", "page", "paged", "cpage"];

impl PairedRouting {
    pub fn correct_query_when_is_front_page(&self, query: &mut Query) {
        let options = self.options.get();
        let slug = options.slug.as_str();

        let is_paired_home = query.is_main
            && query.is_home
            && query.get(slug).is_some_and(|v| !v.is_empty())
            && query.page_id().is_none();
        if !is_paired_home {
            return;
        }

        let Some(front_page) = self.host.front_page_id() else {
            return;
        };
        let only_marker = query
            .requested
            .keys()
            .all(|key| key == slug || FRONT_PAGE_QUERY_VARS.contains(&key.as_str()));
        if !only_marker {
            return;
        }

        query.is_home = false;
        query.is_page = true;
        query.is_singular = true;
        query.is_front_page = true;
        query.set("page_id", front_page.to_string());
    }
}
