//! Marker slug collisions with host resources.
//!
//! Under a path-suffix structure `/hello/amp/` is ambiguous when something
//! on the site is itself named `amp`. The report is advisory: nothing is
//! renamed, the settings screen only shows what collides.

use serde::Serialize;

use crate::host::Host;
use crate::log;

/// Host resources whose identifier equals the marker slug.
///
/// Categories serialize in a fixed order and only when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Post ids with the slug
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<u64>,
    /// Term ids with the slug
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<u64>,
    /// User ids with the slug as login
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<u64>,
    /// Registered post type with the slug as name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_types: Vec<String>,
    /// Registered taxonomy with the slug as name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taxonomies: Vec<String>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }

    /// Names of the non-empty categories, in report order.
    pub fn categories(&self) -> Vec<&'static str> {
        [
            (!self.posts.is_empty(), "posts"),
            (!self.terms.is_empty(), "terms"),
            (!self.users.is_empty(), "users"),
            (!self.post_types.is_empty(), "post_types"),
            (!self.taxonomies.is_empty(), "taxonomies"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }

    /// `None` when nothing collides, matching the options read model.
    pub fn into_option(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// Look up every resource named `slug`. Recomputed on each call.
pub fn detect_conflicts(host: &dyn Host, slug: &str) -> ConflictReport {
    let owned = |exists: bool| {
        if exists {
            vec![slug.to_string()]
        } else {
            Vec::new()
        }
    };

    ConflictReport {
        posts: host.find_posts_by_slug(slug),
        terms: host.find_terms_by_slug(slug),
        users: host.find_users_by_login(slug),
        post_types: owned(host.post_type_exists(slug)),
        taxonomies: owned(host.taxonomy_exists(slug)),
    }
}

/// Print conflicts using the standard log format.
///
/// ```text
/// [warning] `amp` collides with 2 categories
///   - posts: 12, 40
///   - users: 3
/// ```
pub fn print_conflicts(slug: &str, report: &ConflictReport) {
    let categories = report.categories();
    if categories.is_empty() {
        return;
    }

    log!("warning"; "`{}` collides with {} categor{}", slug, categories.len(),
        if categories.len() == 1 { "y" } else { "ies" });
    for line in format_conflicts(report).lines() {
        eprintln!("  - {line}");
    }
}

/// One `category: ids` line per non-empty category.
pub fn format_conflicts(report: &ConflictReport) -> String {
    let ids = |ids: &[u64]| ids.iter().map(u64::to_string).collect::<Vec<_>>().join(", ");
    let mut lines = Vec::new();
    if !report.posts.is_empty() {
        lines.push(format!("posts: {}", ids(&report.posts)));
    }
    if !report.terms.is_empty() {
        lines.push(format!("terms: {}", ids(&report.terms)));
    }
    if !report.users.is_empty() {
        lines.push(format!("users: {}", ids(&report.users)));
    }
    if !report.post_types.is_empty() {
        lines.push(format!("post_types: {}", report.post_types.join(", ")));
    }
    if !report.taxonomies.is_empty() {
        lines.push(format!("taxonomies: {}", report.taxonomies.join(", ")));
    }
    lines.join("\n")
}
