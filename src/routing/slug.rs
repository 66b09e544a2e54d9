//! Slug guard for path-suffix structures.
//!
//! A post named like the marker would make `/amp/` ambiguous between the
//! post and the paired front page, so that slug is numbered away.

use super::PairedRouting;

impl PairedRouting {
    /// `<marker>` becomes `<marker>-2`, `-3`, ... skipping slugs already taken.
    ///
    /// Only applies while the active structure uses the path suffix.
    pub fn filter_unique_post_slug(
        &self,
        slug: String,
        post_id: Option<u64>,
        post_type: &str,
    ) -> String {
        if slug != self.options.get().slug || !self.paired_url_structure().uses_path_suffix() {
            return slug;
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{slug}-{suffix}");
            if !self.host.post_slug_taken(&candidate, post_id, post_type) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
