//! Structures kept for sites upgraded from before the structure choice existed.
//!
//! Both keep producing the URLs older installs already published, so links
//! in the wild keep resolving after an upgrade.

use super::PairedUrlStructure;
use crate::paired_url::PairedUrl;

/// Legacy transitional-mode URLs: the query var form.
#[derive(Debug, Clone)]
pub struct LegacyTransitionalUrlStructure {
    paired_url: PairedUrl,
}

impl LegacyTransitionalUrlStructure {
    pub fn new(paired_url: PairedUrl) -> Self {
        Self { paired_url }
    }
}

impl PairedUrlStructure for LegacyTransitionalUrlStructure {
    fn add_endpoint(&self, url: &str) -> String {
        self.paired_url.add_query_var(url)
    }

    fn has_endpoint(&self, url: &str) -> bool {
        self.paired_url.has_query_var(url)
    }

    fn remove_endpoint(&self, url: &str) -> String {
        self.paired_url.remove_query_var(url)
    }
}

/// Legacy reader-mode URLs.
///
/// Pretty permalinks get the path suffix; plain permalinks fall back to the
/// query var. Either form is recognized and removed.
#[derive(Debug, Clone)]
pub struct LegacyReaderUrlStructure {
    paired_url: PairedUrl,
    using_permalinks: bool,
}

impl LegacyReaderUrlStructure {
    pub fn new(paired_url: PairedUrl, using_permalinks: bool) -> Self {
        Self {
            paired_url,
            using_permalinks,
        }
    }
}

impl PairedUrlStructure for LegacyReaderUrlStructure {
    fn add_endpoint(&self, url: &str) -> String {
        if self.has_endpoint(url) {
            return url.to_string();
        }
        if self.using_permalinks {
            self.paired_url.add_path_suffix(url)
        } else {
            self.paired_url.add_query_var(url)
        }
    }

    fn has_endpoint(&self, url: &str) -> bool {
        self.paired_url.has_path_suffix(url) || self.paired_url.has_query_var(url)
    }

    fn remove_endpoint(&self, url: &str) -> String {
        let url = self.paired_url.remove_query_var(url);
        self.paired_url.remove_path_suffix(&url)
    }

    fn uses_path_suffix(&self) -> bool {
        self.using_permalinks
    }
}
