//! `/<slug>/` structure.

use super::PairedUrlStructure;
use crate::paired_url::PairedUrl;

/// Marker carried as the last path segment.
#[derive(Debug, Clone)]
pub struct PathSuffixUrlStructure {
    paired_url: PairedUrl,
}

impl PathSuffixUrlStructure {
    pub fn new(paired_url: PairedUrl) -> Self {
        Self { paired_url }
    }
}

impl PairedUrlStructure for PathSuffixUrlStructure {
    fn add_endpoint(&self, url: &str) -> String {
        self.paired_url.add_path_suffix(url)
    }

    fn has_endpoint(&self, url: &str) -> bool {
        self.paired_url.has_path_suffix(url)
    }

    fn remove_endpoint(&self, url: &str) -> String {
        self.paired_url.remove_path_suffix(url)
    }

    fn uses_path_suffix(&self) -> bool {
        true
    }
}
