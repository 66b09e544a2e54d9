//! `?<slug>=1` structure.

use super::PairedUrlStructure;
use crate::paired_url::PairedUrl;

/// Marker carried as a query parameter.
#[derive(Debug, Clone)]
pub struct QueryVarUrlStructure {
    paired_url: PairedUrl,
}

impl QueryVarUrlStructure {
    pub fn new(paired_url: PairedUrl) -> Self {
        Self { paired_url }
    }
}

impl PairedUrlStructure for QueryVarUrlStructure {
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
