//! Externally registered structures.
//!
//! A plugin or theme registers a provider that builds its own
//! [`PairedUrlStructure`]. The provider is resolved per request and the
//! result is checked against the structure contract on a probe URL before
//! it is used; anything that fails is rejected so the caller can fall back.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PairedUrlStructure;
use crate::paired_url::PairedUrl;

/// Builds a structure from the site's marker primitives.
pub type StructureProvider = Arc<
    dyn Fn(&PairedUrl) -> Result<Box<dyn PairedUrlStructure>, StructureError> + Send + Sync,
>;

/// Why a custom structure was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("custom structure provider failed: {0}")]
    Provider(String),

    #[error("custom structure breaks the endpoint contract on `{url}`: {reason}")]
    Contract { url: String, reason: &'static str },
}

/// What kind of extension declared a custom structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Plugin,
    Theme,
}

/// Provenance of a custom structure, shown in the settings UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Extension slug (e.g. plugin directory name)
    pub slug: String,
    /// Human readable extension name
    pub name: String,
}

impl StructureSource {
    pub fn plugin(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Plugin,
            slug: slug.into(),
            name: name.into(),
        }
    }

    pub fn theme(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Theme,
            slug: slug.into(),
            name: name.into(),
        }
    }
}

/// A registered custom structure: provider plus declared sources.
#[derive(Clone)]
pub struct CustomStructure {
    provider: StructureProvider,
    sources: Vec<StructureSource>,
}

impl CustomStructure {
    pub fn new<F>(provider: F) -> Self
    where
        F: Fn(&PairedUrl) -> Result<Box<dyn PairedUrlStructure>, StructureError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            provider: Arc::new(provider),
            sources: Vec::new(),
        }
    }

    /// Declare where the structure comes from.
    pub fn with_source(mut self, source: StructureSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[StructureSource] {
        &self.sources
    }

    /// Build the structure and check it against the contract on `probe_url`.
    pub fn resolve(
        &self,
        paired_url: &PairedUrl,
        probe_url: &str,
    ) -> Result<Arc<dyn PairedUrlStructure>, StructureError> {
        let structure = (self.provider)(paired_url)?;
        validate_structure(structure.as_ref(), probe_url)?;
        Ok(Arc::from(structure))
    }
}

impl fmt::Debug for CustomStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStructure")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

/// Check the add/has/remove laws on a single canonical URL.
pub fn validate_structure(
    structure: &dyn PairedUrlStructure,
    probe_url: &str,
) -> Result<(), StructureError> {
    let violation = |reason| StructureError::Contract {
        url: probe_url.to_string(),
        reason,
    };

    if structure.has_endpoint(probe_url) {
        return Err(violation("canonical URL reported as paired"));
    }
    let added = structure.add_endpoint(probe_url);
    if added == probe_url || !structure.has_endpoint(&added) {
        return Err(violation("add_endpoint does not mark the URL"));
    }
    if structure.add_endpoint(&added) != added {
        return Err(violation("add_endpoint is not idempotent"));
    }
    if structure.remove_endpoint(&added) != probe_url {
        return Err(violation("remove_endpoint does not restore the URL"));
    }
    Ok(())
}
