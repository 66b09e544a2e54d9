//! Paired URL structures.
//!
//! A structure is a reversible URL transform that marks a URL as the paired
//! variant of a canonical resource.
//!
//! | Key                   | Paired form                | Notes                          |
//! |-----------------------|----------------------------|--------------------------------|
//! | `query_var`           | `/hello/?amp=1`            | default for fresh installs     |
//! | `path_suffix`         | `/hello/amp/`              | needs slug-collision guard     |
//! | `legacy_transitional` | `/hello/?amp=1`            | upgraded transitional sites    |
//! | `legacy_reader`       | `/hello/amp/`              | upgraded reader sites          |
//! | `custom`              | provider defined           | see [`CustomStructure`]        |
//!
//! # Contract
//!
//! For every canonical `url`:
//!
//! ```text
//! remove_endpoint(add_endpoint(url)) == url
//! add_endpoint(add_endpoint(url))    == add_endpoint(url)
//! ```

mod custom;
mod legacy;
mod path_suffix;
mod query_var;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::paired_url::PairedUrl;

pub use custom::{
    CustomStructure, SourceKind, StructureError, StructureProvider, StructureSource,
    validate_structure,
};
pub use legacy::{LegacyReaderUrlStructure, LegacyTransitionalUrlStructure};
pub use path_suffix::PathSuffixUrlStructure;
pub use query_var::QueryVarUrlStructure;

/// Key used for an externally registered structure in example maps.
pub const CUSTOM_STRUCTURE_KEY: &str = "custom";

/// Reversible transform between a canonical URL and its paired URL.
pub trait PairedUrlStructure: fmt::Debug + Send + Sync {
    /// Mark `url` as paired. Idempotent.
    fn add_endpoint(&self, url: &str) -> String;

    /// Whether `url` carries the marker.
    fn has_endpoint(&self, url: &str) -> bool {
        self.remove_endpoint(url) != url
    }

    /// Strip the marker; inverse of `add_endpoint` for canonical URLs.
    fn remove_endpoint(&self, url: &str) -> String;

    /// Whether the marker occupies a path segment, so content slugs can collide with it.
    fn uses_path_suffix(&self) -> bool {
        false
    }
}

/// Built-in structure identifiers, as persisted in options.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StructureKey {
    #[default]
    QueryVar,
    PathSuffix,
    LegacyTransitional,
    LegacyReader,
}

impl StructureKey {
    /// All built-in keys, in display order.
    pub const ALL: [Self; 4] = [
        Self::QueryVar,
        Self::PathSuffix,
        Self::LegacyTransitional,
        Self::LegacyReader,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QueryVar => "query_var",
            Self::PathSuffix => "path_suffix",
            Self::LegacyTransitional => "legacy_transitional",
            Self::LegacyReader => "legacy_reader",
        }
    }

    /// Parse a persisted value, falling back to `QueryVar` when unrecognized.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or(Self::QueryVar)
    }

    /// Build the structure for this key.
    pub fn build(&self, paired_url: PairedUrl, using_permalinks: bool) -> Arc<dyn PairedUrlStructure> {
        match self {
            Self::QueryVar => Arc::new(QueryVarUrlStructure::new(paired_url)),
            Self::PathSuffix => Arc::new(PathSuffixUrlStructure::new(paired_url)),
            Self::LegacyTransitional => Arc::new(LegacyTransitionalUrlStructure::new(paired_url)),
            Self::LegacyReader => {
                Arc::new(LegacyReaderUrlStructure::new(paired_url, using_permalinks))
            }
        }
    }
}

impl fmt::Display for StructureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown paired URL structure `{s}`"))
    }
}
