//! Site-wide feature mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How canonical and paired variants coexist on the site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    /// Canonical pages only; no paired URLs exist.
    Standard,
    /// Canonical page is primary, paired variant is an alternate representation.
    Transitional,
    /// Paired variant is rendered by a dedicated reader theme.
    #[default]
    Reader,
}

impl FeatureMode {
    /// Persisted option value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Transitional => "transitional",
            Self::Reader => "reader",
        }
    }

    /// Whether paired URLs exist in this mode.
    #[inline]
    pub const fn is_paired(&self) -> bool {
        !matches!(self, Self::Standard)
    }
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "transitional" => Ok(Self::Transitional),
            "reader" => Ok(Self::Reader),
            other => Err(format!("unknown feature mode `{other}`")),
        }
    }
}
