//! Paired routing options.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── keys        # Persisted option keys
//! ├── defaults    # Default structure policy (fresh vs upgraded installs)
//! ├── sanitize    # Write-time validation of option updates
//! ├── types/      # Utility types
//! │   ├── error   # ConfigError, ConfigDiagnostics
//! │   ├── field   # FieldPath
//! │   └── handle  # OptionsStore (arc-swap)
//! └── mod.rs      # Options (this file)
//! ```
//!
//! # Options
//!
//! | Key                       | Purpose                                         |
//! |---------------------------|-------------------------------------------------|
//! | `theme_support`           | Feature mode (standard, transitional, reader)   |
//! | `paired_url_structure`    | Structure key; unset means default policy       |
//! | `reader_theme`            | Theme rendering paired pages in reader mode     |
//! | `supported_templates`     | Template conditions with paired variants        |
//! | `all_templates_supported` | Paired variants for every template              |
//! | `version`                 | Version that last wrote the options             |
//! | `slug`                    | Marker slug (query var name and path segment)   |

mod defaults;
pub mod keys;
mod sanitize;
pub mod types;

pub use defaults::{
    CURRENT_VERSION, DEFAULT_READER_THEME, STRUCTURE_CHOICE_VERSION, default_paired_url_structure,
    version_lt,
};
pub use sanitize::{sanitize_options, sanitize_paired_url_structure};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, OptionsStore};

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::FeatureMode;
use crate::log;
use crate::structure::StructureKey;

/// Default marker slug.
pub const DEFAULT_SLUG: &str = "amp";

/// Marker slugs must be usable verbatim as a path segment and a query var name.
static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("valid slug pattern"));

// ============================================================================
// Options
// ============================================================================

/// Persisted options read by the routing coordinator.
///
/// Absent keys take their defaults, so a partially written store is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub theme_support: FeatureMode,

    /// Raw persisted structure key; `None` until a choice is stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paired_url_structure: Option<String>,

    pub reader_theme: String,

    pub supported_templates: Vec<String>,

    pub all_templates_supported: bool,

    /// Empty for installs that never recorded a version.
    pub version: String,

    pub slug: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            theme_support: FeatureMode::default(),
            paired_url_structure: None,
            reader_theme: DEFAULT_READER_THEME.to_string(),
            supported_templates: vec!["is_singular".to_string()],
            all_templates_supported: true,
            version: CURRENT_VERSION.to_string(),
            slug: DEFAULT_SLUG.to_string(),
        }
    }
}

impl Options {
    /// Parse options from TOML.
    pub fn from_str(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(options)
    }

    /// Load options from a TOML file, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (options, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        options.validate().map_err(ConfigError::Diagnostics)?;

        Ok(options)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let options = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((options, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate field values, collecting every problem at once.
    ///
    /// An unknown structure key is only a warning: it resolves to the
    /// query var structure at request time.
    pub fn validate(&self) -> std::result::Result<(), ConfigDiagnostics> {
        let mut diag = ConfigDiagnostics::new();

        if !SLUG_PATTERN.is_match(&self.slug) {
            diag.error_with_hint(
                FieldPath::new(keys::SLUG),
                format!("invalid marker slug `{}`", self.slug),
                "use lowercase letters, digits, `-` or `_`",
            );
        }

        if self.reader_theme.trim().is_empty() {
            diag.error(FieldPath::new(keys::READER_THEME), "reader theme must not be empty");
        }

        if let Some(structure) = &self.paired_url_structure
            && structure.parse::<StructureKey>().is_err()
        {
            diag.warn(
                FieldPath::new(keys::PAIRED_URL_STRUCTURE),
                format!("unknown structure `{structure}`, using `query_var`"),
            );
        }

        diag.print_warnings();
        diag.into_result()
    }

    /// Structure in effect: the stored key, or the default policy when unset.
    pub fn paired_url_structure_key(&self) -> StructureKey {
        match &self.paired_url_structure {
            Some(value) => StructureKey::parse_or_default(value),
            None => default_paired_url_structure(self),
        }
    }

    /// Whether the resolved templates have a paired variant.
    pub fn supports_any_template<'a>(&self, templates: impl IntoIterator<Item = &'a str>) -> bool {
        self.all_templates_supported
            || templates
                .into_iter()
                .any(|t| self.supported_templates.iter().any(|s| s == t))
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse options from TOML, panicking on unknown fields.
#[cfg(test)]
pub fn test_parse_options(content: &str) -> Options {
    let (parsed, ignored) = Options::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test options have unknown fields: {:?}",
        ignored
    );
    parsed
}
