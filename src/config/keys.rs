//! Persisted option keys.

pub const THEME_SUPPORT: &str = "theme_support";
pub const PAIRED_URL_STRUCTURE: &str = "paired_url_structure";
pub const READER_THEME: &str = "reader_theme";
pub const SUPPORTED_TEMPLATES: &str = "supported_templates";
pub const ALL_TEMPLATES_SUPPORTED: &str = "all_templates_supported";
pub const VERSION: &str = "version";
pub const SLUG: &str = "slug";
