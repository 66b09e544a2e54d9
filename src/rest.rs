//! Options REST surface.
//!
//! Routing extends the host's options endpoint with a read model and the
//! matching schema. Only `paired_url_structure` is writable; writes go
//! through [`sanitize_options`](crate::config::sanitize_options).

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::keys;
use crate::conflict::ConflictReport;
use crate::routing::PairedRouting;
use crate::structure::{StructureKey, StructureSource};

pub const PAIRED_URL_EXAMPLES: &str = "paired_url_examples";
pub const CUSTOM_PAIRED_ENDPOINT_SOURCES: &str = "custom_paired_endpoint_sources";
pub const ENDPOINT_PATH_SLUG_CONFLICTS: &str = "endpoint_path_slug_conflicts";
pub const AMP_SLUG: &str = "amp_slug";
pub const REWRITE_USING_PERMALINKS: &str = "rewrite_using_permalinks";

/// Routing fields of the options read model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedOptionsView {
    pub paired_url_structure: StructureKey,
    /// Structure key -> `[canonical, paired]`
    pub paired_url_examples: Map<String, Value>,
    pub custom_paired_endpoint_sources: Vec<StructureSource>,
    pub endpoint_path_slug_conflicts: Option<ConflictReport>,
    pub amp_slug: String,
    pub rewrite_using_permalinks: bool,
}

impl PairedOptionsView {
    pub fn new(routing: &PairedRouting) -> Self {
        let options = routing.options();
        let paired_url_examples = routing
            .paired_url_examples()
            .into_iter()
            .map(|(key, pair)| (key.to_string(), json!(pair)))
            .collect();

        Self {
            paired_url_structure: options.paired_url_structure_key(),
            paired_url_examples,
            custom_paired_endpoint_sources: routing.custom_paired_structure_sources(),
            endpoint_path_slug_conflicts: routing.endpoint_path_slug_conflicts(),
            amp_slug: options.slug.clone(),
            rewrite_using_permalinks: routing.is_using_permalinks(),
        }
    }
}

/// Merge the routing read model into the host's options map.
pub fn filter_rest_options(routing: &PairedRouting, mut options: Map<String, Value>) -> Map<String, Value> {
    if let Ok(Value::Object(view)) = serde_json::to_value(PairedOptionsView::new(routing)) {
        options.extend(view);
    }
    options
}

/// Add the routing fields to the options schema.
pub fn filter_rest_options_schema(mut schema: Map<String, Value>) -> Map<String, Value> {
    let structures: Vec<&str> = StructureKey::ALL.iter().map(StructureKey::as_str).collect();

    schema.insert(
        keys::PAIRED_URL_STRUCTURE.to_string(),
        json!({ "type": "string", "enum": structures }),
    );
    schema.insert(
        PAIRED_URL_EXAMPLES.to_string(),
        json!({ "type": "object", "readonly": true }),
    );
    schema.insert(
        CUSTOM_PAIRED_ENDPOINT_SOURCES.to_string(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "type": { "type": "string", "enum": ["plugin", "theme"] },
                    "slug": { "type": "string" },
                    "name": { "type": "string" },
                },
            },
            "readonly": true,
        }),
    );
    schema.insert(
        ENDPOINT_PATH_SLUG_CONFLICTS.to_string(),
        json!({ "type": ["object", "null"], "readonly": true }),
    );
    schema.insert(AMP_SLUG.to_string(), json!({ "type": "string", "readonly": true }));
    schema.insert(
        REWRITE_USING_PERMALINKS.to_string(),
        json!({ "type": "boolean", "readonly": true }),
    );
    schema
}
