//! Write-time validation of option updates.

use serde_json::{Map, Value};

use super::keys;
use crate::structure::StructureKey;

/// Accept a structure value only when it names a built-in structure.
///
/// `custom` is never stored: a registered custom structure takes effect
/// without a stored choice.
pub fn sanitize_paired_url_structure(value: &Value) -> Option<StructureKey> {
    value.as_str()?.parse().ok()
}

/// Merge `new` into `options`.
///
/// A rejected structure value is dropped so the prior value stays. Other
/// keys are merged as given.
pub fn sanitize_options(mut options: Map<String, Value>, new: &Map<String, Value>) -> Map<String, Value> {
    for (key, value) in new {
        if key == keys::PAIRED_URL_STRUCTURE {
            match sanitize_paired_url_structure(value) {
                Some(structure) => {
                    options.insert(key.clone(), Value::String(structure.as_str().to_string()));
                }
                None => {
                    crate::debug!("config"; "rejected structure value {}", value);
                }
            }
        } else {
            options.insert(key.clone(), value.clone());
        }
    }
    options
}
