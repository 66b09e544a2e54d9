//! Options store with atomic replacement.
//!
//! Uses `arc-swap` for lock-free reads: a request takes one snapshot and
//! keeps it, so a concurrent update never tears its view.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::{Map, Value};

use super::ConfigError;
use crate::config::{Options, keys, sanitize_options};

/// Keys accepted by [`OptionsStore::update_option`].
const KNOWN_KEYS: &[&str] = &[
    keys::THEME_SUPPORT,
    keys::PAIRED_URL_STRUCTURE,
    keys::READER_THEME,
    keys::SUPPORTED_TEMPLATES,
    keys::ALL_TEMPLATES_SUPPORTED,
    keys::VERSION,
    keys::SLUG,
];

#[derive(Debug)]
pub struct OptionsStore {
    options: ArcSwap<Options>,
}

impl Default for OptionsStore {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl OptionsStore {
    pub fn new(options: Options) -> Self {
        Self {
            options: ArcSwap::from_pointee(options),
        }
    }

    #[inline]
    pub fn get(&self) -> Arc<Options> {
        self.options.load_full()
    }

    pub fn replace(&self, options: Options) -> Arc<Options> {
        let arc = Arc::new(options);
        self.options.store(Arc::clone(&arc));
        arc
    }

    /// Replace with a modified copy of the current options.
    pub fn update(&self, f: impl FnOnce(&mut Options)) -> Arc<Options> {
        let mut options = (*self.get()).clone();
        f(&mut options);
        self.replace(options)
    }

    /// Write one option through the sanitizer.
    ///
    /// Rejected structure values leave the stored value unchanged. The result
    /// is validated before it replaces the current options.
    pub fn update_option(&self, key: &str, value: Value) -> Result<Arc<Options>, ConfigError> {
        if !KNOWN_KEYS.contains(&key) {
            return Err(ConfigError::Validation(format!("unknown option `{key}`")));
        }

        let current = match serde_json::to_value(&*self.get())? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut new = Map::new();
        new.insert(key.to_string(), value);

        let merged = sanitize_options(current, &new);
        let options: Options = serde_json::from_value(Value::Object(merged))?;
        options.validate().map_err(ConfigError::Diagnostics)?;

        Ok(self.replace(options))
    }
}
