//! Paired URL routing coordinator.
//!
//! Owns nothing request-specific: per-request state lives on the
//! [`RequestContext`], options come from an [`OptionsStore`] snapshot, and
//! everything about content comes from the [`Host`].
//!
//! # Request States
//!
//! ```text
//! Uninitialized ─► Detecting ─┬─► Consumed ──────┐
//!                             ├─► Absent ────────┼─► Resolved
//!                             └─► NotApplicable ─┘
//! ```
//!
//! # Subscriptions
//!
//! | Point                      | Hook                         | Priority | When              |
//! |----------------------------|------------------------------|----------|-------------------|
//! | `PreParse`                 | `ExtractEndpoint`            | 10       | paired modes      |
//! | `Parse`                    | `InjectEndpointQueryVar`     | 10       | paired modes      |
//! | `PostParse`                | `RestoreEnvironment`         | 10       | paired modes      |
//! | `UniquePostSlug`           | `GuardPostSlug`              | 10       | paired modes      |
//! | `PostParse`                | `CorrectFrontPage`           | 10       | paired modes      |
//! | `PreRespond`               | `AddPairedRequestHooks`      | 10       | paired modes      |
//! | `PreRespond`               | `RedirectExtraneousEndpoint` | 9        | always            |
//! | `CanonicalRedirect`        | `PreserveEndpoint`           | 1000     | marker consumed   |
//! | `OldSlugRedirect`          | `PreserveEndpoint`           | 1000     | marker consumed   |
//! | `PostRespond`              | `AdvertisePairedLink`        | 10       | marker absent     |

mod detect;
mod front_page;
mod redirect;
mod slug;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::config::{Options, OptionsStore, default_paired_url_structure, keys};
use crate::conflict::{ConflictReport, detect_conflicts, print_conflicts};
use crate::host::Host;
use crate::paired_url::PairedUrl;
use crate::pipeline::{
    Filter, Hook, Lifecycle, Query, RequestContext, SlugCandidate, Stage, Subscriber,
};
use crate::structure::{
    CUSTOM_STRUCTURE_KEY, CustomStructure, PairedUrlStructure, StructureKey, StructureSource,
};
use crate::{debug, log};

pub use redirect::{PAIRED_LINK_REL, maybe_add_endpoint};

/// Default priority of routing subscriptions.
pub const DEFAULT_PRIORITY: i32 = 10;
/// Runs before the host's own redirects on the same stage.
pub const REDIRECT_PRIORITY: i32 = 9;
/// Runs after other redirect filters so the marker survives them.
pub const PRESERVE_ENDPOINT_PRIORITY: i32 = 1000;

/// Paired URL routing for one site.
pub struct PairedRouting {
    host: Arc<dyn Host>,
    options: Arc<OptionsStore>,
    custom: RwLock<Option<CustomStructure>>,
}

impl PairedRouting {
    pub fn new(host: Arc<dyn Host>, options: Arc<OptionsStore>) -> Self {
        Self {
            host,
            options,
            custom: RwLock::new(None),
        }
    }

    pub fn options(&self) -> Arc<Options> {
        self.options.get()
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Subscribe the always-on redirect, then the paired request hooks.
    pub fn register(self: &Arc<Self>, lifecycle: &Lifecycle) {
        if lifecycle
            .priority_of(Stage::PreRespond, Hook::RedirectExtraneousEndpoint)
            .is_none()
        {
            lifecycle.subscribe(
                Stage::PreRespond,
                Hook::RedirectExtraneousEndpoint,
                REDIRECT_PRIORITY,
                self.clone(),
            );
        }
        self.initialize_paired_request(lifecycle);
    }

    /// Subscribe marker extraction and the dependent hooks.
    ///
    /// Does nothing in standard mode, or when already subscribed.
    pub fn initialize_paired_request(self: &Arc<Self>, lifecycle: &Lifecycle) {
        if !self.options.get().theme_support.is_paired() {
            debug!("routing"; "standard mode, paired request hooks skipped");
            return;
        }
        if lifecycle
            .priority_of(Stage::PreParse, Hook::ExtractEndpoint)
            .is_some()
        {
            return;
        }

        let this: Arc<dyn Subscriber> = self.clone();
        lifecycle.subscribe(Stage::PreParse, Hook::ExtractEndpoint, DEFAULT_PRIORITY, this.clone());
        lifecycle.subscribe(Stage::Parse, Hook::InjectEndpointQueryVar, DEFAULT_PRIORITY, this.clone());
        lifecycle.subscribe(Stage::PostParse, Hook::RestoreEnvironment, DEFAULT_PRIORITY, this.clone());
        // The structure can change later, so the guard checks it per call.
        lifecycle.subscribe(Filter::UniquePostSlug, Hook::GuardPostSlug, DEFAULT_PRIORITY, this.clone());
        lifecycle.subscribe(Stage::PostParse, Hook::CorrectFrontPage, DEFAULT_PRIORITY, this.clone());
        lifecycle.subscribe(Stage::PreRespond, Hook::AddPairedRequestHooks, DEFAULT_PRIORITY, this);

        self.warn_endpoint_path_slug_conflicts();
    }

    /// Print resources named like the marker when the marker is a path segment.
    ///
    /// Returns the printed report.
    pub fn warn_endpoint_path_slug_conflicts(&self) -> Option<ConflictReport> {
        if !self.paired_url_structure().uses_path_suffix() {
            return None;
        }
        let report = self.endpoint_path_slug_conflicts()?;
        print_conflicts(&self.options.get().slug, &report);
        Some(report)
    }

    // ------------------------------------------------------------------------
    // Structures
    // ------------------------------------------------------------------------

    /// Marker primitives for the current slug and trailing-slash convention.
    pub fn paired_url(&self) -> PairedUrl {
        self.paired_url_for(&self.options.get())
    }

    fn paired_url_for(&self, options: &Options) -> PairedUrl {
        PairedUrl::new(options.slug.clone(), self.host.trailing_slash())
    }

    /// Active structure: a valid custom one, else the configured built-in.
    pub fn paired_url_structure(&self) -> Arc<dyn PairedUrlStructure> {
        self.structure_for(&self.options.get())
    }

    fn structure_for(&self, options: &Options) -> Arc<dyn PairedUrlStructure> {
        let paired_url = self.paired_url_for(options);
        let using_permalinks = self.host.using_permalinks();

        // Cloned out so the provider runs without the slot locked.
        let custom = self.custom.read().clone();
        if let Some(custom) = custom {
            return match custom.resolve(&paired_url, &self.host.home_url()) {
                Ok(structure) => structure,
                Err(err) => {
                    debug!("routing"; "{}, using `{}`", err, StructureKey::QueryVar);
                    StructureKey::QueryVar.build(paired_url, using_permalinks)
                }
            };
        }

        options
            .paired_url_structure_key()
            .build(paired_url, using_permalinks)
    }

    /// Register a structure provided by a plugin or theme, replacing any previous one.
    ///
    /// A structure that fails to resolve is still registered and warned about
    /// once here; requests then fall back to `query_var`.
    pub fn register_custom_structure(&self, custom: CustomStructure) {
        debug!("routing"; "custom structure registered: {:?}", custom);
        if let Err(err) = custom.resolve(&self.paired_url(), &self.host.home_url()) {
            log!("warning"; "{}, falling back to `{}`", err, StructureKey::QueryVar);
        }
        *self.custom.write() = Some(custom);
    }

    pub fn clear_custom_structure(&self) {
        *self.custom.write() = None;
    }

    pub fn has_custom_paired_url_structure(&self) -> bool {
        self.custom.read().is_some()
    }

    /// Declared sources of the custom structure, empty without one.
    pub fn custom_paired_structure_sources(&self) -> Vec<StructureSource> {
        self.custom
            .read()
            .as_ref()
            .map(|custom| custom.sources().to_vec())
            .unwrap_or_default()
    }

    /// `url` with the marker added by every built-in structure, plus the
    /// custom one when it resolves.
    pub fn all_structure_paired_urls(&self, url: &str) -> Vec<(&'static str, String)> {
        let paired_url = self.paired_url();
        let using_permalinks = self.host.using_permalinks();

        let mut urls: Vec<(&'static str, String)> = StructureKey::ALL
            .into_iter()
            .map(|key| {
                let structure = key.build(paired_url.clone(), using_permalinks);
                (key.as_str(), structure.add_endpoint(url))
            })
            .collect();

        let custom = self.custom.read().clone();
        if let Some(custom) = custom
            && let Ok(structure) = custom.resolve(&paired_url, &self.host.home_url())
        {
            urls.push((CUSTOM_STRUCTURE_KEY, structure.add_endpoint(url)));
        }
        urls
    }

    /// Per structure, `[canonical, paired]` for the latest post (or the home page).
    pub fn paired_url_examples(&self) -> Vec<(&'static str, [String; 2])> {
        let canonical = self
            .host
            .latest_post_permalink()
            .unwrap_or_else(|| self.host.home_url());
        self.all_structure_paired_urls(&canonical)
            .into_iter()
            .map(|(key, paired)| (key, [canonical.clone(), paired]))
            .collect()
    }

    pub fn add_endpoint(&self, url: &str) -> String {
        self.paired_url_structure().add_endpoint(url)
    }

    pub fn remove_endpoint(&self, url: &str) -> String {
        self.paired_url_structure().remove_endpoint(url)
    }

    /// Whether `url` carries the marker of the active structure.
    pub fn has_endpoint_in(&self, url: &str) -> bool {
        self.paired_url_structure().has_endpoint(url)
    }

    /// Whether the current request is for the paired variant.
    ///
    /// `None` when paired URLs do not apply (standard mode). Before detection
    /// runs, falls back to the marker query variable, and in the admin area
    /// to the raw request parameter.
    pub fn has_endpoint(&self, ctx: &RequestContext) -> Option<bool> {
        if let Some(state) = ctx.endpoint {
            return state.as_option();
        }

        let options = self.options.get();
        if !options.theme_support.is_paired() {
            return None;
        }
        let slug = &options.slug;
        let truthy = |value: Option<&String>| value.is_some_and(|v| !v.is_empty());
        let query_var = ctx
            .query
            .as_ref()
            .and_then(|query| query.vars.get(slug))
            .or_else(|| ctx.query_vars.get(slug));
        if truthy(query_var) {
            return Some(true);
        }
        Some(ctx.env.is_admin && truthy(ctx.env.get_params.get(slug)))
    }

    pub fn is_using_permalinks(&self) -> bool {
        self.host.using_permalinks()
    }

    // ------------------------------------------------------------------------
    // Options extension points
    // ------------------------------------------------------------------------

    /// Add the default structure for `options` to `defaults`.
    pub fn filter_default_options(
        &self,
        mut defaults: Map<String, Value>,
        options: &Options,
    ) -> Map<String, Value> {
        let structure = default_paired_url_structure(options);
        defaults.insert(
            keys::PAIRED_URL_STRUCTURE.to_string(),
            Value::String(structure.as_str().to_string()),
        );
        defaults
    }

    pub fn sanitize_options(
        &self,
        options: Map<String, Value>,
        new: &Map<String, Value>,
    ) -> Map<String, Value> {
        crate::config::sanitize_options(options, new)
    }

    /// Host resources named like the marker, `None` when nothing collides.
    pub fn endpoint_path_slug_conflicts(&self) -> Option<ConflictReport> {
        detect_conflicts(self.host.as_ref(), &self.options.get().slug).into_option()
    }

    /// Notice for the host's permalink settings screen.
    pub fn permalink_settings_notice(&self, screen: &str) -> Option<String> {
        let options = self.options.get();
        if screen != "options-permalink" || !options.theme_support.is_paired() {
            return None;
        }
        let example = self.add_endpoint(&self.host.home_url());
        Some(format!(
            "Paired pages are served at URLs like {example}. The paired URL structure is \
             configured in the paired settings, not here."
        ))
    }

    /// Whether the resolved query has a paired variant.
    fn is_available(options: &Options, query: &Query) -> bool {
        options.supports_any_template(query.templates())
    }
}

impl std::fmt::Debug for PairedRouting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairedRouting")
            .field("options", &self.options.get())
            .field("custom", &*self.custom.read())
            .finish_non_exhaustive()
    }
}

impl Subscriber for PairedRouting {
    fn on_stage(&self, hook: Hook, ctx: &mut RequestContext) {
        match hook {
            Hook::ExtractEndpoint => self.extract_endpoint_from_environment(ctx),
            Hook::InjectEndpointQueryVar => self.inject_endpoint_query_var(ctx),
            Hook::RestoreEnvironment => self.restore_environment(ctx),
            Hook::CorrectFrontPage => {
                if let Some(query) = ctx.query.as_mut() {
                    self.correct_query_when_is_front_page(query);
                }
            }
            Hook::AddPairedRequestHooks => self.add_paired_request_hooks(ctx),
            Hook::RedirectExtraneousEndpoint => self.redirect_extraneous_paired_endpoint(ctx),
            _ => {}
        }
    }

    fn filter_slug(&self, hook: Hook, slug: String, candidate: &SlugCandidate) -> String {
        match hook {
            Hook::GuardPostSlug => {
                self.filter_unique_post_slug(slug, candidate.post_id, &candidate.post_type)
            }
            _ => slug,
        }
    }
}
