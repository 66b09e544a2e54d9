//! Corrective redirects and per-request hooks.
//!
//! After the host resolved the request, the marker state may contradict the
//! outcome. The redirect table, with `requested` the restored current URL:
//!
//! | Mode     | Condition                                  | Location                                  |
//! |----------|--------------------------------------------|-------------------------------------------|
//! | standard | not found, path suffix present             | suffix removed                            |
//! | standard | marker query var present                   | query var removed                         |
//! | paired   | not found, marker consumed, slug renamed   | new permalink with the marker             |
//! | paired   | not found, suffix left unconsumed          | suffix moved to the query var             |
//! | paired   | marker consumed, no paired template        | marker removed                            |

use std::sync::Arc;

use super::{DEFAULT_PRIORITY, PRESERVE_ENDPOINT_PRIORITY, PairedRouting};
use crate::core::EndpointState;
use crate::host::{REDIRECT_STATUS, current_url};
use crate::pipeline::{Filter, Hook, RequestContext, Stage, Subscriber};
use crate::structure::PairedUrlStructure;
use crate::debug;

/// `rel` of the discovery link pointing at the paired variant.
pub const PAIRED_LINK_REL: &str = "amphtml";

impl PairedRouting {
    /// `PreRespond`: redirect when the marker contradicts the resolved request.
    ///
    /// The host's redirect filters may veto the redirect.
    ///
    /// In standard mode nothing detected the marker earlier, so the request is
    /// marked not applicable here.
    pub fn redirect_extraneous_paired_endpoint(&self, ctx: &mut RequestContext) {
        if ctx.endpoint.is_none() && !self.options.get().theme_support.is_paired() {
            ctx.endpoint = Some(EndpointState::NotApplicable);
        }
        let Some(location) = self.extraneous_endpoint_location(ctx) else {
            return;
        };
        match self.host.filter_redirect_location(location, REDIRECT_STATUS) {
            Some(location) => {
                debug!("redirect"; "{} -> {}", ctx.env.request_uri.as_deref().unwrap_or("/"), location);
                ctx.redirect(location, REDIRECT_STATUS);
            }
            None => debug!("redirect"; "vetoed by redirect filter"),
        }
    }

    fn extraneous_endpoint_location(&self, ctx: &RequestContext) -> Option<String> {
        let query = ctx.query.as_ref()?;
        let requested = current_url(self.host.as_ref(), ctx.env.request_uri.as_deref()?)?;
        let options = self.options.get();
        let paired_url = self.paired_url_for(&options);
        let suffix_removed = paired_url.remove_path_suffix(&requested);

        if !options.theme_support.is_paired() {
            let query_var_removed = paired_url.remove_query_var(&requested);
            if query.is_404 && suffix_removed != requested {
                return Some(suffix_removed);
            }
            return (query_var_removed != requested).then_some(query_var_removed);
        }

        let structure = self.structure_for(&options);
        let consumed = ctx.endpoint.is_some_and(|state| state.is_consumed());

        if query.is_404
            && consumed
            && let Some(target) = self.host.old_slug_redirect(query)
        {
            return Some(structure.add_endpoint(&target));
        }
        if query.is_404 && !consumed && !structure.uses_path_suffix() && suffix_removed != requested {
            return Some(paired_url.add_query_var(&suffix_removed));
        }
        if consumed && !Self::is_available(&options, query) {
            return Some(structure.remove_endpoint(&requested));
        }
        None
    }

    /// Filter callback keeping the marker on host redirects.
    pub fn maybe_add_paired_endpoint(&self, url: &str) -> String {
        maybe_add_endpoint(self.paired_url_structure().as_ref(), url)
    }

    /// `PreRespond`: subscribe the hooks that depend on the detected marker.
    pub(super) fn add_paired_request_hooks(&self, ctx: &mut RequestContext) {
        let structure = self.paired_url_structure();

        if self.has_endpoint(ctx) == Some(true) {
            let preserver: Arc<dyn Subscriber> = Arc::new(EndpointPreserver { structure });
            for filter in [Filter::OldSlugRedirect, Filter::CanonicalRedirect] {
                ctx.subscribe(
                    filter,
                    Hook::PreserveEndpoint,
                    PRESERVE_ENDPOINT_PRIORITY,
                    preserver.clone(),
                );
            }
        } else {
            let href = self.paired_link(ctx, structure.as_ref());
            ctx.subscribe(
                Stage::PostRespond,
                Hook::AdvertisePairedLink,
                DEFAULT_PRIORITY,
                Arc::new(PairedLinkAdvertiser { href }),
            );
        }
    }

    /// Paired URL of the current request, when a paired variant exists.
    fn paired_link(&self, ctx: &RequestContext, structure: &dyn PairedUrlStructure) -> Option<String> {
        let query = ctx.query.as_ref().filter(|query| !query.is_404)?;
        if !Self::is_available(&self.options.get(), query) {
            return None;
        }
        let current = current_url(self.host.as_ref(), ctx.env.request_uri.as_deref()?)?;
        Some(structure.add_endpoint(&current))
    }
}

/// Add the marker unless the location is empty.
pub fn maybe_add_endpoint(structure: &dyn PairedUrlStructure, url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    structure.add_endpoint(url)
}

/// Re-adds the marker to host redirect locations.
struct EndpointPreserver {
    structure: Arc<dyn PairedUrlStructure>,
}

impl Subscriber for EndpointPreserver {
    fn filter_url(&self, _hook: Hook, url: Option<String>, _ctx: &RequestContext) -> Option<String> {
        url.map(|url| maybe_add_endpoint(self.structure.as_ref(), &url))
    }
}

/// Adds the discovery link to the response head.
struct PairedLinkAdvertiser {
    href: Option<String>,
}

impl Subscriber for PairedLinkAdvertiser {
    fn on_stage(&self, _hook: Hook, ctx: &mut RequestContext) {
        if let Some(href) = &self.href {
            ctx.add_head_link(PAIRED_LINK_REL, href.clone());
        }
    }
}
