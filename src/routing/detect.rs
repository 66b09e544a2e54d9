//! Marker detection around the host's request parse.
//!
//! ```text
//! PreParse    /2024/01/02/hello/amp/  ──strip──►  /2024/01/02/hello/
//! Parse       query vars += { amp: "1" }
//! PostParse   /2024/01/02/hello/      ──restore─► /2024/01/02/hello/amp/
//! ```

use super::PairedRouting;
use crate::core::EndpointState;
use crate::core::url::request_path;
use crate::debug;
use crate::paired_url::QUERY_VAR_VALUE;
use crate::pipeline::RequestContext;

impl PairedRouting {
    /// Classify the raw request URI and strip the marker when present.
    pub fn detect_endpoint_in_environment(&self, ctx: &mut RequestContext) {
        let options = self.options.get();
        if !options.theme_support.is_paired() {
            ctx.endpoint = Some(EndpointState::NotApplicable);
            return;
        }

        let Some(uri) = ctx.env.request_uri.clone() else {
            ctx.endpoint = Some(EndpointState::Absent);
            return;
        };

        let structure = self.structure_for(&options);
        let stripped = structure.remove_endpoint(&uri);
        if structure.has_endpoint(&uri) && stripped != uri {
            debug!("detect"; "endpoint consumed: `{}` -> `{}`", uri, stripped);
            ctx.env.request_uri = Some(stripped);
            ctx.original_request_uri = Some(uri);
            ctx.endpoint = Some(EndpointState::Consumed);
        } else {
            ctx.endpoint = Some(EndpointState::Absent);
        }
    }

    /// `PreParse`: detection runs once per request.
    pub(super) fn extract_endpoint_from_environment(&self, ctx: &mut RequestContext) {
        if ctx.endpoint.is_none() {
            self.detect_endpoint_in_environment(ctx);
        }
    }

    /// `Parse`: the stripped marker reappears as a query variable.
    pub(super) fn inject_endpoint_query_var(&self, ctx: &mut RequestContext) {
        if ctx.endpoint.is_some_and(|state| state.is_consumed()) {
            let slug = self.options.get().slug.clone();
            ctx.query_vars.insert(slug, QUERY_VAR_VALUE.to_string());
        }
    }

    /// `PostParse`: put the request URI and path back as requested.
    pub(super) fn restore_environment(&self, ctx: &mut RequestContext) {
        let Some(original) = ctx.original_request_uri.clone() else {
            return;
        };
        ctx.env.request_path = Some(request_path(&original).to_string());
        ctx.env.request_uri = Some(original);
    }
}
