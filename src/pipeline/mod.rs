//! Staged request lifecycle.
//!
//! The host owns request parsing and resolution; subscribers hook into the
//! stages and filter points it exposes.
//!
//! # Stages
//!
//! ```text
//! PreParse ──► Parse ──► PostParse ──► PreRespond ──► PostRespond
//!    │           │           │              │              │
//!  raw URI    resolved    flags set,    resolved      head links
//!  available  variables   environment   request,
//!                         restorable    redirects
//! ```
//!
//! Filter points (`CanonicalRedirect`, `OldSlugRedirect`, `UniquePostSlug`)
//! are applied by the host at the matching decision.
//!
//! # Ordering
//!
//! Lower priority runs first. Equal priorities run in subscription order,
//! lifecycle-wide subscriptions before request-scoped ones.

mod context;
mod lifecycle;
mod query;

pub use context::{Environment, HeadLink, RequestContext, Response};
pub use lifecycle::{Lifecycle, Subscriber};
pub use query::Query;

/// Ordered request stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before the host parses the request URI.
    PreParse,
    /// After the host resolved request variables.
    Parse,
    /// After the main query flags are set.
    PostParse,
    /// After the request is resolved, before anything is sent.
    PreRespond,
    /// While the response head is assembled.
    PostRespond,
}

/// Value filters applied at host decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Canonical redirect location.
    CanonicalRedirect,
    /// Redirect location for a renamed slug.
    OldSlugRedirect,
    /// Slug proposed for a post being saved.
    UniquePostSlug,
}

/// Where a subscription is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    Stage(Stage),
    Filter(Filter),
}

impl From<Stage> for HookPoint {
    fn from(stage: Stage) -> Self {
        Self::Stage(stage)
    }
}

impl From<Filter> for HookPoint {
    fn from(filter: Filter) -> Self {
        Self::Filter(filter)
    }
}

/// Named callbacks, passed back to the subscriber on dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    ExtractEndpoint,
    InjectEndpointQueryVar,
    RestoreEnvironment,
    CorrectFrontPage,
    AddPairedRequestHooks,
    RedirectExtraneousEndpoint,
    PreserveEndpoint,
    AdvertisePairedLink,
    GuardPostSlug,
}

/// Post a slug is being proposed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCandidate {
    /// `None` for a post that has not been stored yet.
    pub post_id: Option<u64>,
    pub post_type: String,
}
