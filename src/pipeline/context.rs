//! Per-request state.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::lifecycle::{Subscriber, Subscription};
use super::{Hook, HookPoint, Query};
use crate::core::EndpointState;

/// Server environment of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Raw request URI (path and query), `None` outside of a web request.
    pub request_uri: Option<String>,
    /// Host-style request path, set by the host while parsing.
    pub request_path: Option<String>,
    /// Whether the request targets the admin area.
    pub is_admin: bool,
    /// Decoded query parameters of the raw request.
    pub get_params: FxHashMap<String, String>,
}

impl Environment {
    pub fn for_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let get_params = crate::core::UrlParts::split(&uri)
            .query
            .map(|query| {
                crate::core::url::query_pairs(query)
                    .map(|(k, v, _)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            request_uri: Some(uri),
            get_params,
            ..Self::default()
        }
    }
}

/// How the host answers the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok,
    NotFound,
    Redirect { location: String, status: u16 },
}

impl Response {
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// `<link>` element added to the response head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadLink {
    pub rel: String,
    pub href: String,
}

/// State of one request as it moves through the stages.
#[derive(Default)]
pub struct RequestContext {
    pub env: Environment,

    /// Paired marker detection; `None` until detection runs.
    pub endpoint: Option<EndpointState>,
    /// Request URI before the marker was stripped.
    pub original_request_uri: Option<String>,

    /// Variables resolved by the host's parse.
    pub query_vars: FxHashMap<String, String>,
    /// Main query, once the host built it.
    pub query: Option<Query>,

    pub response: Option<Response>,
    pub head_links: Vec<HeadLink>,

    /// Subscriptions that only live for this request.
    scoped: Vec<Subscription>,
}

impl RequestContext {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    /// Subscribe for the rest of this request only.
    pub fn subscribe(
        &mut self,
        point: impl Into<HookPoint>,
        hook: Hook,
        priority: i32,
        subscriber: Arc<dyn Subscriber>,
    ) {
        self.scoped
            .push(Subscription::new(point.into(), hook, priority, subscriber));
    }

    /// Priority of a request-scoped subscription.
    pub fn priority_of(&self, point: impl Into<HookPoint>, hook: Hook) -> Option<i32> {
        let point = point.into();
        self.scoped
            .iter()
            .find(|s| s.point == point && s.hook == hook)
            .map(|s| s.priority)
    }

    pub(super) fn scoped(&self) -> &[Subscription] {
        &self.scoped
    }

    /// Answer with a redirect; later stages see the request as finished.
    pub fn redirect(&mut self, location: String, status: u16) {
        self.response = Some(Response::Redirect { location, status });
    }

    pub fn redirect_location(&self) -> Option<&str> {
        self.response.as_ref().and_then(Response::redirect_location)
    }

    /// Whether a redirect has been issued.
    pub fn is_finished(&self) -> bool {
        self.redirect_location().is_some()
    }

    pub fn add_head_link(&mut self, rel: impl Into<String>, href: impl Into<String>) {
        self.head_links.push(HeadLink {
            rel: rel.into(),
            href: href.into(),
        });
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("env", &self.env)
            .field("endpoint", &self.endpoint)
            .field("original_request_uri", &self.original_request_uri)
            .field("query_vars", &self.query_vars)
            .field("query", &self.query)
            .field("response", &self.response)
            .field("head_links", &self.head_links)
            .field("scoped", &self.scoped.len())
            .finish()
    }
}
