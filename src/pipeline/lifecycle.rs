//! Subscription registry and dispatch.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{Filter, Hook, HookPoint, RequestContext, SlugCandidate, Stage};

/// Receiver of lifecycle callbacks.
///
/// Each method has a pass-through default, so a subscriber implements only
/// the kinds of hook points it attaches to.
pub trait Subscriber: Send + Sync {
    fn on_stage(&self, _hook: Hook, _ctx: &mut RequestContext) {}

    /// Filter a redirect location. `None` means the redirect was vetoed.
    fn filter_url(&self, _hook: Hook, url: Option<String>, _ctx: &RequestContext) -> Option<String> {
        url
    }

    fn filter_slug(&self, _hook: Hook, slug: String, _candidate: &SlugCandidate) -> String {
        slug
    }
}

#[derive(Clone)]
pub(super) struct Subscription {
    pub point: HookPoint,
    pub hook: Hook,
    pub priority: i32,
    pub subscriber: Arc<dyn Subscriber>,
}

impl Subscription {
    pub fn new(point: HookPoint, hook: Hook, priority: i32, subscriber: Arc<dyn Subscriber>) -> Self {
        Self {
            point,
            hook,
            priority,
            subscriber,
        }
    }
}

/// Lifecycle-wide subscriptions, shared by every request.
#[derive(Default)]
pub struct Lifecycle {
    entries: RwLock<Vec<Subscription>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        point: impl Into<HookPoint>,
        hook: Hook,
        priority: i32,
        subscriber: Arc<dyn Subscriber>,
    ) {
        self.entries
            .write()
            .push(Subscription::new(point.into(), hook, priority, subscriber));
    }

    /// Priority a hook is subscribed at, if subscribed.
    pub fn priority_of(&self, point: impl Into<HookPoint>, hook: Hook) -> Option<i32> {
        let point = point.into();
        self.entries
            .read()
            .iter()
            .find(|s| s.point == point && s.hook == hook)
            .map(|s| s.priority)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Run every subscriber of `stage`. Dispatch stops once a redirect is issued.
    pub fn run_stage(&self, stage: Stage, ctx: &mut RequestContext) {
        for subscription in self.matching(stage.into(), Some(ctx)) {
            if ctx.is_finished() {
                break;
            }
            subscription.subscriber.on_stage(subscription.hook, ctx);
        }
    }

    /// Pass a redirect location through `filter`.
    pub fn apply_url_filter(
        &self,
        filter: Filter,
        url: Option<String>,
        ctx: &RequestContext,
    ) -> Option<String> {
        self.matching(filter.into(), Some(ctx))
            .into_iter()
            .fold(url, |url, s| s.subscriber.filter_url(s.hook, url, ctx))
    }

    /// Pass a proposed post slug through the `UniquePostSlug` filter.
    pub fn apply_slug_filter(&self, slug: String, candidate: &SlugCandidate) -> String {
        self.matching(Filter::UniquePostSlug.into(), None)
            .into_iter()
            .fold(slug, |slug, s| s.subscriber.filter_slug(s.hook, slug, candidate))
    }

    /// Snapshot of matching subscriptions in dispatch order.
    ///
    /// Taken up front so subscribers can subscribe further hooks while
    /// being dispatched.
    fn matching(&self, point: HookPoint, ctx: Option<&RequestContext>) -> Vec<Subscription> {
        let entries = self.entries.read();
        let scoped = ctx.map(RequestContext::scoped).unwrap_or_default();
        let mut matched: Vec<Subscription> = entries
            .iter()
            .chain(scoped)
            .filter(|s| s.point == point)
            .cloned()
            .collect();
        matched.sort_by_key(|s| s.priority);
        matched
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("entries", &self.len())
            .finish()
    }
}
