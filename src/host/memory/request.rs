//! Request handling for the in-memory host.
//!
//! ```text
//! PreParse ─► parse URI ─► Parse ─► build query ─► PostParse ─► resolve
//!     ─► PreRespond ─► old slug / canonical redirect ─► PostRespond
//! ```

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use super::{MemoryHost, PostDate, SiteState};
use crate::core::UrlParts;
use crate::core::url::{query_pairs, request_path};
use crate::debug;
use crate::host::{Host, REDIRECT_STATUS, current_url};
use crate::pipeline::{Environment, Filter, Lifecycle, Query, RequestContext, Response, Stage};

/// Query string variables the host understands; anything else is ignored.
const PUBLIC_QUERY_VARS: &[&str] = &[
    "p", "page_id", "name", "pagename", "s", "year", "monthnum", "day", "page", "paged", "cpage",
    "preview",
];

static POST_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})/([0-9]{1,2})/([0-9]{1,2})/([^/]+)$").expect("valid rewrite rule")
});
static DAY_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})/([0-9]{1,2})/([0-9]{1,2})$").expect("valid rewrite rule")
});
static MONTH_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})/([0-9]{1,2})$").expect("valid rewrite rule"));
static YEAR_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})$").expect("valid rewrite rule"));

impl MemoryHost {
    /// Serve a front-end request for `uri`.
    pub fn handle_request(&self, lifecycle: &Lifecycle, uri: &str) -> RequestContext {
        self.handle(lifecycle, Environment::for_uri(uri))
    }

    /// Serve a request with a prepared environment.
    pub fn handle(&self, lifecycle: &Lifecycle, env: Environment) -> RequestContext {
        let mut ctx = RequestContext::new(env);

        lifecycle.run_stage(Stage::PreParse, &mut ctx);
        self.parse_request(&mut ctx);
        lifecycle.run_stage(Stage::Parse, &mut ctx);

        ctx.query = Some(self.build_query(ctx.query_vars.clone()));
        lifecycle.run_stage(Stage::PostParse, &mut ctx);

        if let Some(query) = ctx.query.as_mut() {
            self.resolve(query);
        }
        lifecycle.run_stage(Stage::PreRespond, &mut ctx);

        if ctx.response.is_none() {
            self.redirect_old_slug(lifecycle, &mut ctx);
        }
        if ctx.response.is_none() {
            self.redirect_canonical(lifecycle, &mut ctx);
        }
        if ctx.response.is_none() {
            let not_found = ctx.query.as_ref().is_some_and(|query| query.is_404);
            ctx.response = Some(if not_found {
                Response::NotFound
            } else {
                Response::Ok
            });
            lifecycle.run_stage(Stage::PostRespond, &mut ctx);
        }

        ctx
    }

    // ------------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------------

    /// Resolve request variables from the current request URI.
    fn parse_request(&self, ctx: &mut RequestContext) {
        let uri = ctx.env.request_uri.clone().unwrap_or_else(|| "/".to_string());
        let path = request_path(&uri);
        let path = path
            .strip_prefix(self.home_path())
            .unwrap_or(path)
            .trim_matches('/');

        let mut vars: FxHashMap<String, String> = FxHashMap::default();
        if let Some(query) = UrlParts::split(&uri).query {
            for (key, value, _) in query_pairs(query) {
                if PUBLIC_QUERY_VARS.contains(&key.as_ref()) {
                    vars.insert(key.into_owned(), value.into_owned());
                }
            }
        }
        if self.using_permalinks() && !path.is_empty() {
            vars.extend(match_rewrite_rules(path));
        }

        debug!("host"; "parsed `{}` into {:?}", path, vars);
        ctx.env.request_path = Some(request_path(&uri).to_string());
        ctx.query_vars = vars;
    }

    fn build_query(&self, vars: FxHashMap<String, String>) -> Query {
        let mut query = Query::main(vars);

        if query.get("name").is_some() || query.get("p").is_some() {
            query.is_single = true;
            query.is_singular = true;
        } else if query.get("pagename").is_some() || query.page_id().is_some() {
            query.is_page = true;
            query.is_singular = true;
        } else if query.get("year").is_some() {
            query.is_date = true;
            query.is_archive = true;
        } else if query.get("s").is_some() {
            query.is_search = true;
        } else if query.requested.is_empty() {
            match self.front_page_id() {
                Some(page_id) => {
                    query.is_page = true;
                    query.is_singular = true;
                    query.is_front_page = true;
                    query.set("page_id", page_id.to_string());
                }
                None => {
                    query.is_home = true;
                    query.is_front_page = true;
                }
            }
        } else {
            // Any variable turns the front of the site into the posts listing.
            query.is_home = true;
            query.is_front_page = self.front_page_id().is_none();
        }

        query
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    fn resolve(&self, query: &mut Query) {
        let state = self.state.read();
        // Outer `None` is not found; inner is the queried post.
        let resolved = if query.is_single {
            find_single(&state, query).map(Some)
        } else if query.is_page {
            find_page(&state, query).map(Some)
        } else if query.is_date {
            has_posts_on(&state, query).then_some(None)
        } else {
            Some(None)
        };

        match resolved {
            Some(post) => query.queried_post = post,
            None => query.set_404(),
        }
    }

    // ------------------------------------------------------------------------
    // Redirects
    // ------------------------------------------------------------------------

    fn redirect_old_slug(&self, lifecycle: &Lifecycle, ctx: &mut RequestContext) {
        let Some(query) = ctx.query.as_ref() else {
            return;
        };
        let target = self.old_slug_redirect(query);
        if target.is_none() {
            return;
        }
        let location = lifecycle.apply_url_filter(Filter::OldSlugRedirect, target, ctx);
        self.finish_redirect(ctx, location);
    }

    fn redirect_canonical(&self, lifecycle: &Lifecycle, ctx: &mut RequestContext) {
        if !self.using_permalinks() {
            return;
        }
        let Some(query) = ctx.query.as_ref().filter(|q| q.is_singular && !q.is_404) else {
            return;
        };
        let Some(permalink) = query.queried_post.and_then(|id| self.permalink(id)) else {
            return;
        };
        let Some(requested) = ctx
            .env
            .request_uri
            .as_deref()
            .and_then(|uri| current_url(self, uri))
        else {
            return;
        };

        let requested_parts = UrlParts::split(&requested);
        let permalink_parts = UrlParts::split(&permalink);
        if requested_parts.path_or_root() == permalink_parts.path_or_root() {
            return;
        }

        let target = permalink_parts.with_query(requested_parts.query);
        let location = lifecycle
            .apply_url_filter(Filter::CanonicalRedirect, Some(target), ctx)
            .filter(|location| *location != requested);
        self.finish_redirect(ctx, location);
    }

    fn finish_redirect(&self, ctx: &mut RequestContext, location: Option<String>) {
        let Some(location) = location.filter(|l| !l.is_empty()) else {
            return;
        };
        match self.filter_redirect_location(location, REDIRECT_STATUS) {
            Some(location) => ctx.redirect(location, REDIRECT_STATUS),
            None => debug!("host"; "redirect vetoed by filter"),
        }
    }
}

fn match_rewrite_rules(path: &str) -> Vec<(String, String)> {
    const DATE_KEYS: [&str; 4] = ["year", "monthnum", "day", "name"];

    for rule in [&*POST_RULE, &*DAY_RULE, &*MONTH_RULE, &*YEAR_RULE] {
        if let Some(caps) = rule.captures(path) {
            return caps
                .iter()
                .skip(1)
                .zip(DATE_KEYS)
                .filter_map(|(m, key)| m.map(|m| (key.to_string(), m.as_str().to_string())))
                .collect();
        }
    }
    vec![("pagename".to_string(), path.to_string())]
}

fn find_single(state: &SiteState, query: &Query) -> Option<u64> {
    if let Some(id) = query.get("p").and_then(|p| p.parse::<u64>().ok()) {
        return state
            .posts
            .get(&id)
            .filter(|post| post.post_type == "post")
            .map(|post| post.id);
    }
    let name = query.get("name")?;
    state
        .posts
        .values()
        .filter(|post| post.post_type == "post" && post.slug == name)
        .find(|post| date_matches(post.date, query))
        .map(|post| post.id)
}

fn find_page(state: &SiteState, query: &Query) -> Option<u64> {
    if let Some(id) = query.page_id() {
        return state
            .posts
            .get(&id)
            .filter(|post| post.post_type == "page")
            .map(|post| post.id);
    }
    let slug = query.get("pagename")?.rsplit('/').next()?;
    state
        .posts
        .values()
        .find(|post| post.post_type == "page" && post.slug == slug)
        .map(|post| post.id)
}

fn has_posts_on(state: &SiteState, query: &Query) -> bool {
    state
        .posts
        .values()
        .any(|post| post.post_type == "post" && date_matches(post.date, query))
}

fn date_matches(date: PostDate, query: &Query) -> bool {
    let matches = |key: &str, value: u16| {
        query
            .get(key)
            .and_then(|v| v.parse::<u16>().ok())
            .is_none_or(|v| v == value)
    };
    matches("year", date.year)
        && matches("monthnum", u16::from(date.month))
        && matches("day", u16::from(date.day))
}
