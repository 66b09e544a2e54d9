//! End-to-end routing tests against the in-memory host.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::json;

use super::*;
use crate::core::{EndpointState, FeatureMode};
use crate::host::{MemoryHost, PostDate, REDIRECT_STATUS};
use crate::pipeline::{Environment, HeadLink, Response};
use crate::structure::{PathSuffixUrlStructure, validate_structure};

const HELLO: &str = "https://example.org/2024/01/02/hello/";

struct Site {
    host: Arc<MemoryHost>,
    store: Arc<OptionsStore>,
    lifecycle: Lifecycle,
    routing: Arc<PairedRouting>,
}

impl Site {
    fn request(&self, uri: &str) -> RequestContext {
        self.host.handle_request(&self.lifecycle, uri)
    }
}

fn site_with(host: MemoryHost, mode: FeatureMode, structure: StructureKey) -> Site {
    let host = Arc::new(host);
    let store = Arc::new(OptionsStore::new(Options {
        theme_support: mode,
        paired_url_structure: Some(structure.as_str().to_string()),
        ..Options::default()
    }));
    let routing = Arc::new(PairedRouting::new(host.clone(), store.clone()));
    let lifecycle = Lifecycle::new();
    routing.register(&lifecycle);
    Site {
        host,
        store,
        lifecycle,
        routing,
    }
}

fn site(mode: FeatureMode, structure: StructureKey) -> Site {
    let site = site_with(MemoryHost::default(), mode, structure);
    site.host.add_post("hello", PostDate::default());
    site
}

fn redirect(location: &str) -> Option<Response> {
    Some(Response::Redirect {
        location: location.to_string(),
        status: REDIRECT_STATUS,
    })
}

/// Records the request URI the host parses.
#[derive(Default)]
struct ParseProbe {
    seen: Mutex<Vec<Option<String>>>,
}

impl Subscriber for ParseProbe {
    fn on_stage(&self, _hook: Hook, ctx: &mut RequestContext) {
        self.seen.lock().push(ctx.env.request_uri.clone());
    }
}

/// Never marks anything, so it fails the structure contract.
#[derive(Debug)]
struct InertStructure;

impl PairedUrlStructure for InertStructure {
    fn add_endpoint(&self, url: &str) -> String {
        url.to_string()
    }

    fn remove_endpoint(&self, url: &str) -> String {
        url.to_string()
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_priorities() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let lc = &site.lifecycle;

    assert_eq!(
        lc.priority_of(Stage::PreRespond, Hook::RedirectExtraneousEndpoint),
        Some(REDIRECT_PRIORITY)
    );
    assert_eq!(lc.priority_of(Stage::PreParse, Hook::ExtractEndpoint), Some(DEFAULT_PRIORITY));
    assert_eq!(lc.priority_of(Stage::Parse, Hook::InjectEndpointQueryVar), Some(DEFAULT_PRIORITY));
    assert_eq!(lc.priority_of(Stage::PostParse, Hook::RestoreEnvironment), Some(DEFAULT_PRIORITY));
    assert_eq!(lc.priority_of(Stage::PostParse, Hook::CorrectFrontPage), Some(DEFAULT_PRIORITY));
    assert_eq!(
        lc.priority_of(Stage::PreRespond, Hook::AddPairedRequestHooks),
        Some(DEFAULT_PRIORITY)
    );
    assert_eq!(
        lc.priority_of(Filter::UniquePostSlug, Hook::GuardPostSlug),
        Some(DEFAULT_PRIORITY)
    );
    assert_eq!(lc.len(), 7);
}

#[test]
fn test_register_is_idempotent() {
    let site = site(FeatureMode::Reader, StructureKey::PathSuffix);
    assert_eq!(site.lifecycle.len(), 7);

    site.routing.register(&site.lifecycle);
    site.routing.initialize_paired_request(&site.lifecycle);
    assert_eq!(site.lifecycle.len(), 7);
}

#[test]
fn test_register_standard_mode_only_redirects() {
    let site = site(FeatureMode::Standard, StructureKey::QueryVar);
    assert_eq!(site.lifecycle.len(), 1);
    assert_eq!(
        site.lifecycle.priority_of(Stage::PreParse, Hook::ExtractEndpoint),
        None
    );
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn test_endpoint_stripped_during_parse() {
    let cases = [
        (StructureKey::QueryVar, "/2024/01/02/hello/?amp=1"),
        (StructureKey::PathSuffix, "/2024/01/02/hello/amp/"),
        (StructureKey::LegacyTransitional, "/2024/01/02/hello/?amp=1"),
        (StructureKey::LegacyReader, "/2024/01/02/hello/amp/"),
    ];

    for mode in [FeatureMode::Transitional, FeatureMode::Reader] {
        for (structure, uri) in cases {
            let site = site(mode, structure);
            let probe = Arc::new(ParseProbe::default());
            site.lifecycle
                .subscribe(Stage::Parse, Hook::InjectEndpointQueryVar, 0, probe.clone());

            let ctx = site.request(uri);
            let expected = site.routing.remove_endpoint(uri);
            assert_eq!(*probe.seen.lock(), vec![Some(expected)], "{mode} {structure}");

            assert_eq!(ctx.endpoint, Some(EndpointState::Consumed), "{mode} {structure}");
            assert_eq!(ctx.env.request_uri.as_deref(), Some(uri));
            assert_eq!(
                ctx.env.request_path.as_deref(),
                Some(uri.split('?').next().unwrap_or(uri).trim_matches('/'))
            );
            let query = ctx.query.as_ref().unwrap();
            assert_eq!(query.get("amp"), Some("1"));
            assert_eq!(query.queried_post, site.host.find_posts_by_slug("hello").first().copied());
            assert_eq!(ctx.response, Some(Response::Ok), "{mode} {structure}");
            assert!(ctx.head_links.is_empty());
        }
    }
}

#[test]
fn test_empty_marker_is_absent() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello/?amp=");
    assert_eq!(ctx.endpoint, Some(EndpointState::Absent));
    assert_eq!(site.routing.has_endpoint(&ctx), Some(false));
}

#[test]
fn test_standard_mode_has_no_endpoint() {
    let site = site(FeatureMode::Standard, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello/");
    assert_eq!(ctx.endpoint, Some(EndpointState::NotApplicable));
    assert_eq!(site.routing.has_endpoint(&ctx), None);

    let ctx = site.request("/2024/01/02/hello/?amp=1");
    assert_eq!(ctx.endpoint, Some(EndpointState::NotApplicable));
    assert_eq!(ctx.response, redirect(HELLO));

    let ctx = RequestContext::new(Environment::for_uri("/?amp=1"));
    assert_eq!(site.routing.has_endpoint(&ctx), None);

    let mut ctx = RequestContext::new(Environment::for_uri("/?amp=1"));
    site.routing.detect_endpoint_in_environment(&mut ctx);
    assert_eq!(ctx.endpoint, Some(EndpointState::NotApplicable));
    assert_eq!(site.routing.has_endpoint(&ctx), None);
}

#[test]
fn test_has_endpoint_fallbacks_before_detection() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);

    let ctx = RequestContext::new(Environment::for_uri("/wp-admin/?amp=1"));
    assert_eq!(site.routing.has_endpoint(&ctx), Some(false));

    let mut ctx = RequestContext::new(Environment::for_uri("/wp-admin/?amp=1"));
    ctx.env.is_admin = true;
    assert_eq!(site.routing.has_endpoint(&ctx), Some(true));

    let mut ctx = RequestContext::new(Environment::default());
    ctx.query_vars.insert("amp".to_string(), "1".to_string());
    assert_eq!(site.routing.has_endpoint(&ctx), Some(true));
}

#[test]
fn test_plain_permalinks_legacy_reader() {
    let site = site(FeatureMode::Reader, StructureKey::LegacyReader);
    site.host.set_permalink_structure("");
    let id = site.host.find_posts_by_slug("hello")[0];

    let uri = format!("/?p={id}&amp=1");
    let ctx = site.request(&uri);
    assert_eq!(ctx.endpoint, Some(EndpointState::Consumed));
    assert_eq!(ctx.response, Some(Response::Ok));
    assert_eq!(ctx.query.as_ref().unwrap().queried_post, Some(id));
    assert_eq!(site.routing.add_endpoint(&format!("https://example.org/?p={id}")), format!("https://example.org/?p={id}&amp=1"));
}

#[test]
fn test_subdirectory_home() {
    let host = MemoryHost::new("https://example.org/blog").unwrap();
    let site = site_with(host, FeatureMode::Transitional, StructureKey::PathSuffix);
    site.host.add_post("hello", PostDate::default());

    let ctx = site.request("/blog/2024/01/02/hello/amp/");
    assert_eq!(ctx.endpoint, Some(EndpointState::Consumed));
    assert_eq!(ctx.response, Some(Response::Ok));
}

// ============================================================================
// Front page
// ============================================================================

#[test]
fn test_front_page_query_corrected() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let front = site.host.add_page("home");
    site.host.set_front_page(Some(front));

    let mut vars = rustc_hash::FxHashMap::default();
    vars.insert("amp".to_string(), "1".to_string());
    let mut query = Query::main(vars.clone());
    query.is_home = true;
    site.routing.correct_query_when_is_front_page(&mut query);
    assert!(query.is_page && query.is_singular && query.is_front_page);
    assert!(!query.is_home);
    assert_eq!(query.page_id(), Some(front));

    vars.insert("s".to_string(), "term".to_string());
    let mut query = Query::main(vars);
    query.is_home = true;
    site.routing.correct_query_when_is_front_page(&mut query);
    assert!(query.is_home);
    assert_eq!(query.page_id(), None);
}

#[test]
fn test_front_page_request() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let front = site.host.add_page("home");
    site.host.set_front_page(Some(front));

    let ctx = site.request("/?amp=1");
    let query = ctx.query.as_ref().unwrap();
    assert_eq!(ctx.response, Some(Response::Ok));
    assert!(query.is_front_page);
    assert_eq!(query.queried_post, Some(front));
}

#[test]
fn test_front_page_untouched_without_static_page() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let ctx = site.request("/?amp=1");
    let query = ctx.query.as_ref().unwrap();
    assert!(query.is_home);
    assert!(!query.is_page);
}

// ============================================================================
// Slug guard
// ============================================================================

#[test]
fn test_unique_post_slug_numbers_marker() {
    let site = site(FeatureMode::Reader, StructureKey::PathSuffix);
    assert_eq!(site.routing.filter_unique_post_slug("amp".into(), None, "post"), "amp-2");
    assert_eq!(site.routing.filter_unique_post_slug("hello".into(), None, "post"), "hello");

    site.host.add_post("amp-2", PostDate::default());
    site.host.add_post("amp-3", PostDate::default());
    assert_eq!(site.routing.filter_unique_post_slug("amp".into(), None, "post"), "amp-4");
    assert_eq!(site.routing.filter_unique_post_slug("amp".into(), None, "page"), "amp-2");
}

#[test]
fn test_save_post_guarded_with_path_suffix() {
    let site = site(FeatureMode::Reader, StructureKey::PathSuffix);
    let first = site.host.save_post(&site.lifecycle, "AMP", "post", PostDate::default());
    assert_eq!(site.host.post(first).unwrap().slug, "amp-2");

    site.host.add_post("amp-3", PostDate::default());
    let second = site.host.save_post(&site.lifecycle, "AMP", "post", PostDate::default());
    assert_eq!(site.host.post(second).unwrap().slug, "amp-4");
}

#[test]
fn test_save_post_unguarded_with_query_var() {
    let site = site(FeatureMode::Reader, StructureKey::QueryVar);
    let id = site.host.save_post(&site.lifecycle, "AMP", "post", PostDate::default());
    assert_eq!(site.host.post(id).unwrap().slug, "amp");
}

#[test]
fn test_slug_guard_follows_structure_changes() {
    let to_suffix = site(FeatureMode::Transitional, StructureKey::QueryVar);
    to_suffix
        .store
        .update_option(keys::PAIRED_URL_STRUCTURE, json!("path_suffix"))
        .unwrap();
    let id = to_suffix.host.save_post(&to_suffix.lifecycle, "AMP", "post", PostDate::default());
    assert_eq!(to_suffix.host.post(id).unwrap().slug, "amp-2");

    let from_suffix = site(FeatureMode::Transitional, StructureKey::PathSuffix);
    from_suffix
        .store
        .update_option(keys::PAIRED_URL_STRUCTURE, json!("query_var"))
        .unwrap();
    let id = from_suffix.host.save_post(&from_suffix.lifecycle, "AMP", "post", PostDate::default());
    assert_eq!(from_suffix.host.post(id).unwrap().slug, "amp");
}

#[test]
fn test_save_post_unguarded_in_standard_mode() {
    let site = site(FeatureMode::Standard, StructureKey::PathSuffix);
    assert_eq!(site.lifecycle.priority_of(Filter::UniquePostSlug, Hook::GuardPostSlug), None);
    let id = site.host.save_post(&site.lifecycle, "AMP", "post", PostDate::default());
    assert_eq!(site.host.post(id).unwrap().slug, "amp");
}

// ============================================================================
// Redirects
// ============================================================================

#[test]
fn test_standard_mode_strips_query_var() {
    let site = site(FeatureMode::Standard, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello/?amp=1");
    assert_eq!(ctx.response, redirect(HELLO));
}

#[test]
fn test_standard_mode_strips_path_suffix_on_404() {
    let site = site(FeatureMode::Standard, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello/amp/");
    assert_eq!(ctx.response, redirect(HELLO));
}

#[test]
fn test_unconsumed_path_suffix_moves_to_query_var() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello/amp/");
    assert_eq!(ctx.endpoint, Some(EndpointState::Absent));
    assert_eq!(ctx.response, redirect(&format!("{HELLO}?amp=1")));
}

#[test]
fn test_renamed_slug_keeps_marker() {
    for (structure, uri, location) in [
        (
            StructureKey::PathSuffix,
            "/2024/01/02/hello/amp/",
            "https://example.org/2024/01/02/new/amp/",
        ),
        (
            StructureKey::QueryVar,
            "/2024/01/02/hello/?amp=1",
            "https://example.org/2024/01/02/new/?amp=1",
        ),
    ] {
        let site = site(FeatureMode::Transitional, structure);
        let id = site.host.find_posts_by_slug("hello")[0];
        site.host.rename_post(id, "new");

        let ctx = site.request(uri);
        assert_eq!(ctx.response, redirect(location), "{structure}");
    }
}

#[test]
fn test_renamed_slug_without_marker() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let id = site.host.find_posts_by_slug("hello")[0];
    site.host.rename_post(id, "new");

    let ctx = site.request("/2024/01/02/hello/");
    assert_eq!(ctx.response, redirect("https://example.org/2024/01/02/new/"));
}

#[test]
fn test_unavailable_template_drops_marker() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    site.store.update(|options| {
        options.all_templates_supported = false;
        options.supported_templates = vec!["is_singular".to_string()];
    });

    let ctx = site.request("/2024/01/02/?amp=1");
    assert_eq!(ctx.response, redirect("https://example.org/2024/01/02/"));

    let ctx = site.request("/2024/01/02/hello/?amp=1");
    assert_eq!(ctx.response, Some(Response::Ok));
}

#[test]
fn test_redirect_vetoed_by_filter() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    site.store.update(|options| {
        options.all_templates_supported = false;
        options.supported_templates = vec!["is_singular".to_string()];
    });
    site.host.add_redirect_filter(|_, _| None);

    let ctx = site.request("/2024/01/02/?amp=1");
    assert_eq!(ctx.response, Some(Response::Ok));
}

#[test]
fn test_canonical_redirect_preserves_endpoint() {
    let site = site(FeatureMode::Reader, StructureKey::PathSuffix);

    let ctx = site.request("/2024/01/02/hello/amp/");
    assert_eq!(ctx.response, Some(Response::Ok));

    let ctx = site.request("/2024/01/02/hello/amp");
    assert_eq!(ctx.response, redirect(&format!("{HELLO}amp/")));
    assert_eq!(
        ctx.priority_of(Filter::CanonicalRedirect, Hook::PreserveEndpoint),
        Some(PRESERVE_ENDPOINT_PRIORITY)
    );
    assert_eq!(
        ctx.priority_of(Filter::OldSlugRedirect, Hook::PreserveEndpoint),
        Some(PRESERVE_ENDPOINT_PRIORITY)
    );
}

#[test]
fn test_canonical_redirect_without_marker() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello");
    assert_eq!(ctx.response, redirect(HELLO));
    assert_eq!(ctx.priority_of(Filter::CanonicalRedirect, Hook::PreserveEndpoint), None);
}

#[test]
fn test_maybe_add_paired_endpoint() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    assert_eq!(site.routing.maybe_add_paired_endpoint(""), "");
    assert_eq!(
        site.routing.maybe_add_paired_endpoint("https://example.org/foo/"),
        "https://example.org/foo/?amp=1"
    );
}

// ============================================================================
// Discovery link
// ============================================================================

#[test]
fn test_paired_link_advertised_when_absent() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let ctx = site.request("/2024/01/02/hello/");
    assert_eq!(
        ctx.head_links,
        vec![HeadLink {
            rel: PAIRED_LINK_REL.to_string(),
            href: format!("{HELLO}?amp=1"),
        }]
    );
    assert_eq!(
        ctx.priority_of(Stage::PostRespond, Hook::AdvertisePairedLink),
        Some(DEFAULT_PRIORITY)
    );
}

#[test]
fn test_paired_link_skipped_without_paired_variant() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    site.store.update(|options| {
        options.all_templates_supported = false;
        options.supported_templates = vec!["is_page".to_string()];
    });

    let ctx = site.request("/2024/01/02/hello/");
    assert!(ctx.head_links.is_empty());

    let ctx = site.request("/2024/01/02/missing/");
    assert_eq!(ctx.response, Some(Response::NotFound));
    assert!(ctx.head_links.is_empty());
}

// ============================================================================
// Structures and options
// ============================================================================

#[test]
fn test_structure_follows_options() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}?amp=1"));

    site.store
        .update_option(keys::PAIRED_URL_STRUCTURE, json!("path_suffix"))
        .unwrap();
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}amp/"));
    assert!(site.routing.has_endpoint_in(&format!("{HELLO}amp/")));

    site.store.update_option(keys::SLUG, json!("lite")).unwrap();
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}lite/"));
}

#[test]
fn test_custom_structure() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    assert!(!site.routing.has_custom_paired_url_structure());

    site.routing.register_custom_structure(
        CustomStructure::new(|paired| Ok(Box::new(PathSuffixUrlStructure::new(paired.clone()))))
            .with_source(StructureSource::theme("paired-theme", "Paired Theme")),
    );
    assert!(site.routing.has_custom_paired_url_structure());
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}amp/"));
    assert_eq!(
        site.routing.custom_paired_structure_sources(),
        vec![StructureSource::theme("paired-theme", "Paired Theme")]
    );

    let urls = site.routing.all_structure_paired_urls(HELLO);
    assert_eq!(urls.len(), 5);
    assert_eq!(urls[4], (CUSTOM_STRUCTURE_KEY, format!("{HELLO}amp/")));

    site.routing.clear_custom_structure();
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}?amp=1"));
    assert!(site.routing.custom_paired_structure_sources().is_empty());
}

#[test]
fn test_custom_provider_runs_without_slot_locked() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let armed = Arc::new(AtomicBool::new(false));

    let routing = site.routing.clone();
    let trigger = armed.clone();
    site.routing.register_custom_structure(CustomStructure::new(move |paired| {
        if trigger.swap(false, Ordering::SeqCst) {
            routing.clear_custom_structure();
        }
        Ok(Box::new(PathSuffixUrlStructure::new(paired.clone())))
    }));

    armed.store(true, Ordering::SeqCst);
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}amp/"));
    assert!(!site.routing.has_custom_paired_url_structure());
}

#[test]
fn test_invalid_custom_structure_falls_back() {
    let site = site(FeatureMode::Transitional, StructureKey::PathSuffix);
    site.routing
        .register_custom_structure(CustomStructure::new(|_| Ok(Box::new(InertStructure))));

    let structure = site.routing.paired_url_structure();
    assert!(validate_structure(structure.as_ref(), HELLO).is_ok());
    assert_eq!(site.routing.add_endpoint(HELLO), format!("{HELLO}?amp=1"));
    assert_eq!(site.routing.all_structure_paired_urls(HELLO).len(), 4);
}

#[test]
fn test_all_structure_paired_urls() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let with_query = format!("{HELLO}?amp=1");
    let with_suffix = format!("{HELLO}amp/");
    assert_eq!(
        site.routing.all_structure_paired_urls(HELLO),
        vec![
            ("query_var", with_query.clone()),
            ("path_suffix", with_suffix.clone()),
            ("legacy_transitional", with_query),
            ("legacy_reader", with_suffix),
        ]
    );
}

#[test]
fn test_paired_url_examples() {
    let empty = site_with(
        MemoryHost::default(),
        FeatureMode::Transitional,
        StructureKey::QueryVar,
    );
    let examples = empty.routing.paired_url_examples();
    assert_eq!(
        examples[0],
        (
            "query_var",
            ["https://example.org/".to_string(), "https://example.org/?amp=1".to_string()]
        )
    );

    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    site.host.add_post("older", PostDate::new(2023, 5, 6));
    let examples = site.routing.paired_url_examples();
    assert_eq!(examples.len(), 4);
    assert_eq!(examples[1], ("path_suffix", [HELLO.to_string(), format!("{HELLO}amp/")]));
}

#[test]
fn test_filter_default_options() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let mut defaults = Map::new();
    defaults.insert("foo".to_string(), json!("bar"));

    let upgraded = Options {
        version: "2.0.0".to_string(),
        ..Options::default()
    };
    let filtered = site.routing.filter_default_options(defaults.clone(), &upgraded);
    assert_eq!(filtered["foo"], json!("bar"));
    assert_eq!(filtered[keys::PAIRED_URL_STRUCTURE], json!("legacy_reader"));

    let fresh = site.routing.filter_default_options(defaults, &Options::default());
    assert_eq!(fresh[keys::PAIRED_URL_STRUCTURE], json!("query_var"));
}

#[test]
fn test_sanitize_options_keeps_prior_on_reject() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let mut prior = Map::new();
    prior.insert(keys::PAIRED_URL_STRUCTURE.to_string(), json!("path_suffix"));

    let mut new = Map::new();
    new.insert(keys::PAIRED_URL_STRUCTURE.to_string(), json!("custom"));
    let kept = site.routing.sanitize_options(prior.clone(), &new);
    assert_eq!(kept[keys::PAIRED_URL_STRUCTURE], json!("path_suffix"));

    new.insert(keys::PAIRED_URL_STRUCTURE.to_string(), json!("legacy_reader"));
    let updated = site.routing.sanitize_options(prior, &new);
    assert_eq!(updated[keys::PAIRED_URL_STRUCTURE], json!("legacy_reader"));
}

#[test]
fn test_endpoint_path_slug_conflicts() {
    let site = site(FeatureMode::Transitional, StructureKey::PathSuffix);
    assert_eq!(site.routing.endpoint_path_slug_conflicts(), None);

    let term = site.host.add_term("amp");
    site.host.register_post_type("amp");
    let report = site.routing.endpoint_path_slug_conflicts().unwrap();
    assert_eq!(report.terms, vec![term]);
    assert_eq!(report.post_types, vec!["amp".to_string()]);
    assert!(report.posts.is_empty());
}

#[test]
fn test_slug_conflicts_warned_for_path_suffix() {
    let host = MemoryHost::default();
    let term = host.add_term("amp");
    let site = site_with(host, FeatureMode::Reader, StructureKey::PathSuffix);
    let report = site.routing.warn_endpoint_path_slug_conflicts().unwrap();
    assert_eq!(report.terms, vec![term]);

    let host = MemoryHost::default();
    host.add_term("amp");
    let site = site_with(host, FeatureMode::Reader, StructureKey::QueryVar);
    assert_eq!(site.routing.warn_endpoint_path_slug_conflicts(), None);
    assert!(site.routing.endpoint_path_slug_conflicts().is_some());
}

#[test]
fn test_permalink_settings_notice() {
    let site = site(FeatureMode::Transitional, StructureKey::QueryVar);
    let notice = site.routing.permalink_settings_notice("options-permalink").unwrap();
    assert!(notice.contains("https://example.org/?amp=1"));
    assert_eq!(site.routing.permalink_settings_notice("options-general"), None);

    let standard = site_with(MemoryHost::default(), FeatureMode::Standard, StructureKey::QueryVar);
    assert_eq!(standard.routing.permalink_settings_notice("options-permalink"), None);
}
