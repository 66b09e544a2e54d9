//! In-memory content host.
//!
//! Holds posts, pages, terms and users behind a lock and answers requests
//! through the staged lifecycle, so routing can be exercised end to end
//! without a real CMS.
//!
//! Permalink structures use the `%year%`, `%monthnum%`, `%day%` and
//! `%postname%` tags; an empty structure means plain `?p=<id>` links.

mod request;

use std::sync::Arc;

use deunicode::deunicode;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use url::Url;

use super::Host;
use crate::pipeline::{Lifecycle, Query, SlugCandidate};

/// Date-based structure most tests run with.
pub const DATE_PERMALINK_STRUCTURE: &str = "/%year%/%monthnum%/%day%/%postname%/";

type RedirectFilter = Arc<dyn Fn(String, u16) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl PostDate {
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl Default for PostDate {
    fn default() -> Self {
        Self::new(2024, 1, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub slug: String,
    pub post_type: String,
    pub date: PostDate,
    /// Slugs the post was published under before.
    pub old_slugs: Vec<String>,
}

#[derive(Debug, Clone)]
struct Term {
    id: u64,
    slug: String,
}

#[derive(Debug, Clone)]
struct User {
    id: u64,
    login: String,
}

#[derive(Default)]
struct SiteState {
    posts: FxHashMap<u64, Post>,
    terms: Vec<Term>,
    users: Vec<User>,
    post_types: FxHashSet<String>,
    taxonomies: FxHashSet<String>,
    permalink_structure: String,
    /// Static front page (`show_on_front = page`).
    front_page: Option<u64>,
    redirect_filters: Vec<RedirectFilter>,
    next_id: u64,
}

impl SiteState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory host.
pub struct MemoryHost {
    home_url: String,
    state: RwLock<SiteState>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::with_home("https://example.org/".to_string())
    }
}

impl MemoryHost {
    /// Host serving from `home_url`; a missing trailing `/` is added.
    pub fn new(home_url: &str) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(home_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self::with_home(url.into()))
    }

    fn with_home(home_url: String) -> Self {
        let state = SiteState {
            post_types: ["post", "page", "attachment"].map(String::from).into_iter().collect(),
            taxonomies: ["category", "post_tag"].map(String::from).into_iter().collect(),
            permalink_structure: DATE_PERMALINK_STRUCTURE.to_string(),
            ..SiteState::default()
        };
        Self {
            home_url,
            state: RwLock::new(state),
        }
    }

    // ------------------------------------------------------------------------
    // Site settings
    // ------------------------------------------------------------------------

    /// Empty structure switches to plain permalinks.
    pub fn set_permalink_structure(&self, structure: &str) {
        self.state.write().permalink_structure = structure.to_string();
    }

    /// Show a static page on the front, or the posts listing with `None`.
    pub fn set_front_page(&self, page: Option<u64>) {
        self.state.write().front_page = page;
    }

    pub fn register_post_type(&self, name: &str) {
        self.state.write().post_types.insert(name.to_string());
    }

    pub fn register_taxonomy(&self, name: &str) {
        self.state.write().taxonomies.insert(name.to_string());
    }

    /// Add a redirect filter; returning `None` or an empty string vetoes.
    pub fn add_redirect_filter<F>(&self, filter: F)
    where
        F: Fn(String, u16) -> Option<String> + Send + Sync + 'static,
    {
        self.state.write().redirect_filters.push(Arc::new(filter));
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    /// Insert a post with `slug` as given.
    pub fn add_post(&self, slug: &str, date: PostDate) -> u64 {
        self.insert("post", slug, date)
    }

    pub fn add_page(&self, slug: &str) -> u64 {
        self.insert("page", slug, PostDate::default())
    }

    /// Save a new post titled `title`, deriving a unique slug through the
    /// `UniquePostSlug` filter.
    pub fn save_post(&self, lifecycle: &Lifecycle, title: &str, post_type: &str, date: PostDate) -> u64 {
        let slug = self.unique_post_slug(lifecycle, &sanitize_title(title), None, post_type);
        self.insert(post_type, &slug, date)
    }

    /// Numbered variant of `slug` not used by another post, then filtered.
    pub fn unique_post_slug(
        &self,
        lifecycle: &Lifecycle,
        slug: &str,
        post_id: Option<u64>,
        post_type: &str,
    ) -> String {
        let mut unique = slug.to_string();
        let mut suffix = 2;
        while self.post_slug_taken(&unique, post_id, post_type) {
            unique = format!("{slug}-{suffix}");
            suffix += 1;
        }

        let candidate = SlugCandidate {
            post_id,
            post_type: post_type.to_string(),
        };
        lifecycle.apply_slug_filter(unique, &candidate)
    }

    /// Change a post's slug, remembering the old one for redirects.
    pub fn rename_post(&self, id: u64, slug: &str) -> bool {
        let mut state = self.state.write();
        let Some(post) = state.posts.get_mut(&id) else {
            return false;
        };
        if post.slug != slug {
            let old = std::mem::replace(&mut post.slug, slug.to_string());
            post.old_slugs.push(old);
        }
        true
    }

    pub fn add_term(&self, slug: &str) -> u64 {
        let mut state = self.state.write();
        let id = state.next_id();
        state.terms.push(Term {
            id,
            slug: slug.to_string(),
        });
        id
    }

    pub fn add_user(&self, login: &str) -> u64 {
        let mut state = self.state.write();
        let id = state.next_id();
        state.users.push(User {
            id,
            login: login.to_string(),
        });
        id
    }

    pub fn post(&self, id: u64) -> Option<Post> {
        self.state.read().posts.get(&id).cloned()
    }

    pub fn permalink(&self, id: u64) -> Option<String> {
        let state = self.state.read();
        state.posts.get(&id).map(|post| self.permalink_of(&state, post))
    }

    fn insert(&self, post_type: &str, slug: &str, date: PostDate) -> u64 {
        let mut state = self.state.write();
        let id = state.next_id();
        state.posts.insert(
            id,
            Post {
                id,
                slug: slug.to_string(),
                post_type: post_type.to_string(),
                date,
                old_slugs: Vec::new(),
            },
        );
        id
    }

    fn permalink_of(&self, state: &SiteState, post: &Post) -> String {
        if state.front_page == Some(post.id) {
            return self.home_url.clone();
        }

        let structure = &state.permalink_structure;
        if structure.is_empty() {
            let key = if post.post_type == "page" { "page_id" } else { "p" };
            return format!("{}?{}={}", self.home_url, key, post.id);
        }

        let path = if post.post_type == "page" {
            let mut path = post.slug.clone();
            if structure.ends_with('/') {
                path.push('/');
            }
            path
        } else {
            structure
                .trim_start_matches('/')
                .replace("%year%", &format!("{:04}", post.date.year))
                .replace("%monthnum%", &format!("{:02}", post.date.month))
                .replace("%day%", &format!("{:02}", post.date.day))
                .replace("%postname%", &post.slug)
        };
        format!("{}{}", self.home_url, path)
    }

    /// Path of the home URL without surrounding slashes (`blog` for `/blog/`).
    fn home_path(&self) -> &str {
        let after_scheme = self
            .home_url
            .split_once("://")
            .map_or(self.home_url.as_str(), |(_, rest)| rest);
        after_scheme
            .find('/')
            .map_or("", |idx| &after_scheme[idx..])
            .trim_matches('/')
    }
}

impl Host for MemoryHost {
    fn home_url(&self) -> String {
        self.home_url.clone()
    }

    fn using_permalinks(&self) -> bool {
        !self.state.read().permalink_structure.is_empty()
    }

    fn trailing_slash(&self) -> bool {
        self.state.read().permalink_structure.ends_with('/')
    }

    fn find_posts_by_slug(&self, slug: &str) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .state
            .read()
            .posts
            .values()
            .filter(|post| post.slug == slug)
            .map(|post| post.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn find_terms_by_slug(&self, slug: &str) -> Vec<u64> {
        self.state
            .read()
            .terms
            .iter()
            .filter(|term| term.slug == slug)
            .map(|term| term.id)
            .collect()
    }

    fn find_users_by_login(&self, login: &str) -> Vec<u64> {
        self.state
            .read()
            .users
            .iter()
            .filter(|user| user.login == login)
            .map(|user| user.id)
            .collect()
    }

    fn post_type_exists(&self, name: &str) -> bool {
        self.state.read().post_types.contains(name)
    }

    fn taxonomy_exists(&self, name: &str) -> bool {
        self.state.read().taxonomies.contains(name)
    }

    fn post_slug_taken(&self, slug: &str, exclude: Option<u64>, post_type: &str) -> bool {
        self.state.read().posts.values().any(|post| {
            post.slug == slug && post.post_type == post_type && Some(post.id) != exclude
        })
    }

    fn front_page_id(&self) -> Option<u64> {
        self.state.read().front_page
    }

    fn old_slug_redirect(&self, query: &Query) -> Option<String> {
        if !query.is_404 {
            return None;
        }
        let name = query.get("name")?;
        let state = self.state.read();
        state
            .posts
            .values()
            .filter(|post| post.post_type == "post" && post.old_slugs.iter().any(|s| s == name))
            .max_by_key(|post| post.id)
            .map(|post| self.permalink_of(&state, post))
    }

    fn filter_redirect_location(&self, location: String, status: u16) -> Option<String> {
        let filters = self.state.read().redirect_filters.clone();
        filters
            .iter()
            .try_fold(location, |location, filter| filter(location, status))
            .filter(|location| !location.is_empty())
    }

    fn latest_post_permalink(&self) -> Option<String> {
        let state = self.state.read();
        state
            .posts
            .values()
            .filter(|post| post.post_type == "post")
            .max_by_key(|post| (post.date, post.id))
            .map(|post| self.permalink_of(&state, post))
    }
}

/// Slug for a title: transliterated to ASCII, lowercase, `-` separated.
pub fn sanitize_title(title: &str) -> String {
    let ascii = deunicode(title).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
