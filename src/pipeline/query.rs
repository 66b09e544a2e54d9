//! Main query flags.

use rustc_hash::FxHashMap;

/// Resolved request, as the host's template logic sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub is_main: bool,
    pub is_home: bool,
    pub is_front_page: bool,
    pub is_page: bool,
    pub is_single: bool,
    pub is_singular: bool,
    pub is_date: bool,
    pub is_archive: bool,
    pub is_search: bool,
    pub is_404: bool,

    /// Query variables, including ones set by subscribers.
    pub vars: FxHashMap<String, String>,
    /// Variables as they came out of request parsing.
    pub requested: FxHashMap<String, String>,

    /// Post the query resolved to, if singular.
    pub queried_post: Option<u64>,
}

impl Query {
    /// Main query built from parsed request variables.
    pub fn main(vars: FxHashMap<String, String>) -> Self {
        Self {
            is_main: true,
            requested: vars.clone(),
            vars,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Non-zero `page_id` variable.
    pub fn page_id(&self) -> Option<u64> {
        self.get("page_id")
            .and_then(|id| id.parse().ok())
            .filter(|id| *id != 0)
    }

    /// Mark the query as not found, clearing every other flag.
    pub fn set_404(&mut self) {
        *self = Self {
            is_main: self.is_main,
            is_404: true,
            vars: std::mem::take(&mut self.vars),
            requested: std::mem::take(&mut self.requested),
            ..Self::default()
        };
    }

    /// Template conditions that hold, most specific first.
    pub fn templates(&self) -> Vec<&'static str> {
        [
            (self.is_404, "is_404"),
            (self.is_search, "is_search"),
            (self.is_front_page, "is_front_page"),
            (self.is_home, "is_home"),
            (self.is_page, "is_page"),
            (self.is_single, "is_single"),
            (self.is_singular, "is_singular"),
            (self.is_date, "is_date"),
            (self.is_archive, "is_archive"),
        ]
        .into_iter()
        .filter_map(|(holds, name)| holds.then_some(name))
        .collect()
    }
}
