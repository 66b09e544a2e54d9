//! Core types - pure abstractions shared across the codebase.

mod mode;
mod state;
pub mod url;

pub use mode::FeatureMode;
pub use state::EndpointState;
pub use url::UrlParts;
