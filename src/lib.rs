//! Paired URL routing: serve a constrained-HTML variant of every page at a
//! second, marked URL next to the canonical one.
//!
//! ```text
//! https://example.org/2024/01/02/hello/          canonical
//! https://example.org/2024/01/02/hello/?amp=1    paired (query_var)
//! https://example.org/2024/01/02/hello/amp/      paired (path_suffix)
//! ```
//!
//! A [`PairedRouting`] subscribes to the host's request [`Lifecycle`]: it
//! strips the marker before the host parses the request, exposes it as a
//! query variable, restores the environment, and issues corrective
//! redirects once the request is resolved.

pub mod config;
pub mod conflict;
pub mod core;
pub mod host;
pub mod logger;
pub mod paired_url;
pub mod pipeline;
pub mod rest;
pub mod routing;
pub mod structure;

pub use config::{Options, OptionsStore};
pub use crate::core::{EndpointState, FeatureMode};
pub use host::{Host, MemoryHost};
pub use paired_url::PairedUrl;
pub use pipeline::{Lifecycle, RequestContext, Response};
pub use routing::PairedRouting;
pub use structure::{CustomStructure, PairedUrlStructure, StructureKey};
