//! Default structure policy.
//!
//! Sites that stored options before the structure choice existed already
//! published paired URLs in a legacy shape, so they keep that shape until
//! an administrator picks a structure explicitly.

use std::cmp::Ordering;

use super::Options;
use crate::core::FeatureMode;
use crate::structure::StructureKey;

/// Version written by this crate.
pub const CURRENT_VERSION: &str = "2.1.0";

/// First version that stored a structure choice.
pub const STRUCTURE_CHOICE_VERSION: &str = "2.1.0";

/// Built-in reader theme.
pub const DEFAULT_READER_THEME: &str = "legacy";

/// Structure used when none has been stored.
///
/// | Stored version | Mode          | Reader theme | Structure             |
/// |----------------|---------------|--------------|-----------------------|
/// | none or ≥ 2.1  | any           | any          | `query_var`           |
/// | < 2.1          | reader        | `legacy`     | `legacy_reader`       |
/// | < 2.1          | anything else | any          | `legacy_transitional` |
pub fn default_paired_url_structure(options: &Options) -> StructureKey {
    let is_upgrade =
        !options.version.is_empty() && version_lt(&options.version, STRUCTURE_CHOICE_VERSION);
    if !is_upgrade {
        return StructureKey::QueryVar;
    }

    if options.theme_support == FeatureMode::Reader
        && options.reader_theme == DEFAULT_READER_THEME
    {
        StructureKey::LegacyReader
    } else {
        StructureKey::LegacyTransitional
    }
}

/// Compare dotted numeric versions (`2.0.10 < 2.1`). Non-numeric suffixes
/// such as `-beta` are ignored.
pub fn version_lt(a: &str, b: &str) -> bool {
    compare_versions(a, b) == Ordering::Less
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split(['.', '-', '+'])
            .map_while(|part| part.parse::<u64>().ok())
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
