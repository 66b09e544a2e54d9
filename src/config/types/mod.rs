//! Options utility types.
//!
//! | Module   | Purpose                                      |
//! |----------|----------------------------------------------|
//! | `error`  | Loading and validation errors                |
//! | `field`  | Option key paths for diagnostics             |
//! | `handle` | Options store with atomic replacement        |

mod error;
mod field;
mod handle;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use field::FieldPath;
pub use handle::OptionsStore;
