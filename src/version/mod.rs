//! Version grammar and compatibility checks
//!
//! # Modules
//!
//! - [`parse`]: Parses add-on platform version strings into an ordered [`Version`]
//! - [`compat`]: Evaluates `{min, max}` compatibility ranges against a target version
//! - [`error`]: Error types for parsing and compatibility lookups

pub mod compat;
pub mod error;
pub mod parse;

pub use compat::{CompatibilityEvaluator, CompatibilityRange, TargetVersion, VersionEntry};
pub use error::{CompatibilityError, ParseError};
pub use parse::{PreStage, ReleaseStage, VERSION_PART_MAX, Version, channel_label};
