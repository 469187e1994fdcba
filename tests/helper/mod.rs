//! Shared test utilities

pub mod source;

pub use source::{FakeAddonSource, FakeCrashSource, addon_json, version_json};
