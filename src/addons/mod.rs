//! Add-on data from addons.thunderbird.net
//!
//! # Modules
//!
//! - [`types`]: Add-on records and their version entries
//! - [`source`]: Source trait for fetching raw records
//! - [`client`]: ATN API implementation of the source
//! - [`data`]: Loads records through the flat-file cache

pub mod client;
pub mod data;
pub mod source;
pub mod types;

pub use client::AtnClient;
pub use data::{AddonData, load_addon_data, load_languages, target_versions};
pub use source::AddonSource;
pub use types::{Addon, AddonHistory, AddonKind, AddonVersion};
