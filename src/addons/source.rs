//! Source trait for fetching raw add-on data

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;
use serde_json::Value;

use crate::addons::types::AddonKind;
use crate::error::SourceError;

/// Fetches raw add-on and product data.
///
/// Records are returned as raw JSON so they can be cached verbatim.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AddonSource: Send + Sync {
    /// All listed add-ons of one kind, oldest first
    async fn fetch_addons(&self, kind: AddonKind) -> Result<Vec<Value>, SourceError>;

    /// Every published version of an add-on.
    ///
    /// Listings that are private or gone yield the versions collected so far.
    async fn fetch_addon_versions(&self, addon_id: u64) -> Result<Vec<Value>, SourceError>;

    /// Current product versions, keyed like `LATEST_THUNDERBIRD_VERSION`
    async fn fetch_product_versions(&self) -> Result<IndexMap<String, Value>, SourceError>;

    /// Locale code to language names
    async fn fetch_languages(&self) -> Result<Value, SourceError>;
}
