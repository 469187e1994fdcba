//! Loading add-on data through the flat-file cache

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::addons::source::AddonSource;
use crate::addons::types::{Addon, AddonHistory, AddonKind, AddonVersion, decode_records};
use crate::cache::JsonCache;
use crate::config::NamedVersion;
use crate::error::{CacheError, ReportError, SourceError};
use crate::version::compat::TargetVersion;

/// Product-details keys checked for compatibility, with their channel names
pub const PRODUCT_VERSION_KEYS: [(&str, &str); 5] = [
    ("LATEST_THUNDERBIRD_NIGHTLY_VERSION", "Daily"),
    ("LATEST_THUNDERBIRD_DEVEL_VERSION", "Beta"),
    ("LATEST_THUNDERBIRD_VERSION", "Release"),
    ("THUNDERBIRD_ESR_NEXT", "Next ESR"),
    ("THUNDERBIRD_ESR", "ESR"),
];

/// Key of the current release in product details
pub const RELEASE_VERSION_KEY: &str = "LATEST_THUNDERBIRD_VERSION";

/// Add-ons of one kind with their version histories
#[derive(Debug, Clone)]
pub struct AddonData {
    pub kind: AddonKind,
    pub addons: Vec<Addon>,
    pub history: AddonHistory,
    /// When the version history snapshot was written
    pub as_of: Option<DateTime<Utc>>,
}

impl AddonData {
    /// Versions used for history-based checks: the published listing, or the
    /// current version when the listing is empty or missing
    pub fn versions_of<'a>(&'a self, addon: &'a Addon) -> &'a [AddonVersion] {
        match self.history.get(&addon.history_key()) {
            Some(versions) if !versions.is_empty() => versions,
            _ => std::slice::from_ref(&addon.current_version),
        }
    }

    /// Published listing only, empty when none was recorded
    pub fn history_of(&self, addon: &Addon) -> &[AddonVersion] {
        self.history
            .get(&addon.history_key())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Load add-ons and their version listings, fetching whatever is not cached
pub async fn load_addon_data<S: AddonSource + ?Sized>(
    source: &S,
    cache: &JsonCache,
    kind: AddonKind,
) -> Result<AddonData, ReportError> {
    let addons_file = format!("ATN_{}s.json", kind.as_str());
    let raw_addons: Vec<Value> = cache
        .load_or_fetch(&addons_file, || source.fetch_addons(kind))
        .await?;
    let addons: Vec<Addon> = decode_records(&raw_addons);
    info!("Loaded {} {} records", addons.len(), kind.as_str());

    let versions_file = format!("ATN_{}_versions.json", kind.as_str());
    let raw_history: IndexMap<String, Vec<Value>> = cache
        .load_or_fetch(&versions_file, || async {
            let mut history: IndexMap<String, Vec<Value>> = IndexMap::new();
            for addon in &addons {
                info!("{}: {} {:?}", kind.as_str(), addon.id, addon.slug);
                let versions = source.fetch_addon_versions(addon.id).await?;
                history.insert(addon.history_key(), versions);
            }
            Ok::<_, SourceError>(history)
        })
        .await?;

    let history = raw_history
        .iter()
        .map(|(key, versions)| (key.clone(), decode_records(versions)))
        .collect();

    Ok(AddonData {
        kind,
        addons,
        history,
        as_of: cache.modified(&versions_file)?,
    })
}

/// Locale names keyed by locale code; empty when they cannot be fetched
pub async fn load_languages<S: AddonSource + ?Sized>(
    source: &S,
    cache: &JsonCache,
) -> Result<Value, ReportError> {
    match cache
        .load_or_fetch("languages.json", || source.fetch_languages())
        .await
    {
        Ok(languages) => Ok(languages),
        Err(CacheError::Source(e)) => {
            warn!("Language names unavailable: {}", e);
            Ok(Value::Object(Default::default()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Versions to check add-ons against: published channels that are set, then
/// the configured extras. Unparseable versions are skipped.
pub fn target_versions(
    product_versions: &IndexMap<String, Value>,
    extra: &[NamedVersion],
) -> Vec<TargetVersion> {
    let published = PRODUCT_VERSION_KEYS.iter().filter_map(|(key, name)| {
        product_versions
            .get(*key)
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
            .map(|raw| (raw, *name))
    });
    let extra = extra.iter().map(|v| (v.version.as_str(), v.name.as_str()));

    published
        .chain(extra)
        .filter_map(|(raw, name)| {
            TargetVersion::parse(raw, name)
                .inspect_err(|e| warn!("Skipping {} version: {}", name, e))
                .ok()
        })
        .collect()
}
