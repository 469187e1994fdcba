//! In-memory sources serving fixture JSON

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::{Value, json};

use tb_metrics::addons::{AddonKind, AddonSource};
use tb_metrics::crash::{CrashSource, HistogramWeek, Signature};
use tb_metrics::error::SourceError;

/// Add-on source backed by fixture records
#[derive(Default)]
pub struct FakeAddonSource {
    addons: HashMap<&'static str, Vec<Value>>,
    versions: HashMap<u64, Vec<Value>>,
    product_versions: IndexMap<String, Value>,
    languages: Option<Value>,
    fetches: AtomicUsize,
}

impl FakeAddonSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_addons(mut self, kind: AddonKind, addons: Vec<Value>) -> Self {
        self.addons.insert(kind.as_str(), addons);
        self
    }

    pub fn with_versions(mut self, addon_id: u64, versions: Vec<Value>) -> Self {
        self.versions.insert(addon_id, versions);
        self
    }

    pub fn with_product_version(mut self, key: &str, version: &str) -> Self {
        self.product_versions
            .insert(key.to_string(), Value::String(version.to_string()));
        self
    }

    pub fn with_languages(mut self, languages: Value) -> Self {
        self.languages = Some(languages);
        self
    }

    /// Add-on and version listing requests served so far
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddonSource for FakeAddonSource {
    async fn fetch_addons(&self, kind: AddonKind) -> Result<Vec<Value>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.addons.get(kind.as_str()).cloned().unwrap_or_default())
    }

    async fn fetch_addon_versions(&self, addon_id: u64) -> Result<Vec<Value>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.versions.get(&addon_id).cloned().unwrap_or_default())
    }

    async fn fetch_product_versions(&self) -> Result<IndexMap<String, Value>, SourceError> {
        Ok(self.product_versions.clone())
    }

    async fn fetch_languages(&self) -> Result<Value, SourceError> {
        self.languages
            .clone()
            .ok_or_else(|| SourceError::NotFound("languages.json".to_string()))
    }
}

/// Crash source returning canned aggregations
#[derive(Default)]
pub struct FakeCrashSource {
    pub weeks: Vec<HistogramWeek>,
    pub signatures: Vec<Signature>,
}

#[async_trait]
impl CrashSource for FakeCrashSource {
    async fn fetch_histogram(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<HistogramWeek>, SourceError> {
        Ok(self.weeks.clone())
    }

    async fn fetch_signatures(
        &self,
        _product: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Signature>, SourceError> {
        Ok(self.signatures.clone())
    }
}

/// A listed add-on as returned by the search endpoint
pub fn addon_json(id: u64, slug: &str, created: &str, min: &str, max: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "guid": format!("{}@example.org", slug),
        "name": slug,
        "summary": "A test add-on",
        "url": format!("https://addons.thunderbird.net/en-US/thunderbird/addon/{}/", slug),
        "created": created,
        "last_updated": created,
        "default_locale": "de",
        "categories": { "thunderbird": ["appearance"] },
        "tags": [],
        "authors": [{ "name": "Jane Doe", "username": "jdoe" }],
        "current_version": version_json("1.0", min, max, created),
        "average_daily_users": id * 10,
        "weekly_downloads": id,
        "ratings": { "count": 20, "bayesian_average": 4.5 },
        "is_source_public": true
    })
}

/// A version entry with one uploaded file
pub fn version_json(version: &str, min: &str, max: &str, uploaded: &str) -> Value {
    json!({
        "version": version,
        "compatibility": { "thunderbird": { "min": min, "max": max } },
        "files": [{ "created": uploaded }]
    })
}
