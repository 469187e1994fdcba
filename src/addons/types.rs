//! Add-on records as served by the ATN v4 API

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::version::compat::VersionEntry;

/// Kind of add-on listed on ATN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddonKind {
    Extension,
    StaticTheme,
}

impl AddonKind {
    pub const ALL: [AddonKind; 2] = [AddonKind::Extension, AddonKind::StaticTheme];

    /// Value of the API's `type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonKind::Extension => "extension",
            AddonKind::StaticTheme => "statictheme",
        }
    }

    /// Display name, e.g. `Extension`
    pub fn name(&self) -> &'static str {
        match self {
            AddonKind::Extension => "Extension",
            AddonKind::StaticTheme => "Theme",
        }
    }

    /// Path segment of the public listing page
    pub fn listing_path(&self) -> &'static str {
        match self {
            AddonKind::Extension => "extensions",
            AddonKind::StaticTheme => "static-themes",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Addon {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: String,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub default_locale: String,
    /// Category slugs per application
    #[serde(default)]
    pub categories: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub current_version: AddonVersion,
    #[serde(default)]
    pub average_daily_users: Option<u64>,
    #[serde(default)]
    pub weekly_downloads: Option<u64>,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_experimental: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_source_public: bool,
    #[serde(default)]
    pub contributions_url: Option<String>,
    #[serde(default)]
    pub requires_payment: bool,
    #[serde(default)]
    pub public_stats: bool,
}

impl Addon {
    /// Key of this add-on in the version history file
    pub fn history_key(&self) -> String {
        format!("{}-{}", self.id, self.slug)
    }

    /// Category slugs for `app`, empty when the add-on declares none
    pub fn categories_for(&self, app: &str) -> &[String] {
        self.categories
            .get(app)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn requests_contributions(&self) -> bool {
        self.contributions_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// `'Jane Doe' (jdoe), bob`
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(Author::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
}

impl Author {
    pub fn display_name(&self) -> String {
        if self.name != self.username {
            format!("'{}' ({})", self.name, self.username)
        } else {
            self.username.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Ratings {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub bayesian_average: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AddonVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub compatibility: IndexMap<String, AppCompatibility>,
    #[serde(default)]
    pub files: Vec<AddonFile>,
}

impl AddonVersion {
    /// When the newest file of this version was uploaded
    pub fn released(&self) -> Option<DateTime<Utc>> {
        self.files.iter().map(|file| file.created).max()
    }
}

impl VersionEntry for AddonVersion {
    fn compatibility(&self, app: &str) -> Option<(&str, &str)> {
        self.compatibility
            .get(app)
            .map(|c| (c.min.as_str(), c.max.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppCompatibility {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AddonFile {
    pub created: DateTime<Utc>,
}

/// Version listings keyed by [`Addon::history_key`]
pub type AddonHistory = IndexMap<String, Vec<AddonVersion>>;

/// Decode raw records, skipping (and logging) the ones that do not match `T`
pub fn decode_records<T: DeserializeOwned>(raw: &[Value]) -> Vec<T> {
    raw.iter()
        .filter_map(|value| {
            T::deserialize(value)
                .inspect_err(|e| warn!("Skipping malformed record: {}", e))
                .ok()
        })
        .collect()
}
