use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ReportError;

// =============================================================================
// Remote endpoints
// =============================================================================

pub const ATN_BASE_URL: &str = "https://addons.thunderbird.net/";

/// Version 5 of the API is not served by ATN yet
pub const ATN_API_URL: &str = "https://addons.thunderbird.net/api/v4/";

pub const PRODUCT_DETAILS_URL: &str = "https://product-details.mozilla.org/1.0/";

pub const CRASH_STATS_BASE_URL: &str = "https://crash-stats.mozilla.org/";

pub const CRASH_STATS_API_URL: &str = "https://crash-stats.mozilla.org/api/";

pub const USER_AGENT: &str = concat!("Thunderbird Metrics (tb-metrics/", env!("CARGO_PKG_VERSION"), ")");

// =============================================================================
// HTTP behavior
// =============================================================================

/// Results requested per page from paginated endpoints
pub const PAGE_SIZE: u32 = 50;

/// Timeout for a single request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Retries on `502 Bad Gateway` from ATN
pub const ATN_MAX_RETRIES: u32 = 5;

/// Retries on any transient failure from crash stats
pub const CRASH_STATS_MAX_RETRIES: u32 = 3;

/// Base of the exponential backoff between retries in milliseconds
pub const RETRY_BACKOFF_MS: u64 = 1_000;

/// Report configuration, read from an optional JSON file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    /// Application key in add-on compatibility data
    pub app: String,
    pub lang: String,
    /// Years of monthly history in the add-on report
    pub history_years: u32,
    pub top_categories: usize,
    pub top_addons: usize,
    pub top_reviewed: usize,
    /// Minimum number of reviews to appear in the rating leaderboard
    pub min_reviews: u64,
    /// Include the tag and weekly download sections
    pub verbose: bool,
    /// Versions checked in addition to the published product versions
    pub extra_versions: Vec<NamedVersion>,
    /// Months of weekly crash history
    pub crash_months: u32,
    pub crash_top_signatures: usize,
    pub crash_top_versions: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            app: "thunderbird".to_string(),
            lang: "en-US".to_string(),
            history_years: 10,
            top_categories: 10,
            top_addons: 20,
            top_reviewed: 10,
            min_reviews: 10,
            verbose: false,
            extra_versions: vec![NamedVersion {
                version: "115.18.0".to_string(),
                name: "Old ESR".to_string(),
            }],
            crash_months: 6,
            crash_top_signatures: 10,
            crash_top_versions: 5,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NamedVersion {
    pub version: String,
    pub name: String,
}

impl ReportConfig {
    /// Load from `path`, or use the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ReportError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// `<root>/<YYYY-MM>/<report>` for the report month
pub fn output_dir(root: &Path, report_month: NaiveDate, report: &str) -> PathBuf {
    month_dir(root, report_month).join(report)
}

/// `<root>/<YYYY-MM>`, where raw data for the report month is cached
pub fn month_dir(root: &Path, report_month: NaiveDate) -> PathBuf {
    root.join(report_month.format("%Y-%m").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn report_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<ReportConfig>(json!({
            "historyYears": 3,
            "verbose": true
        }))
        .unwrap();

        assert_eq!(result.history_years, 3);
        assert!(result.verbose);
        assert_eq!(result.app, "thunderbird");
        assert_eq!(result.extra_versions, ReportConfig::default().extra_versions);
    }

    #[test]
    fn report_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<ReportConfig>(json!({
            "app": "seamonkey",
            "lang": "de",
            "historyYears": 5,
            "topCategories": 3,
            "topAddons": 7,
            "topReviewed": 4,
            "minReviews": 2,
            "verbose": true,
            "extraVersions": [{ "version": "102.15.1", "name": "Older ESR" }],
            "crashMonths": 2,
            "crashTopSignatures": 8,
            "crashTopVersions": 1,
            "logFile": "/tmp/tb-metrics.log"
        }))
        .unwrap();

        assert_eq!(
            result,
            ReportConfig {
                app: "seamonkey".to_string(),
                lang: "de".to_string(),
                history_years: 5,
                top_categories: 3,
                top_addons: 7,
                top_reviewed: 4,
                min_reviews: 2,
                verbose: true,
                extra_versions: vec![NamedVersion {
                    version: "102.15.1".to_string(),
                    name: "Older ESR".to_string(),
                }],
                crash_months: 2,
                crash_top_signatures: 8,
                crash_top_versions: 1,
                log_file: Some(PathBuf::from("/tmp/tb-metrics.log")),
            }
        );
    }

    #[test]
    fn load_without_path_returns_defaults() {
        assert_eq!(ReportConfig::load(None).unwrap(), ReportConfig::default());
    }

    #[test]
    fn load_reads_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "topAddons": 50 }"#).unwrap();

        let config = ReportConfig::load(Some(&path)).unwrap();

        assert_eq!(config.top_addons, 50);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ReportConfig::load(Some(&path)),
            Err(ReportError::Json(_))
        ));
    }

    #[test]
    fn output_dir_uses_report_month() {
        let month = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        assert_eq!(
            output_dir(Path::new("/out"), month, "addons"),
            PathBuf::from("/out/2024-09/addons")
        );
    }
}
