//! Monthly Markdown reports
//!
//! # Modules
//!
//! - [`markdown`]: Headings, paragraphs and aligned tables
//! - [`csv`]: CSV files written next to the reports
//! - [`addons`]: Add-on sections for one add-on kind
//! - [`crash`]: Weekly crash volume and top signatures
//!
//! The runners fetch through the source traits, so tests can drive them
//! with fixture data instead of the public APIs.

pub mod addons;
pub mod crash;
pub mod csv;
pub mod markdown;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::addons::data::RELEASE_VERSION_KEY;
use crate::addons::{AddonKind, AddonSource, load_addon_data, load_languages, target_versions};
use crate::cache::JsonCache;
use crate::config::{ReportConfig, month_dir, output_dir};
use crate::crash::CrashSource;
use crate::error::ReportError;
use crate::report::addons::AddonReport;
use crate::report::markdown::Markdown;
use crate::stats::report_window;
use crate::version::Version;

/// Build the add-on report for the month before `now`.
///
/// Raw data is cached under `<root>/<YYYY-MM>` and CSV files are written to
/// `<root>/<YYYY-MM>/addons`. Returns the Markdown text.
pub async fn addons_report<S: AddonSource + ?Sized>(
    source: &S,
    config: &ReportConfig,
    root: &Path,
    now: DateTime<Utc>,
) -> Result<String, ReportError> {
    let (report_month, _) = report_window(now, 1);
    let cache = JsonCache::new(month_dir(root, report_month));
    let dir = output_dir(root, report_month, "addons");
    std::fs::create_dir_all(&dir)?;
    info!("Writing add-on report files to {:?}", dir);

    let product_versions = source.fetch_product_versions().await?;
    let targets = target_versions(&product_versions, &config.extra_versions);
    let release = product_versions
        .get(RELEASE_VERSION_KEY)
        .and_then(Value::as_str)
        .and_then(|raw| {
            Version::parse(raw)
                .inspect_err(|e| warn!("Unparseable release version: {}", e))
                .ok()
        });
    let languages = load_languages(source, &cache).await?;

    let mut doc = Markdown::new();
    doc.heading(2, "🧩 Thunderbird Add-ons/ATN (addons.thunderbird.net)");
    for kind in AddonKind::ALL {
        let data = load_addon_data(source, &cache, kind).await?;
        AddonReport::new(&data, config, &targets, release.as_ref(), &languages, now)
            .render(&mut doc, &dir)?;
    }

    Ok(doc.finish())
}

/// Build the crash-stats report: weekly volume over the last
/// `crash_months` months up to `now`, and the top signatures since the
/// start of the previous month.
pub async fn crash_report<S: CrashSource + ?Sized>(
    source: &S,
    config: &ReportConfig,
    root: &Path,
    now: DateTime<Utc>,
) -> Result<String, ReportError> {
    let (report_month, _) = report_window(now, 1);
    let (history_start, _) = report_window(now, config.crash_months);
    let today = now.date_naive();
    let dir = output_dir(root, report_month, "crash_stats");
    std::fs::create_dir_all(&dir)?;

    let weeks = source.fetch_histogram(history_start, today).await?;
    let weekly = crash::weekly_crashes(&weeks, history_start, today);
    let signatures = source
        .fetch_signatures(crash::PRODUCT, report_month, today)
        .await?;

    let mut doc = Markdown::new();
    crash::render(&mut doc, &dir, config, &weekly, &signatures, report_month, now)?;
    Ok(doc.finish())
}
