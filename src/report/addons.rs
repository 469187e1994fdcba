//! Monthly add-on report for addons.thunderbird.net
//!
//! One [`AddonReport`] renders the sections for a single add-on kind. Row
//! builders are public so callers can reuse the numbers without Markdown.

use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::Url;
use serde_json::Value;
use tracing::info;

use crate::addons::{Addon, AddonData, AddonKind, AddonVersion};
use crate::config::{ATN_BASE_URL, ReportConfig};
use crate::error::ReportError;
use crate::report::csv::write_table;
use crate::report::markdown::Markdown;
use crate::stats::{
    Aggregator, Bucket, Counter, Direction, Granularity, Order, Ranker, SeriesSource, Share,
    StackedSeries, TimeBucketer, duplicate_count, report_window, top_n,
};
use crate::version::{CompatibilityEvaluator, TargetVersion, Version, VersionEntry};

const SUMMARY_WIDTH: usize = 50;

/// Tag carried by every add-on that went through the WebExtension migration
const IGNORED_TAG: &str = "firefox57";

const RECENT_ADDITIONS_URL: &str = "https://thunderbird.github.io/webext-reports/recent-addition.html";
const RECENT_ACTIVITY_URL: &str = "https://thunderbird.github.io/webext-reports/recent-activity.html";
const ALL_EXTENSIONS_URL: &str = "https://thunderbird.github.io/webext-reports/all.html";

/// Monthly counts rendered as a table, a CSV file and a stacked series
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    pub rows: Vec<Vec<String>>,
    pub csv_header: Vec<String>,
    pub csv_rows: Vec<Vec<String>>,
    pub stacked: StackedSeries,
}

pub struct AddonReport<'a> {
    data: &'a AddonData,
    config: &'a ReportConfig,
    evaluator: CompatibilityEvaluator,
    targets: &'a [TargetVersion],
    /// Current release, used for the check marks in leaderboards
    release: Option<&'a Version>,
    languages: &'a Value,
    report_month: Bucket,
    history: TimeBucketer,
    compatible: Vec<&'a Addon>,
}

impl<'a> AddonReport<'a> {
    pub fn new(
        data: &'a AddonData,
        config: &'a ReportConfig,
        targets: &'a [TargetVersion],
        release: Option<&'a Version>,
        languages: &'a Value,
        now: DateTime<Utc>,
    ) -> Self {
        let (month_start, history_end) = report_window(now, 1);
        // Clamped to the earliest representable date for oversized histories
        let history_start = i32::try_from(config.history_years)
            .ok()
            .and_then(|years| month_start.year().checked_sub(years))
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .unwrap_or(NaiveDate::MIN);

        let evaluator = CompatibilityEvaluator::new(config.app.as_str());
        let compatible = data
            .addons
            .iter()
            .filter(|addon| {
                targets
                    .iter()
                    .any(|target| evaluator.is_compatible(&target.version, &addon.current_version))
            })
            .collect();

        Self {
            data,
            config,
            evaluator,
            targets,
            release,
            languages,
            report_month: Bucket::for_date(month_start, Granularity::Monthly),
            history: TimeBucketer::new(history_start, history_end, Granularity::Monthly),
            compatible,
        }
    }

    fn kind(&self) -> AddonKind {
        self.data.kind
    }

    fn addons(&self) -> &'a [Addon] {
        &self.data.addons
    }

    fn app(&self) -> &str {
        self.evaluator.app()
    }

    /// Add-ons whose current version supports at least one target version
    pub fn compatible(&self) -> &[&'a Addon] {
        &self.compatible
    }

    /// `Total Extensions: 12  (duplicate slugs: 1)`
    pub fn totals_heading(&self) -> String {
        let addons = self.addons();
        let duplicates = [
            ("ids", duplicate_count(addons, |a| a.id)),
            ("slugs", duplicate_count(addons, |a| a.slug.clone())),
            ("guids", duplicate_count(addons, |a| a.guid.clone())),
        ];
        let reported: Vec<String> = duplicates
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(key, count)| format!("duplicate {}: {}", key, count))
            .collect();

        let mut heading = format!("Total {}s: {}", self.kind().name(), addons.len());
        if !reported.is_empty() {
            heading.push_str(&format!("\t({})", reported.join(", ")));
        }
        heading
    }

    pub fn feature_rows(&self) -> Vec<Vec<String>> {
        let addons = self.addons();
        let features: [(&str, fn(&Addon) -> bool); 5] = [
            ("⚠️ Marked Experimental", |a| a.is_experimental),
            ("📜 Open Source", |a| a.is_source_public),
            ("❤️ Requests donations", Addon::requests_contributions),
            ("💲 Requires payment", |a| a.requires_payment),
            ("📈 Has public stats", |a| a.public_stats),
        ];
        features
            .into_iter()
            .map(|(label, predicate)| {
                vec![label.to_string(), Share::of(addons, predicate).to_string()]
            })
            .collect()
    }

    /// Per target version: add-ons whose latest version is compatible, and
    /// add-ons with any compatible version
    pub fn compatibility_rows(&self) -> Vec<Vec<String>> {
        let addons = self.addons();
        self.targets
            .iter()
            .map(|target| {
                let latest = Share::of(addons, |a| {
                    self.evaluator
                        .is_compatible(&target.version, &a.current_version)
                });
                let any = Share::of(addons, |a| {
                    self.evaluator.is_compatible_with_any(
                        &target.version,
                        &a.current_version,
                        self.data.history_of(a),
                    )
                });
                vec![
                    format!("Thunderbird {} ({})", target.name, target.raw),
                    latest.to_string(),
                    any.to_string(),
                ]
            })
            .collect()
    }

    pub fn total_compatible(&self) -> Share {
        Share::new(self.compatible.len() as u64, self.addons().len() as u64)
    }

    pub fn category_counts(&self) -> Counter<String> {
        self.addons()
            .iter()
            .flat_map(|a| a.categories_for(self.app()).iter().cloned())
            .collect()
    }

    pub fn tag_counts(&self) -> Counter<String> {
        self.addons()
            .iter()
            .flat_map(|a| a.tags.iter())
            .filter(|tag| tag.as_str() != IGNORED_TAG)
            .cloned()
            .collect()
    }

    /// Most common default locales with their English names
    pub fn locale_rows(&self) -> Vec<Vec<String>> {
        let counts: Counter<&str> = self
            .addons()
            .iter()
            .map(|a| a.default_locale.as_str())
            .collect();
        counts
            .most_common(self.config.top_categories)
            .into_iter()
            .map(|(locale, count)| {
                let name = self.languages[*locale]["English"].as_str().unwrap_or("");
                vec![count.to_string(), locale.to_string(), name.to_string()]
            })
            .collect()
    }

    /// Add-ons created per month, newest month first, with per-month categories
    pub fn monthly_created(&self) -> MonthlyTable {
        let app = self.app();
        let grouped = self
            .history
            .group_by(self.addons(), Order::Descending, |a| [a.created]);
        let aggregation = Aggregator::new(usize::MAX)
            .with_series("Created", SeriesSource::Total)
            .aggregate(&grouped, |a| a.categories_for(app).to_vec());

        let overall = self.category_counts();
        let mut csv_header = vec!["Date".to_string(), "Total Created".to_string()];
        csv_header.extend(overall.iter().map(|(category, _)| category.clone()));

        let mut rows = Vec::with_capacity(aggregation.results.len());
        let mut csv_rows = Vec::with_capacity(aggregation.results.len());
        for result in &aggregation.results {
            let label = result.bucket.label();
            let categories = result
                .by_category
                .iter()
                .map(|(category, count)| format!("{}: {}", category, count))
                .collect::<Vec<_>>()
                .join(", ");
            rows.push(vec![label.clone(), result.total.to_string(), categories]);

            let mut csv_row = vec![label, result.total.to_string()];
            csv_row.extend(overall.iter().map(|(category, _)| {
                result
                    .by_category
                    .iter()
                    .find(|(c, _)| c == category)
                    .map(|(_, count)| count.to_string())
                    .unwrap_or_default()
            }));
            csv_rows.push(csv_row);
        }

        MonthlyTable {
            rows,
            csv_header,
            csv_rows,
            stacked: aggregation.stacked,
        }
    }

    /// Version releases per month, newest month first.
    ///
    /// Every version of every add-on counts once, in the month its newest
    /// file was uploaded.
    pub fn monthly_updates(&self) -> MonthlyTable {
        let grouped = self
            .history
            .group_by(self.addons(), Order::Descending, |a| {
                self.data
                    .versions_of(a)
                    .iter()
                    .filter_map(AddonVersion::released)
                    .collect::<Vec<_>>()
            });
        let aggregation = Aggregator::<String>::new(0)
            .with_series("Updates", SeriesSource::Total)
            .aggregate(&grouped, |_| Vec::new());

        let rows: Vec<Vec<String>> = aggregation
            .results
            .iter()
            .map(|result| vec![result.bucket.label(), result.total.to_string()])
            .collect();

        MonthlyTable {
            csv_header: vec!["Date".to_string(), "Total Updates".to_string()],
            csv_rows: rows.clone(),
            rows,
            stacked: aggregation.stacked,
        }
    }

    /// Add-ons created in the report month, in listing order
    pub fn created_in_month(&self) -> Vec<&'a Addon> {
        self.addons()
            .iter()
            .filter(|a| Bucket::containing(a.created, Granularity::Monthly) == self.report_month)
            .collect()
    }

    /// Add-ons last updated in the report month, most recent first
    pub fn updated_in_month(&self) -> Vec<&'a Addon> {
        let updated = self
            .addons()
            .iter()
            .filter(|a| Bucket::containing(a.last_updated, Granularity::Monthly) == self.report_month);
        Ranker::by(
            |a: &Addon| Some(a.last_updated.timestamp() as f64),
            Direction::Descending,
        )
        .rank(updated)
    }

    fn listing_rows(&self, addons: &[&Addon], date: fn(&Addon) -> DateTime<Utc>) -> Vec<Vec<String>> {
        addons
            .iter()
            .enumerate()
            .map(|(i, a)| {
                vec![
                    (i + 1).to_string(),
                    date(a).format("%Y-%m-%d").to_string(),
                    badges(a),
                    a.name.clone(),
                    summary(a),
                    a.author_names(),
                    a.current_version.version.clone(),
                    listing_url(&a.url),
                ]
            })
            .collect()
    }

    /// `✔️ 115.0 - 128.*` when the current version supports the release
    pub fn compatibility_label(&self, addon: &Addon) -> String {
        let Some((min, max)) = addon.current_version.compatibility(self.app()) else {
            return "-".to_string();
        };
        match self.release {
            Some(release) => {
                let mark = if self.evaluator.is_compatible(release, &addon.current_version) {
                    "✔️"
                } else {
                    "❌"
                };
                format!("{} {} - {}", mark, min, max)
            }
            None => format!("{} - {}", min, max),
        }
    }

    fn usage_rows(&self, key: fn(&Addon) -> Option<u64>) -> Vec<Vec<String>> {
        top_n(
            self.compatible.iter().copied(),
            |a| key(a).map(|n| n as f64),
            self.config.top_addons,
        )
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                key(a).map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
                badges(a),
                a.name.clone(),
                a.author_names(),
                self.compatibility_label(a),
                listing_url(&a.url),
            ]
        })
        .collect()
    }

    pub fn daily_users_rows(&self) -> Vec<Vec<String>> {
        self.usage_rows(|a| a.average_daily_users)
    }

    pub fn weekly_downloads_rows(&self) -> Vec<Vec<String>> {
        self.usage_rows(|a| a.weekly_downloads)
    }

    pub fn review_rows(&self) -> Vec<Vec<String>> {
        top_n(
            self.compatible.iter().copied(),
            |a| Some(a.ratings.count as f64),
            self.config.top_reviewed,
        )
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.ratings.count.to_string(),
                a.ratings.bayesian_average.to_string(),
                badges(a),
                a.name.clone(),
                a.author_names(),
                self.compatibility_label(a),
                listing_url(&a.url),
            ]
        })
        .collect()
    }

    /// Best Bayesian ratings among add-ons with enough reviews; ties go to
    /// the add-on with more reviews
    pub fn rating_rows(&self) -> Vec<Vec<String>> {
        let min_reviews = self.config.min_reviews;
        let reviewed = self
            .compatible
            .iter()
            .copied()
            .filter(|a| a.ratings.count >= min_reviews);
        Ranker::by(
            |a: &Addon| Some(a.ratings.bayesian_average),
            Direction::Descending,
        )
        .then_by(|a: &Addon| Some(a.ratings.count as f64), Direction::Descending)
        .top_n(reviewed, self.config.top_reviewed)
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.ratings.bayesian_average.to_string(),
                a.ratings.count.to_string(),
                badges(a),
                a.name.clone(),
                a.author_names(),
                self.compatibility_label(a),
                listing_url(&a.url),
            ]
        })
        .collect()
    }

    pub fn featured_rows(&self) -> Vec<Vec<String>> {
        self.addons()
            .iter()
            .filter(|a| a.is_featured)
            .enumerate()
            .map(|(i, a)| {
                vec![
                    (i + 1).to_string(),
                    badges(a),
                    a.name.clone(),
                    summary(a),
                    a.author_names(),
                    a.current_version.version.clone(),
                    self.compatibility_label(a),
                    listing_url(&a.url),
                ]
            })
            .collect()
    }

    /// Append this kind's sections to `doc` and write its CSV files to `dir`
    pub fn render(&self, doc: &mut Markdown, dir: &Path) -> Result<(), ReportError> {
        let kind = self.kind();
        let name = kind.name();
        let is_extension = kind == AddonKind::Extension;
        let month = self.report_month.label();
        info!("Rendering {} report for {}", kind.as_str(), month);

        doc.heading(3, &format!("{}s", name));
        if let Some(as_of) = self.data.as_of {
            doc.paragraph(&format!("Data as of: {}", as_of.format("%Y-%m-%d %H:%M:%S%z")));
        }

        doc.heading(4, &self.totals_heading())
            .table(&["Type", "Count"], &self.feature_rows(), false);

        doc.heading(5, &format!("{}s compatible with recent Thunderbird versions", name))
            .table(
                &[
                    "Thunderbird Version",
                    "Latest Add-on Version Count",
                    "Any Add-on Version Count",
                ],
                &self.compatibility_rows(),
                false,
            )
            .paragraph(&format!("Total compatible: {}", self.total_compatible()));

        doc.heading(5, &format!("Top {} Categories", name)).table(
            &["Count", "Category"],
            &count_rows(&self.category_counts(), self.config.top_categories),
            false,
        );

        if self.config.verbose {
            doc.heading(5, &format!("Top {} Tags", name)).table(
                &["Count", "Tag"],
                &count_rows(&self.tag_counts(), self.config.top_categories),
                false,
            );
        }

        doc.heading(5, &format!("Top {} Default Locales", name))
            .table(&["Count", "Locale", "Name"], &self.locale_rows(), false);

        let created = self.monthly_created();
        write_table(
            &dir.join(format!("ATN_{}s_created.csv", kind.as_str())),
            &created.csv_header,
            &created.csv_rows,
        )?;
        doc.heading(4, &format!("Total {}s Created by Month", name))
            .table(&["Month", "Created", "Categories"], &created.rows, true);

        let updates = self.monthly_updates();
        write_table(
            &dir.join(format!("ATN_{}_updates.csv", kind.as_str())),
            &updates.csv_header,
            &updates.csv_rows,
        )?;
        doc.heading(4, &format!("Total {} Updates by Month", name))
            .table(&["Month", "Updates"], &updates.rows, true);

        doc.heading(4, &format!("{}s Created ({})", name, month)).table(
            &["#", "Created", "", "Name", "Summary", "Authors", "Version", "URL"],
            &self.listing_rows(&self.created_in_month(), |a| a.created),
            false,
        );
        if is_extension {
            doc.paragraph(&format!("Also see: {}", RECENT_ADDITIONS_URL));
        }

        doc.heading(4, &format!("{}s Updated ({})", name, month)).table(
            &["#", "Updated", "", "Name", "Summary", "Authors", "Version", "URL"],
            &self.listing_rows(&self.updated_in_month(), |a| a.last_updated),
            false,
        );
        if is_extension {
            doc.paragraph(&format!("Also see: {}", RECENT_ACTIVITY_URL));
        }

        doc.heading(4, &format!("Top {}s by Daily Users", name)).table(
            &["#", "Daily Users", "", "Name", "Authors", "Compatibility", "URL"],
            &self.daily_users_rows(),
            false,
        );
        if is_extension {
            doc.paragraph(&format!("See full list: {}", ALL_EXTENSIONS_URL));
        }

        if self.config.verbose {
            doc.heading(4, &format!("Top {}s by Weekly Downloads", name)).table(
                &["#", "Weekly Downloads", "", "Name", "Authors", "Compatibility", "URL"],
                &self.weekly_downloads_rows(),
                false,
            );
        }

        doc.heading(4, &format!("Top {}s by Total Reviews", name)).table(
            &["#", "Reviews", "Rating", "", "Name", "Authors", "Compatibility", "URL"],
            &self.review_rows(),
            false,
        );

        doc.heading(
            4,
            &format!(
                "Top {}s by Rating (Bayesian average, at least {} reviews)",
                name, self.config.min_reviews
            ),
        )
        .table(
            &["#", "Rating", "Reviews", "", "Name", "Authors", "Compatibility", "URL"],
            &self.rating_rows(),
            false,
        );

        doc.heading(4, &format!("Featured {}s", name))
            .table(
                &["#", "", "Name", "Summary", "Authors", "Version", "Compatibility", "URL"],
                &self.featured_rows(),
                false,
            )
            .paragraph(&format!(
                "Also see: {}{}/{}/",
                ATN_BASE_URL,
                self.app(),
                kind.listing_path()
            ));

        Ok(())
    }
}

/// `count, key` rows for the `k` most common keys
fn count_rows(counter: &Counter<String>, k: usize) -> Vec<Vec<String>> {
    counter
        .most_common(k)
        .into_iter()
        .map(|(key, count)| vec![count.to_string(), key.clone()])
        .collect()
}

/// Status emojis: disabled, experimental, open source, donations, paid, public stats
pub fn badges(addon: &Addon) -> String {
    [
        (addon.is_disabled, "⛔"),
        (addon.is_experimental, "⚠️"),
        (addon.is_source_public, "📜"),
        (addon.requests_contributions(), "❤️"),
        (addon.requires_payment, "💲"),
        (addon.public_stats, "📈"),
    ]
    .into_iter()
    .filter_map(|(set, badge)| set.then_some(badge))
    .collect()
}

fn summary(addon: &Addon) -> String {
    match addon.summary.as_deref() {
        Some(text) if !text.trim().is_empty() => shorten(text, SUMMARY_WIDTH),
        _ => "-".to_string(),
    }
}

/// Collapse whitespace and cut at a word boundary so the result, including
/// a trailing `…`, fits in `width` characters
pub fn shorten(text: &str, width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let mut shortened = String::new();
    let mut length = 0;
    for word in collapsed.split(' ') {
        let extra = word.chars().count() + usize::from(length > 0);
        if length + extra + 1 > width {
            break;
        }
        if length > 0 {
            shortened.push(' ');
        }
        shortened.push_str(word);
        length += extra;
    }
    shortened.push('…');
    shortened
}

/// Drop the `/en-US` locale prefix so links follow the reader's language
pub fn listing_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(path) = parsed.path().strip_prefix("/en-US").map(str::to_string) else {
        return url.to_string();
    };
    parsed.set_path(&path);
    parsed.to_string()
}
