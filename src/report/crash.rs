//! Crash-stats report: weekly crash volume and top signatures

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use tracing::info;

use crate::config::{CRASH_STATS_BASE_URL, ReportConfig};
use crate::crash::{HistogramWeek, Signature};
use crate::error::ReportError;
use crate::report::csv::write_table;
use crate::report::markdown::Markdown;
use crate::stats::{Bucket, Counter, Granularity, Order, StackedSeries, enumerate_buckets, top_n};
use crate::version::channel_label;

/// Products counted in the weekly histogram
pub const PRODUCTS: [&str; 2] = ["Thunderbird", "Firefox"];

/// Product whose signatures are ranked
pub const PRODUCT: &str = "Thunderbird";

/// Weekly crash counts per product, newest week first.
///
/// Every week of `[start, end)` is present; weeks the histogram does not
/// mention count zero.
pub fn weekly_crashes(weeks: &[HistogramWeek], start: NaiveDate, end: NaiveDate) -> StackedSeries {
    let buckets = enumerate_buckets(start, end, Granularity::Weekly, Order::Descending);
    let index: IndexMap<Bucket, usize> = buckets.iter().enumerate().map(|(i, b)| (*b, i)).collect();

    let mut series: IndexMap<String, Vec<u64>> = PRODUCTS
        .iter()
        .map(|product| (product.to_string(), vec![0; buckets.len()]))
        .collect();
    for week in weeks {
        let Some(&i) = index.get(&Bucket::containing(week.term, Granularity::Weekly)) else {
            continue;
        };
        for (product, counts) in series.iter_mut() {
            counts[i] += week.product_count(product);
        }
    }

    StackedSeries { buckets, series }
}

/// `128 ESR: 30, 130 Beta: 10` for the `k` busiest channels of a signature
pub fn version_summary(signature: &Signature, k: usize) -> String {
    let mut channels = Counter::new();
    for facet in &signature.facets.version {
        channels.add_n(channel_label(&facet.term), facet.count);
    }
    channels
        .most_common(k)
        .into_iter()
        .map(|(label, count)| format!("{}: {}", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rank, count, signature and busiest channels for the top signatures
pub fn signature_rows(signatures: &[Signature], n: usize, versions: usize) -> Vec<Vec<String>> {
    top_n(signatures, |s| Some(s.count as f64), n)
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            vec![
                (i + 1).to_string(),
                s.count.to_string(),
                s.term.clone(),
                version_summary(s, versions),
            ]
        })
        .collect()
}

/// Render the report and write `Crash Stats.csv` into `dir`
pub fn render(
    doc: &mut Markdown,
    dir: &Path,
    config: &ReportConfig,
    weekly: &StackedSeries,
    signatures: &[Signature],
    report_month: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), ReportError> {
    info!(
        "Rendering crash report: {} weeks, {} signatures",
        weekly.buckets.len(),
        signatures.len()
    );

    let mut csv_header = vec!["Date".to_string()];
    csv_header.extend(weekly.series.keys().cloned());
    let csv_rows: Vec<Vec<String>> = weekly
        .buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            std::iter::once(bucket.label())
                .chain(weekly.series.values().map(|counts| counts[i].to_string()))
                .collect()
        })
        .collect();
    write_table(&dir.join("Crash Stats.csv"), &csv_header, &csv_rows)?;

    doc.heading(2, "💥 Crash Stats (crash-stats.mozilla.org)")
        .paragraph(&format!("Data as of: {}", now.format("%Y-%m-%d %H:%M:%S%z")))
        .heading(
            3,
            &format!("{} Crashes by Week (past {} months)", PRODUCT, config.crash_months),
        )
        .table(
            &["Week", "Thunderbird Crashes", "Firefox Crashes"],
            &csv_rows,
            true,
        )
        .paragraph(&format!(
            "Please see {}search/?product={} for more information.",
            CRASH_STATS_BASE_URL, PRODUCT
        ));

    let month = Bucket::for_date(report_month, Granularity::Monthly).label();
    let versions_header = format!("{} Versions (top {})", PRODUCT, config.crash_top_versions);
    doc.heading(3, &format!("Top {} Crash Signatures ({})", PRODUCT, month))
        .table(
            &["#", "Crashes", "Signature", versions_header.as_str()],
            &signature_rows(
                signatures,
                config.crash_top_signatures,
                config.crash_top_versions,
            ),
            false,
        );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crash::Facet;
    use crate::crash::types::{ProductFacets, VersionFacets};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn facet(term: &str, count: u64) -> Facet {
        Facet {
            term: term.to_string(),
            count,
        }
    }

    fn week(y: i32, m: u32, d: u32, thunderbird: u64, firefox: u64) -> HistogramWeek {
        HistogramWeek {
            term: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
            count: thunderbird + firefox,
            facets: ProductFacets {
                product: vec![facet("Firefox", firefox), facet("Thunderbird", thunderbird)],
            },
        }
    }

    fn signature(term: &str, count: u64, versions: Vec<Facet>) -> Signature {
        Signature {
            term: term.to_string(),
            count,
            facets: VersionFacets { version: versions },
        }
    }

    #[test]
    fn weekly_crashes_fill_missing_weeks_with_zero() {
        // Mondays 2024-09-02, 09-09, 09-16; the histogram skips 09-09
        let weeks = vec![week(2024, 9, 2, 5, 50), week(2024, 9, 16, 7, 70)];

        let weekly = weekly_crashes(&weeks, date(2024, 9, 1), date(2024, 9, 20));

        let labels: Vec<String> = weekly.buckets.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["2024-09-16", "2024-09-09", "2024-09-02", "2024-08-26"]);
        assert_eq!(weekly.series["Thunderbird"], vec![7, 0, 5, 0]);
        assert_eq!(weekly.series["Firefox"], vec![70, 0, 50, 0]);
    }

    #[test]
    fn weekly_crashes_ignore_weeks_outside_window() {
        let weeks = vec![week(2023, 1, 2, 5, 50)];

        let weekly = weekly_crashes(&weeks, date(2024, 9, 2), date(2024, 9, 9));

        assert_eq!(weekly.series["Thunderbird"], vec![0]);
    }

    #[test]
    fn version_summary_merges_versions_by_channel() {
        let sig = signature(
            "OOM | small",
            60,
            vec![
                facet("128.2.0esr", 20),
                facet("130.0b1", 15),
                facet("128.1.0esr", 10),
                facet("131.0a1", 15),
            ],
        );

        assert_eq!(
            version_summary(&sig, 2),
            "128 ESR: 30, 130 Beta: 15"
        );
    }

    #[test]
    fn signature_rows_rank_by_count() {
        let signatures = vec![
            signature("a", 5, vec![]),
            signature("b", 9, vec![facet("129.0", 9)]),
            signature("c", 5, vec![]),
        ];

        let rows = signature_rows(&signatures, 2, 5);

        assert_eq!(rows[0], vec!["1", "9", "b", "129: 9"]);
        assert_eq!(rows[1], vec!["2", "5", "a", ""]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn render_writes_csv_and_tables() {
        let temp_dir = TempDir::new().unwrap();
        let weekly = weekly_crashes(&[week(2024, 9, 2, 5, 50)], date(2024, 9, 2), date(2024, 9, 9));
        let signatures = vec![signature("js::GC | crash", 3, vec![facet("128.2.0esr", 3)])];
        let now = Utc.with_ymd_and_hms(2024, 10, 3, 9, 0, 0).unwrap();
        let mut doc = Markdown::new();

        render(
            &mut doc,
            temp_dir.path(),
            &ReportConfig::default(),
            &weekly,
            &signatures,
            date(2024, 9, 1),
            now,
        )
        .unwrap();
        let text = doc.finish();

        let csv = std::fs::read_to_string(temp_dir.path().join("Crash Stats.csv")).unwrap();
        assert_eq!(csv, "Date,Thunderbird,Firefox\n2024-09-02,5,50\n");
        assert!(text.contains("### Top Thunderbird Crash Signatures (September 2024)"));
        assert!(text.contains(r"js::GC \| crash"));
        assert!(text.contains("Thunderbird Versions (top 5)"));
    }
}
