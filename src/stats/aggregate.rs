//! Per-bucket counts, category breakdowns and stacked chart series

use std::hash::Hash;

use indexmap::IndexMap;

use crate::stats::bucket::Bucket;
use crate::stats::counter::Counter;

/// Counts for one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationResult<C> {
    pub bucket: Bucket,
    /// Records assigned to the bucket
    pub total: u64,
    /// Most frequent categories, highest first.
    ///
    /// Records may carry several categories, so the sum can exceed `total`.
    pub by_category: Vec<(C, u64)>,
}

/// Where a stacked series takes its per-bucket value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesSource<C> {
    Total,
    Category(C),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series<C> {
    pub name: String,
    pub source: SeriesSource<C>,
}

/// Named per-bucket values ready to be drawn as stacked bars.
///
/// `buckets` and every value vector share the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackedSeries {
    pub buckets: Vec<Bucket>,
    pub series: IndexMap<String, Vec<u64>>,
}

impl StackedSeries {
    /// Bottom offset of each series in each bucket (sum of the series before it)
    pub fn baselines(&self) -> IndexMap<String, Vec<u64>> {
        let mut bottom = vec![0; self.buckets.len()];
        let mut baselines = IndexMap::new();
        for (name, values) in &self.series {
            baselines.insert(name.clone(), bottom.clone());
            for (acc, value) in bottom.iter_mut().zip(values) {
                *acc += value;
            }
        }
        baselines
    }

    /// Height of the whole stack in each bucket
    pub fn heights(&self) -> Vec<u64> {
        (0..self.buckets.len())
            .map(|i| self.series.values().map(|values| values[i]).sum())
            .collect()
    }

    /// Running sum of each series, accumulated from the oldest bucket onward
    pub fn cumulative(&self) -> IndexMap<String, Vec<u64>> {
        let mut chronological: Vec<usize> = (0..self.buckets.len()).collect();
        chronological.sort_by_key(|&i| self.buckets[i]);

        self.series
            .iter()
            .map(|(name, values)| {
                let mut running = vec![0; values.len()];
                let mut sum = 0;
                for &i in &chronological {
                    sum += values[i];
                    running[i] = sum;
                }
                (name.clone(), running)
            })
            .collect()
    }
}

/// Output of [`Aggregator::aggregate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation<C> {
    pub results: Vec<AggregationResult<C>>,
    pub stacked: StackedSeries,
}

/// Expand every grouped record into one `(bucket, category)` pair per category
pub fn fan_out<R, C, I, F>(grouped: &IndexMap<Bucket, Vec<&R>>, categorize: F) -> Vec<(Bucket, C)>
where
    F: Fn(&R) -> I,
    I: IntoIterator<Item = C>,
{
    let mut pairs = Vec::new();
    for (bucket, records) in grouped {
        for record in records {
            pairs.extend(categorize(record).into_iter().map(|c| (*bucket, c)));
        }
    }
    pairs
}

/// Builds per-bucket counts from records grouped by [`TimeBucketer::group_by`].
///
/// [`TimeBucketer::group_by`]: crate::stats::bucket::TimeBucketer::group_by
#[derive(Debug, Clone)]
pub struct Aggregator<C> {
    top_k: usize,
    series: Vec<Series<C>>,
}

impl<C: Hash + Eq + Clone> Aggregator<C> {
    /// Report at most `top_k` categories per bucket
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            series: Vec::new(),
        }
    }

    /// Add a stacked series; series stack in the order they are added.
    ///
    /// Reusing a name replaces that series' source and keeps its position.
    pub fn with_series(mut self, name: impl Into<String>, source: SeriesSource<C>) -> Self {
        let name = name.into();
        match self.series.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.source = source,
            None => self.series.push(Series { name, source }),
        }
        self
    }

    /// Aggregate grouped records.
    ///
    /// Results follow the order of `grouped`, one per bucket, including
    /// buckets without records.
    pub fn aggregate<R, I, F>(
        &self,
        grouped: &IndexMap<Bucket, Vec<&R>>,
        categorize: F,
    ) -> Aggregation<C>
    where
        F: Fn(&R) -> I,
        I: IntoIterator<Item = C>,
    {
        let mut counters: IndexMap<Bucket, Counter<C>> = grouped
            .keys()
            .map(|bucket| (*bucket, Counter::new()))
            .collect();
        for (bucket, category) in fan_out(grouped, categorize) {
            if let Some(counter) = counters.get_mut(&bucket) {
                counter.add(category);
            }
        }

        let mut stacked = StackedSeries {
            buckets: grouped.keys().copied().collect(),
            series: self
                .series
                .iter()
                .map(|s| (s.name.clone(), Vec::with_capacity(grouped.len())))
                .collect(),
        };

        let mut results = Vec::with_capacity(grouped.len());
        for ((bucket, records), counter) in grouped.iter().zip(counters.values()) {
            let total = records.len() as u64;

            for (series, values) in self.series.iter().zip(stacked.series.values_mut()) {
                values.push(match &series.source {
                    SeriesSource::Total => total,
                    SeriesSource::Category(c) => counter.get(c),
                });
            }

            results.push(AggregationResult {
                bucket: *bucket,
                total,
                by_category: counter
                    .most_common(self.top_k)
                    .into_iter()
                    .map(|(c, n)| (c.clone(), n))
                    .collect(),
            });
        }

        Aggregation { results, stacked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::bucket::{Granularity, Order, TimeBucketer};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    struct Item {
        created: DateTime<Utc>,
        categories: Vec<&'static str>,
    }

    fn item(y: i32, m: u32, categories: Vec<&'static str>) -> Item {
        Item {
            created: Utc.with_ymd_and_hms(y, m, 10, 0, 0, 0).unwrap(),
            categories,
        }
    }

    fn month(year: i32, month: u32) -> Bucket {
        Bucket::Month { year, month }
    }

    fn bucketer() -> TimeBucketer {
        TimeBucketer::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            Granularity::Monthly,
        )
    }

    fn items() -> Vec<Item> {
        vec![
            item(2024, 1, vec!["privacy", "tabs"]),
            item(2024, 1, vec!["tabs"]),
            item(2024, 1, vec![]),
            item(2024, 3, vec!["calendar", "privacy", "tabs"]),
            item(2023, 12, vec!["tabs"]),
        ]
    }

    #[test]
    fn aggregate_counts_totals_and_categories() {
        let items = items();
        let grouped = bucketer().group_by(&items, Order::Ascending, |i| [i.created]);

        let aggregation = Aggregator::new(10).aggregate(&grouped, |i| i.categories.clone());

        assert_eq!(
            aggregation.results,
            vec![
                AggregationResult {
                    bucket: month(2024, 1),
                    total: 3,
                    by_category: vec![("tabs", 2), ("privacy", 1)],
                },
                AggregationResult {
                    bucket: month(2024, 2),
                    total: 0,
                    by_category: vec![],
                },
                AggregationResult {
                    bucket: month(2024, 3),
                    total: 1,
                    by_category: vec![("calendar", 1), ("privacy", 1), ("tabs", 1)],
                },
            ]
        );

        // Multi-category records make the breakdown exceed the total
        let march = &aggregation.results[2];
        let breakdown: u64 = march.by_category.iter().map(|(_, n)| n).sum();
        assert!(breakdown > march.total);
    }

    #[test]
    fn aggregate_truncates_to_top_k() {
        let items = items();
        let grouped = bucketer().group_by(&items, Order::Ascending, |i| [i.created]);

        let aggregation = Aggregator::new(1).aggregate(&grouped, |i| i.categories.clone());

        assert_eq!(aggregation.results[0].by_category, vec![("tabs", 2)]);
        assert_eq!(aggregation.results[2].by_category, vec![("calendar", 1)]);
    }

    #[test]
    fn aggregate_builds_stacked_series_in_bucket_order() {
        let items = items();
        let grouped = bucketer().group_by(&items, Order::Descending, |i| [i.created]);

        let aggregation = Aggregator::new(10)
            .with_series("Total", SeriesSource::Total)
            .with_series("Tabs", SeriesSource::Category("tabs"))
            .aggregate(&grouped, |i| i.categories.clone());
        let stacked = &aggregation.stacked;

        assert_eq!(
            stacked.buckets,
            vec![month(2024, 3), month(2024, 2), month(2024, 1)]
        );
        assert_eq!(stacked.series["Total"], vec![1, 0, 3]);
        assert_eq!(stacked.series["Tabs"], vec![1, 0, 2]);
        assert_eq!(stacked.heights(), vec![2, 0, 5]);
        assert_eq!(stacked.baselines()["Tabs"], vec![1, 0, 3]);
        assert_eq!(stacked.baselines()["Total"], vec![0, 0, 0]);
        // Running sums accumulate from January even though buckets are newest first
        assert_eq!(stacked.cumulative()["Total"], vec![4, 3, 3]);
    }

    #[test]
    fn series_with_same_name_replaces_earlier_source() {
        let items = items();
        let grouped = bucketer().group_by(&items, Order::Ascending, |i| [i.created]);

        let aggregation = Aggregator::new(10)
            .with_series("X", SeriesSource::Total)
            .with_series("Privacy", SeriesSource::Category("privacy"))
            .with_series("X", SeriesSource::Category("tabs"))
            .aggregate(&grouped, |i| i.categories.clone());
        let stacked = &aggregation.stacked;

        assert_eq!(
            stacked.series.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["X", "Privacy"]
        );
        assert_eq!(stacked.series["X"], vec![2, 0, 1]);
        assert_eq!(stacked.series["Privacy"], vec![1, 0, 1]);
    }

    #[test]
    fn fan_out_emits_one_pair_per_category() {
        let items = items();
        let grouped = bucketer().group_by(&items, Order::Ascending, |i| [i.created]);

        let pairs = fan_out(&grouped, |i| i.categories.clone());

        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], (month(2024, 1), "privacy"));
    }
}
