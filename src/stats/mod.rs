//! Time-bucketed aggregation and rankings
//!
//! ```text
//! records ──▶ TimeBucketer::group_by ──▶ Aggregator::aggregate ──▶ results + stacked series
//!    │
//!    └──────▶ Ranker::top_n ──▶ leaderboards
//! ```
//!
//! Everything here is pure: callers pass fully materialized records plus the
//! functions that extract timestamps, categories and sort keys from them.

pub mod aggregate;
pub mod bucket;
pub mod counter;
pub mod rank;
pub mod ratio;

pub use aggregate::{Aggregation, AggregationResult, Aggregator, SeriesSource, StackedSeries};
pub use bucket::{Bucket, Granularity, Order, TimeBucketer, enumerate_buckets, report_window};
pub use counter::{Counter, duplicate_count};
pub use rank::{Direction, Ranker, top_n};
pub use ratio::{Share, UndefinedRatio};
