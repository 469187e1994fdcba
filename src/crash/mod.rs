//! Crash statistics from crash-stats.mozilla.org

pub mod client;
pub mod types;

pub use client::{CrashSource, CrashStatsClient};
pub use types::{Facet, HistogramWeek, Signature};
