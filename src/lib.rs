//! Thunderbird add-on and crash statistics
//!
//! - [`version`]: Version grammar and compatibility ranges
//! - [`stats`]: Time buckets, aggregation and rankings
//! - [`addons`], [`crash`]: Data sources for the two reports
//! - [`report`]: Markdown and CSV rendering

pub mod addons;
pub mod cache;
pub mod config;
pub mod crash;
pub mod error;
pub mod http;
pub mod logging;
pub mod report;
pub mod stats;
pub mod version;
