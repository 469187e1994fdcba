//! Crash-stats SuperSearch response shapes

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A term and its count within an aggregation
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Facet {
    pub term: String,
    pub count: u64,
}

/// One week of the crash histogram, broken down by product
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistogramWeek {
    pub term: DateTime<Utc>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub facets: ProductFacets,
}

impl HistogramWeek {
    pub fn product_count(&self, product: &str) -> u64 {
        self.facets
            .product
            .iter()
            .find(|facet| facet.term == product)
            .map_or(0, |facet| facet.count)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProductFacets {
    #[serde(default)]
    pub product: Vec<Facet>,
}

/// A crash signature with its per-version counts
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Signature {
    pub term: String,
    pub count: u64,
    #[serde(default)]
    pub facets: VersionFacets,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct VersionFacets {
    #[serde(default)]
    pub version: Vec<Facet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistogramResponse {
    pub facets: HistogramFacets,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistogramFacets {
    #[serde(default)]
    pub histogram_date: Vec<HistogramWeek>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignatureResponse {
    pub facets: SignatureFacets,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignatureFacets {
    #[serde(default)]
    pub signature: Vec<Signature>,
}
