//! crash-stats.mozilla.org SuperSearch client

use chrono::NaiveDate;

use crate::config::{CRASH_STATS_API_URL, CRASH_STATS_MAX_RETRIES};
use crate::crash::types::{HistogramResponse, HistogramWeek, Signature, SignatureResponse};
use crate::error::SourceError;
use crate::http::{HttpClient, RetryPolicy};

/// Fetches crash aggregations
#[async_trait::async_trait]
pub trait CrashSource: Send + Sync {
    /// Weekly crash counts per product for `[start, end)`, oldest first
    async fn fetch_histogram(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistogramWeek>, SourceError>;

    /// Most frequent signatures of `product` in `[start, end)` with version facets
    async fn fetch_signatures(
        &self,
        product: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Signature>, SourceError>;
}

pub struct CrashStatsClient {
    http: HttpClient,
    api_url: String,
}

impl CrashStatsClient {
    pub fn new(http: HttpClient, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
        }
    }

    pub fn public() -> Result<Self, SourceError> {
        let http = HttpClient::new(CRASH_STATS_MAX_RETRIES, RetryPolicy::Transient)?;
        Ok(Self::new(http, CRASH_STATS_API_URL))
    }

    fn search_url(&self) -> String {
        format!("{}SuperSearch/", self.api_url)
    }
}

fn date_range(start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 2] {
    [
        ("date", format!(">={}", start.format("%Y-%m-%d"))),
        ("date", format!("<{}", end.format("%Y-%m-%d"))),
    ]
}

#[async_trait::async_trait]
impl CrashSource for CrashStatsClient {
    async fn fetch_histogram(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistogramWeek>, SourceError> {
        let mut params = date_range(start, end).to_vec();
        params.extend([
            ("_results_number", "0".to_string()),
            ("_histogram.date", "product".to_string()),
            ("_histogram_interval.date", "1w".to_string()),
        ]);

        let response: HistogramResponse = self.http.get_json(&self.search_url(), &params).await?;
        Ok(response.facets.histogram_date)
    }

    async fn fetch_signatures(
        &self,
        product: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Signature>, SourceError> {
        let mut params = vec![("product", product.to_string())];
        params.extend(date_range(start, end));
        params.extend([
            ("_results_number", "0".to_string()),
            ("_aggs.signature", "version".to_string()),
        ]);

        let response: SignatureResponse = self.http.get_json(&self.search_url(), &params).await?;
        Ok(response.facets.signature)
    }
}
