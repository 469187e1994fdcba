//! addons.thunderbird.net (ATN) API client

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::addons::source::AddonSource;
use crate::addons::types::AddonKind;
use crate::config::{ATN_API_URL, ATN_MAX_RETRIES, PAGE_SIZE, PRODUCT_DETAILS_URL};
use crate::error::SourceError;
use crate::http::{HttpClient, RetryPolicy};

/// One page of a paginated ATN listing
#[derive(Debug, Deserialize)]
struct Page {
    results: Vec<Value>,
    next: Option<String>,
}

pub struct AtnClient {
    http: HttpClient,
    api_url: String,
    product_details_url: String,
    app: String,
    lang: String,
}

impl AtnClient {
    /// Creates a client against custom base URLs (both ending in `/`)
    pub fn new(
        http: HttpClient,
        api_url: &str,
        product_details_url: &str,
        app: &str,
        lang: &str,
    ) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            product_details_url: product_details_url.to_string(),
            app: app.to_string(),
            lang: lang.to_string(),
        }
    }

    /// Client for the public ATN and product-details endpoints
    pub fn public(app: &str, lang: &str) -> Result<Self, SourceError> {
        let http = HttpClient::new(ATN_MAX_RETRIES, RetryPolicy::BadGateway)?;
        Ok(Self::new(http, ATN_API_URL, PRODUCT_DETAILS_URL, app, lang))
    }

    /// Append every page of `url` to `results`, following `next` links
    async fn walk_pages(
        &self,
        url: &str,
        params: &[(&str, String)],
        results: &mut Vec<Value>,
    ) -> Result<(), SourceError> {
        let mut page = 1u32;
        loop {
            info!("Page {} ({} records)", page, results.len());

            let mut page_params = params.to_vec();
            page_params.push(("page_size", PAGE_SIZE.to_string()));
            page_params.push(("page", page.to_string()));

            let data: Page = self.http.get_json(url, &page_params).await?;
            results.extend(data.results);

            if data.next.is_none() {
                return Ok(());
            }
            page += 1;
        }
    }
}

#[async_trait::async_trait]
impl AddonSource for AtnClient {
    async fn fetch_addons(&self, kind: AddonKind) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}addons/search/", self.api_url);
        let params = [
            ("app", self.app.clone()),
            ("type", kind.as_str().to_string()),
            ("lang", self.lang.clone()),
            ("sort", "created".to_string()),
        ];

        let mut addons = Vec::new();
        self.walk_pages(&url, &params, &mut addons).await?;
        Ok(addons)
    }

    async fn fetch_addon_versions(&self, addon_id: u64) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}addons/addon/{}/versions/", self.api_url, addon_id);
        let params = [("lang", self.lang.clone())];

        let mut versions = Vec::new();
        match self.walk_pages(&url, &params, &mut versions).await {
            Ok(()) => Ok(versions),
            Err(e @ (SourceError::NotFound(_) | SourceError::Unauthorized(_))) => {
                warn!("Version listing for add-on {} unavailable: {}", addon_id, e);
                Ok(versions)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_product_versions(&self) -> Result<IndexMap<String, Value>, SourceError> {
        let url = format!("{}thunderbird_versions.json", self.product_details_url);
        self.http.get_json(&url, &[]).await
    }

    async fn fetch_languages(&self) -> Result<Value, SourceError> {
        let url = format!("{}languages.json", self.product_details_url);
        self.http.get_json(&url, &[]).await
    }
}
