//! JSON-over-HTTP client with retry on transient failures

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, RETRY_BACKOFF_MS, USER_AGENT};
use crate::error::SourceError;

/// Which failures are worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Only `502 Bad Gateway`
    BadGateway,
    /// Server errors, timeouts and connection failures
    Transient,
}

impl RetryPolicy {
    fn retries_status(&self, status: StatusCode) -> bool {
        match self {
            RetryPolicy::BadGateway => status == StatusCode::BAD_GATEWAY,
            RetryPolicy::Transient => status.is_server_error(),
        }
    }

    fn retries_error(&self, error: &reqwest::Error) -> bool {
        match self {
            RetryPolicy::BadGateway => false,
            RetryPolicy::Transient => error.is_timeout() || error.is_connect(),
        }
    }
}

pub struct HttpClient {
    client: reqwest::Client,
    max_retries: u32,
    policy: RetryPolicy,
    backoff: Duration,
}

impl HttpClient {
    pub fn new(max_retries: u32, policy: RetryPolicy) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;
        Ok(Self {
            client,
            max_retries,
            policy,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        })
    }

    /// Override the base delay between retries
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// GET `url` with `params` appended to the query string and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let parsed = if params.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, params)
        };
        let url = parsed.map_err(|e| SourceError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut attempt = 0;
        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);
            let result = self.client.get(url.clone()).send().await;

            let retry = match &result {
                Ok(response) => self.policy.retries_status(response.status()),
                Err(e) => self.policy.retries_error(e),
            };
            if retry && attempt < self.max_retries {
                let delay = self.backoff * 2u32.pow(attempt);
                warn!("Retrying {} in {:?}", url, delay);
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            let response = result?;
            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(SourceError::NotFound(url.to_string()));
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(SourceError::Unauthorized(url.to_string()));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!("{} returned status {}: {}", url, status, body);
                return Err(SourceError::InvalidResponse(format!(
                    "Unexpected status: {}",
                    status
                )));
            }

            return response.json().await.map_err(|e| {
                warn!("Failed to parse response from {}: {}", url, e);
                SourceError::InvalidResponse(e.to_string())
            });
        }
    }
}
