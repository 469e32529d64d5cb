//! HTTP client for the combination oracle

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::Oracle;
use crate::types::OracleResponse;

/// Oracle reached over HTTP: `GET <endpoint>?first=<a>&second=<b>` returning JSON
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpOracle {
    pub fn new(endpoint: &str, timeout: Duration) -> GeneratorResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| GeneratorError::config(format!("Invalid oracle URL '{endpoint}': {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("recipe-generator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeneratorError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &GeneratorConfig) -> GeneratorResult<Self> {
        Self::new(&config.oracle_url, config.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint with the pair appended as URL-encoded query parameters
    pub fn pair_url(&self, first: &str, second: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("first", first)
            .append_pair("second", second);
        url
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn combine(&self, first: &str, second: &str) -> GeneratorResult<OracleResponse> {
        let response = self
            .client
            .get(self.pair_url(first, second))
            .send()
            .await
            .map_err(|e| GeneratorError::oracle_unreachable(first, second, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::oracle_unreachable(first, second, format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GeneratorError::oracle_unreachable(first, second, e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| GeneratorError::oracle_malformed(first, second, e.to_string()))
    }
}
