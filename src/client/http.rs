use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::client::{ApiClient, ApiError, ApiResult};
use crate::config::ApiConfig;

/// Reqwest-backed client for the remote analytics API.
///
/// Every request passes through a semaphore so callers sharing one client
/// never exceed `max_concurrent_requests` requests in flight. Transport
/// errors are stripped of their URL since it carries the access token.
#[derive(Clone)]
pub struct HttpApiClient {
    base_url: String,
    access_token: String,
    client: Client,
    permits: Arc<Semaphore>,
}

impl HttpApiClient {
    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("mention-counts/0.1.0")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client for the analytics API")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            client,
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get(&self, endpoint: &str, query: &[(String, String)]) -> ApiResult<Value> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| anyhow!("request limiter was closed"))?;

        let url = self.endpoint_url(endpoint);
        debug!("GET {url} with {} query parameters", query.len());

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source: source.without_url(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source: source.without_url(),
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
