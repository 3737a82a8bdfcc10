use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{endpoint}' returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("'{endpoint}' returned a body that is not JSON: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Read access to the remote analytics service.
///
/// `query` is an ordered list of pairs rather than a map because some
/// endpoints take repeated keys (`hashtags[]`).
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, endpoint: &str, query: &[(String, String)]) -> ApiResult<Value>;
}
