use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::counts::MAX_CHUNK_SECONDS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root of the remote analytics API, without a trailing slash
    pub base_url: String,
    pub access_token: String,
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on requests in flight through one client
    #[serde(default = "ApiConfig::default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_max_chunk_seconds")]
    pub max_chunk_seconds: i64,
}

impl ApiConfig {
    const fn default_timeout_secs() -> u64 {
        30
    }

    const fn default_max_concurrent_requests() -> usize {
        4
    }
}

impl EngineConfig {
    const fn default_max_chunk_seconds() -> i64 {
        MAX_CHUNK_SECONDS
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chunk_seconds: Self::default_max_chunk_seconds(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "https://graph.facebook.com/v2.5".to_string())
            .trim_end_matches('/')
            .to_string();

        let access_token =
            std::env::var("API_ACCESS_TOKEN").context("API_ACCESS_TOKEN must be set")?;

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(ApiConfig::default_timeout_secs);

        let max_concurrent_requests = match std::env::var("MAX_CONCURRENT_REQUESTS") {
            Ok(v) => v
                .parse::<usize>()
                .context("MAX_CONCURRENT_REQUESTS must be a positive integer")?,
            Err(_) => ApiConfig::default_max_concurrent_requests(),
        };
        if max_concurrent_requests == 0 {
            tracing::warn!("MAX_CONCURRENT_REQUESTS=0 is not usable, falling back to 1");
        }

        let max_chunk_seconds = match std::env::var("MAX_CHUNK_SECONDS") {
            Ok(v) => v
                .parse::<i64>()
                .context("MAX_CHUNK_SECONDS must be an integer number of seconds")?,
            Err(_) => EngineConfig::default_max_chunk_seconds(),
        };
        if max_chunk_seconds > MAX_CHUNK_SECONDS {
            tracing::warn!(
                "MAX_CHUNK_SECONDS={max_chunk_seconds} exceeds the API limit of {MAX_CHUNK_SECONDS}s, requests may be rejected"
            );
        }

        Ok(Config {
            api: ApiConfig {
                base_url,
                access_token,
                request_timeout_secs,
                max_concurrent_requests: max_concurrent_requests.max(1),
            },
            engine: EngineConfig {
                max_chunk_seconds: max_chunk_seconds.max(1),
            },
        })
    }
}
