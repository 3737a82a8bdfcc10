use std::sync::Arc;

use tracing::info;

use crate::client::{ApiClient, ApiResult};
use crate::config::EngineConfig;
use crate::counts::classify::classify;
use crate::counts::window::{Clock, SystemClock, TimeWindow};
use crate::counts::topic::TopicBatch;
use crate::counts::{hashtag, topic, MAX_CHUNK_SECONDS};
use crate::models::{CountOptions, CountRecord};

/// Entry point for mention counts over topics and hashtags.
///
/// Requests are issued one at a time; a client error aborts the whole call.
#[derive(Clone)]
pub struct CountEngine {
    client: Arc<dyn ApiClient>,
    clock: Arc<dyn Clock>,
    max_chunk_seconds: i64,
}

impl CountEngine {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self {
            client,
            clock: Arc::new(SystemClock),
            max_chunk_seconds: MAX_CHUNK_SECONDS,
        }
    }

    pub fn from_config(client: Arc<dyn ApiClient>, config: &EngineConfig) -> Self {
        Self::new(client).with_max_chunk_seconds(config.max_chunk_seconds)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_max_chunk_seconds(mut self, max_chunk_seconds: i64) -> Self {
        self.max_chunk_seconds = max_chunk_seconds.max(1);
        self
    }

    /// Counts for a mix of hashtags and topic ids; hashtag records come first.
    pub async fn topic_counts(
        &self,
        ids: &[String],
        options: &CountOptions,
    ) -> ApiResult<Vec<CountRecord>> {
        let (hashtags, topics) = classify(ids);

        let mut records = self.hashtag_counts(&hashtags, options).await?;
        let hashtag_requests = usize::from(!hashtags.is_empty());
        let batch = self.fetch_topics(&topics, options).await?;
        records.extend(batch.records);

        info!(
            "Counted {} of {} requested identifiers ({} hashtags, {} topics) with {} requests",
            records.len(),
            ids.len(),
            hashtags.len(),
            topics.len(),
            hashtag_requests + batch.requests
        );
        Ok(records)
    }

    pub async fn topic_insights(
        &self,
        topic_ids: &[String],
        options: &CountOptions,
    ) -> ApiResult<Vec<CountRecord>> {
        let batch = self.fetch_topics(topic_ids, options).await?;
        Ok(batch.records)
    }

    async fn fetch_topics(
        &self,
        topic_ids: &[String],
        options: &CountOptions,
    ) -> ApiResult<TopicBatch> {
        if topic_ids.is_empty() {
            return Ok(TopicBatch::default());
        }

        let window = TimeWindow::from_options(options, self.clock.now());
        info!(
            "Fetching topic insights for {} topics over [{}, {}]",
            topic_ids.len(),
            window.since,
            window.until
        );

        topic::topic_insights(
            self.client.as_ref(),
            topic_ids,
            window,
            &options.breakdown_by,
            self.max_chunk_seconds,
        )
        .await
    }

    pub async fn hashtag_counts(
        &self,
        hashtags: &[String],
        options: &CountOptions,
    ) -> ApiResult<Vec<CountRecord>> {
        hashtag::hashtag_counts(self.client.as_ref(), hashtags, options).await
    }
}
