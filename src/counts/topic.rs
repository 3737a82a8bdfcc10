//! Chunked topic insight queries and their aggregation.

use serde_json::Value;
use tracing::debug;

use crate::client::{ApiClient, ApiResult};
use crate::counts::breakdown::{BreakdownAggregator, Observation};
use crate::counts::response::{count_of, documents, str_at};
use crate::counts::window::{Chunk, TimeWindow};
use crate::models::CountRecord;

pub const TOPIC_INSIGHTS_ENDPOINT: &str = "topic_insights";

/// The `fields` expression for one chunk, e.g.
/// `topics,mentions.breakdown_by(gender,age_range).since(0).until(21600)`.
pub fn fields_expression(breakdown_by: &[String], chunk: &Chunk) -> String {
    let breakdown = if breakdown_by.is_empty() {
        String::new()
    } else {
        format!(".breakdown_by({})", breakdown_by.join(","))
    };

    format!(
        "topics,mentions{breakdown}.since({}).until({})",
        chunk.since, chunk.until
    )
}

pub fn topic_query(topic_id: &str, breakdown_by: &[String], chunk: &Chunk) -> Vec<(String, String)> {
    vec![
        ("contains_all[]".to_string(), topic_id.to_string()),
        ("fields".to_string(), fields_expression(breakdown_by, chunk)),
    ]
}

/// Running state for one topic across all of its chunks
#[derive(Debug, Default)]
struct TopicAccumulator {
    name: Option<String>,
    documents_with_data: usize,
    aggregator: BreakdownAggregator,
}

impl TopicAccumulator {
    /// Folds one chunk response. Documents without mention data are skipped;
    /// within a document, entries without a usable count are skipped.
    fn fold_response(&mut self, body: &Value, breakdown_by: &[String]) {
        for document in documents(body) {
            if self.name.is_none() {
                self.name = str_at(document, "/topics/data/0/name").map(str::to_string);
            }

            let Some((totals, entries)) = document
                .pointer("/mentions/data")
                .and_then(Value::as_array)
                .and_then(|mentions| mentions.split_first())
            else {
                debug!("Skipping document without mention data");
                continue;
            };
            self.documents_with_data += 1;

            match count_of(totals) {
                Some(count) => self.aggregator.add_total(count),
                None => debug!("Chunk total is missing or malformed"),
            }

            if breakdown_by.is_empty() {
                continue;
            }
            for entry in entries {
                match Observation::from_entry(entry, breakdown_by) {
                    Some(observation) => self.aggregator.accumulate(observation),
                    None => debug!("Skipping breakdown entry without a count: {entry}"),
                }
            }
        }
    }

    fn into_record(self, topic_id: &str, breakdown_by: &[String]) -> Option<CountRecord> {
        if self.documents_with_data == 0 {
            return None;
        }

        let name = self.name.unwrap_or_else(|| topic_id.to_string());
        let (count, breakdown) = self.aggregator.finalize(breakdown_by);

        Some(CountRecord {
            query: topic_id.to_string(),
            name,
            count,
            breakdown,
        })
    }
}

/// Records produced for a batch of topics and the requests it took
#[derive(Debug, Default)]
pub struct TopicBatch {
    pub records: Vec<CountRecord>,
    pub requests: usize,
}

/// Aggregated record for one topic, or `None` when no chunk carried data,
/// along with the number of chunk requests issued.
pub async fn topic_record(
    client: &dyn ApiClient,
    topic_id: &str,
    window: TimeWindow,
    breakdown_by: &[String],
    max_chunk_seconds: i64,
) -> ApiResult<(Option<CountRecord>, usize)> {
    let mut accumulator = TopicAccumulator::default();
    let mut requests = 0;

    for chunk in window.chunks(max_chunk_seconds) {
        debug!(
            "Requesting topic {topic_id} mentions for [{}, {}]",
            chunk.since, chunk.until
        );
        let body = client
            .get(
                TOPIC_INSIGHTS_ENDPOINT,
                &topic_query(topic_id, breakdown_by, &chunk),
            )
            .await?;
        requests += 1;
        accumulator.fold_response(&body, breakdown_by);
    }

    Ok((accumulator.into_record(topic_id, breakdown_by), requests))
}

/// One record per topic with data, in input order.
pub async fn topic_insights(
    client: &dyn ApiClient,
    topic_ids: &[String],
    window: TimeWindow,
    breakdown_by: &[String],
    max_chunk_seconds: i64,
) -> ApiResult<TopicBatch> {
    let mut batch = TopicBatch {
        records: Vec::with_capacity(topic_ids.len()),
        requests: 0,
    };

    for topic_id in topic_ids {
        let (record, requests) =
            topic_record(client, topic_id, window, breakdown_by, max_chunk_seconds).await?;
        batch.requests += requests;
        match record {
            Some(record) => batch.records.push(record),
            None => debug!("No mention data for topic {topic_id}"),
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every request with one mention and counts the calls
    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ApiClient for CountingClient {
        async fn get(&self, _endpoint: &str, _query: &[(String, String)]) -> ApiResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!([{"mentions": {"data": [{"count": "1"}]}}]))
        }
    }

    fn dims(dimensions: &[&str]) -> Vec<String> {
        dimensions.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn fields_expression_includes_breakdown_only_when_requested() {
        let chunk = Chunk { since: 0, until: 21_600 };
        assert_eq!(
            fields_expression(&[], &chunk),
            "topics,mentions.since(0).until(21600)"
        );
        assert_eq!(
            fields_expression(&dims(&["gender", "age_range"]), &chunk),
            "topics,mentions.breakdown_by(gender,age_range).since(0).until(21600)"
        );
    }

    #[test]
    fn topic_query_filters_on_the_topic() {
        let query = topic_query("123456", &[], &Chunk { since: 1, until: 2 });
        assert_eq!(query[0], ("contains_all[]".to_string(), "123456".to_string()));
        assert_eq!(query[1].0, "fields");
    }

    #[test]
    fn first_mention_entry_is_the_total() {
        let breakdown_by = dims(&["gender"]);
        let mut accumulator = TopicAccumulator::default();
        accumulator.fold_response(
            &json!([{
                "topics": {"data": [{"name": "Baseball", "id": "123456"}]},
                "mentions": {"data": [
                    {"count": "13"},
                    {"gender": "male", "count": "10"},
                    {"gender": "female", "count": "3"}
                ]}
            }]),
            &breakdown_by,
        );

        let record = accumulator.into_record("123456", &breakdown_by).unwrap();
        assert_eq!(record.name, "Baseball");
        assert_eq!(record.count, 13);
        assert_eq!(record.breakdown.len(), 2);
        assert_eq!(record.breakdown[0].get("gender"), Some("male"));
    }

    #[test]
    fn missing_fields_skip_only_their_contribution() {
        let breakdown_by = dims(&["gender"]);
        let mut accumulator = TopicAccumulator::default();
        accumulator.fold_response(
            &json!([{
                "mentions": {"data": [
                    {"total": "13"},
                    {"gender": "male"},
                    {"gender": "female", "count": "3"}
                ]}
            }]),
            &breakdown_by,
        );

        let record = accumulator.into_record("42", &breakdown_by).unwrap();
        assert_eq!(record.name, "42");
        assert_eq!(record.count, 0);
        assert_eq!(record.breakdown.len(), 1);
        assert_eq!(record.breakdown[0].count, 3);
    }

    #[test]
    fn no_mention_data_means_no_record() {
        let mut accumulator = TopicAccumulator::default();
        accumulator.fold_response(&json!([{"topics": {"data": []}}]), &[]);
        accumulator.fold_response(&json!({}), &[]);
        accumulator.fold_response(&json!(null), &[]);

        assert!(accumulator.into_record("42", &[]).is_none());
    }

    #[test]
    fn empty_mention_data_is_no_data() {
        let mut accumulator = TopicAccumulator::default();
        accumulator.fold_response(&json!([{"mentions": {"data": []}}]), &[]);

        assert!(accumulator.into_record("42", &[]).is_none());
    }

    #[test]
    fn breakdown_entries_ignored_without_requested_dimensions() {
        let mut accumulator = TopicAccumulator::default();
        accumulator.fold_response(
            &json!([{"mentions": {"data": [{"count": "5"}, {"gender": "male", "count": "5"}]}}]),
            &[],
        );

        let record = accumulator.into_record("42", &[]).unwrap();
        assert_eq!(record.count, 5);
        assert!(record.breakdown.is_empty());
    }

    #[tokio::test]
    async fn batch_reports_requests_issued() {
        let client = CountingClient::default();
        let topics = vec!["1".to_string(), "2".to_string()];

        let batch = topic_insights(&client, &topics, TimeWindow::new(0, 50_000), &[], 21_600)
            .await
            .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.requests, 6);
        assert_eq!(batch.requests, client.calls.load(Ordering::SeqCst));

        let batch = topic_insights(&client, &topics, TimeWindow::new(10, 10), &[], 21_600)
            .await
            .unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(batch.requests, 0);
    }
}
