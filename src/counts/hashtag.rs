//! Hashtag counts: one unchunked request, reconciled back to caller spellings.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ApiClient, ApiResult};
use crate::counts::response::{count_of, documents, str_at};
use crate::models::{CountOptions, CountRecord};

pub const HASHTAG_COUNTS_ENDPOINT: &str = "hashtag_counts";

/// Comparison key of a hashtag: leading `#` stripped, lowercased.
pub fn normalize(hashtag: &str) -> String {
    hashtag.strip_prefix('#').unwrap_or(hashtag).to_lowercase()
}

/// Normalized hashtag -> the spelling the caller asked for.
///
/// When two requested spellings normalize identically the first one wins:
/// every spelling is still sent, but results are reported under the first.
#[derive(Debug, Default)]
pub struct Reconciliation {
    originals: HashMap<String, String>,
}

impl Reconciliation {
    pub fn new(hashtags: &[String]) -> Self {
        let mut reconciliation = Self::default();

        for hashtag in hashtags {
            let key = normalize(hashtag);
            match reconciliation.originals.get(&key) {
                Some(existing) if existing != hashtag => warn!(
                    "Hashtag '{hashtag}' collides with '{existing}' after normalization, keeping '{existing}'"
                ),
                Some(_) => {}
                None => {
                    reconciliation.originals.insert(key, hashtag.clone());
                }
            }
        }

        reconciliation
    }

    /// Caller spelling for a name returned by the API
    pub fn original(&self, returned_name: &str) -> Option<&str> {
        self.originals
            .get(&normalize(returned_name))
            .map(String::as_str)
    }
}

pub fn hashtag_query(requested: &[String], options: &CountOptions) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = requested
        .iter()
        .map(|tag| ("hashtags[]".to_string(), tag.clone()))
        .collect();

    if let Some(since) = options.mentions_since {
        query.push(("since".to_string(), since.timestamp().to_string()));
    }
    if let Some(until) = options.mentions_until {
        query.push(("until".to_string(), until.timestamp().to_string()));
    }

    query
}

fn reconcile(body: &Value, reconciliation: &Reconciliation) -> Vec<CountRecord> {
    documents(body)
        .iter()
        .filter_map(|entry| {
            let Some(name) = str_at(entry, "/hashtag/name") else {
                debug!("Skipping hashtag entry without a name");
                return None;
            };
            let Some(original) = reconciliation.original(name) else {
                debug!("Dropping unrequested hashtag '{name}'");
                return None;
            };
            let Some(count) = count_of(entry) else {
                debug!("Skipping hashtag '{name}' without a usable count");
                return None;
            };

            Some(CountRecord {
                query: original.to_string(),
                name: name.to_string(),
                count,
                breakdown: Vec::new(),
            })
        })
        .collect()
}

/// Counts for every requested hashtag the API reports on, in response order.
pub async fn hashtag_counts(
    client: &dyn ApiClient,
    hashtags: &[String],
    options: &CountOptions,
) -> ApiResult<Vec<CountRecord>> {
    if hashtags.is_empty() {
        return Ok(Vec::new());
    }

    let reconciliation = Reconciliation::new(hashtags);
    let body = client
        .get(
            HASHTAG_COUNTS_ENDPOINT,
            &hashtag_query(hashtags, options),
        )
        .await?;

    Ok(reconcile(&body, &reconciliation))
}
