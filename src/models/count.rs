use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Aggregated mention count for one requested identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRecord {
    /// Identifier exactly as the caller supplied it
    pub query: String,
    /// Display name reported by the API
    pub name: String,
    /// Total over the full window
    pub count: u64,
    pub breakdown: Vec<BreakdownEntry>,
}

/// One group of a breakdown: the non-empty dimension values plus their count.
///
/// Serializes flat, e.g. `{"gender": "male", "age_range": "18-24", "count": 15}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownEntry {
    pub dimensions: Vec<(String, String)>,
    pub count: u64,
}

impl BreakdownEntry {
    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|(name, _)| name == dimension)
            .map(|(_, value)| value.as_str())
    }
}

impl Serialize for BreakdownEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.dimensions.len() + 1))?;
        for (name, value) in &self.dimensions {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("count", &self.count)?;
        map.end()
    }
}

/// Caller options shared by every count operation
#[derive(Debug, Clone, Default)]
pub struct CountOptions {
    /// Start of the window; defaults to one hour before `mentions_until`
    pub mentions_since: Option<DateTime<Utc>>,
    /// End of the window; defaults to now
    pub mentions_until: Option<DateTime<Utc>>,
    /// Ordered dimension names to break topic counts down by
    pub breakdown_by: Vec<String>,
}

impl CountOptions {
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.mentions_since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.mentions_until = Some(until);
        self
    }

    pub fn breakdown_by<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breakdown_by = dimensions.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_entry_serializes_flat() {
        let entry = BreakdownEntry {
            dimensions: vec![
                ("gender".to_string(), "male".to_string()),
                ("age_range".to_string(), "18-24".to_string()),
            ],
            count: 15,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"gender": "male", "age_range": "18-24", "count": 15})
        );
        assert_eq!(entry.get("age_range"), Some("18-24"));
        assert_eq!(entry.get("region"), None);
    }

    #[test]
    fn count_record_serializes_with_nested_breakdown() {
        let record = CountRecord {
            query: "123456".to_string(),
            name: "Baseball".to_string(),
            count: 18,
            breakdown: vec![BreakdownEntry {
                dimensions: vec![("gender".to_string(), "female".to_string())],
                count: 3,
            }],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["query"], "123456");
        assert_eq!(json["count"], 18);
        assert_eq!(json["breakdown"][0]["gender"], "female");
        assert_eq!(json["breakdown"][0]["count"], 3);
    }
}
