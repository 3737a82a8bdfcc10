//! Grouping of dimensioned count observations across chunks.

use std::collections::HashMap;

use serde_json::Value;

use crate::counts::response::{count_of, dimension_of};
use crate::models::BreakdownEntry;

/// Dimension values of one observation, in requested dimension order.
///
/// An empty string means the entry did not carry that dimension; it is still
/// a distinct key component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakdownKey(Vec<String>);

impl BreakdownKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }
}

/// One count reported for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub key: BreakdownKey,
    pub count: u64,
}

impl Observation {
    /// Reads a breakdown entry such as `{"gender": "male", "count": "10"}`.
    /// Returns `None` when the entry carries no usable count.
    pub fn from_entry(entry: &Value, breakdown_by: &[String]) -> Option<Self> {
        let count = count_of(entry)?;
        let key = BreakdownKey::new(
            breakdown_by
                .iter()
                .map(|dimension| dimension_of(entry, dimension))
                .collect(),
        );
        Some(Self { key, count })
    }
}

/// Running sums for one identifier: a grand total plus one sum per
/// breakdown key, remembered in first-seen order.
#[derive(Debug, Default)]
pub struct BreakdownAggregator {
    total: u64,
    positions: HashMap<BreakdownKey, usize>,
    groups: Vec<(BreakdownKey, u64)>,
}

impl BreakdownAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_total(&mut self, count: u64) {
        self.total = self.total.saturating_add(count);
    }

    pub fn accumulate(&mut self, observation: Observation) {
        match self.positions.get(&observation.key) {
            Some(&index) => {
                let sum = &mut self.groups[index].1;
                *sum = sum.saturating_add(observation.count);
            }
            None => {
                self.positions
                    .insert(observation.key.clone(), self.groups.len());
                self.groups.push((observation.key, observation.count));
            }
        }
    }

    #[cfg(test)]
    fn total(&self) -> u64 {
        self.total
    }

    #[cfg(test)]
    fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total and breakdown entries. Each entry names only the dimensions
    /// whose value was present.
    pub fn finalize(self, breakdown_by: &[String]) -> (u64, Vec<BreakdownEntry>) {
        let entries = self
            .groups
            .into_iter()
            .map(|(key, count)| BreakdownEntry {
                dimensions: breakdown_by
                    .iter()
                    .zip(key.0)
                    .filter(|(_, value)| !value.is_empty())
                    .map(|(name, value)| (name.clone(), value))
                    .collect(),
                count,
            })
            .collect();

        (self.total, entries)
    }
}
