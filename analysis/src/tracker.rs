//! Concurrent field-path statistics for one survey run.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use schema_survey_core::{
    FieldObserver, Observation, child_path, indexed_path, wildcard_path,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_INDEXED_ARRAY_LIMIT;

/// Maps field paths to their observers while many workers walk documents.
///
/// Observers live in a sharded map: creating an observer for a new path is
/// idempotent and each update holds only the shard lock for that path.
/// Results are only guaranteed complete once every worker has returned,
/// which is why the tracker is consumed by [`into_snapshot`](Self::into_snapshot).
#[derive(Debug)]
pub struct SchemaTracker {
    fields: DashMap<String, FieldObserver>,
    distributions: DashMap<String, DashMap<String, AtomicUsize>>,
    files: AtomicUsize,
    indexed_array_limit: usize,
}

impl Default for SchemaTracker {
    fn default() -> Self {
        Self::new(DEFAULT_INDEXED_ARRAY_LIMIT)
    }
}

impl SchemaTracker {
    pub fn new(indexed_array_limit: usize) -> Self {
        Self {
            fields: DashMap::new(),
            distributions: DashMap::new(),
            files: AtomicUsize::new(0),
            indexed_array_limit,
        }
    }

    /// Counts one successfully parsed document.
    pub fn add_file(&self) {
        self.files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_files(&self) -> usize {
        self.files.load(Ordering::Relaxed)
    }

    /// Records `node` at `path` and recurses into its children.
    ///
    /// Array elements are tracked twice: under `[i]` for the first
    /// `indexed_array_limit` elements and under `[]` for every element.
    pub fn track(&self, path: &str, node: &Value) {
        self.observe(path, node);

        match node {
            Value::Object(map) => {
                for (name, child) in map {
                    self.track(&child_path(path, name), child);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().take(self.indexed_array_limit).enumerate() {
                    self.track(&indexed_path(path, index), item);
                }
                let any_item = wildcard_path(path);
                for item in items {
                    self.track(&any_item, item);
                }
            }
            _ => {}
        }
    }

    fn observe(&self, path: &str, node: &Value) {
        let observation = Observation::from(node);
        if let Some(mut field) = self.fields.get_mut(path) {
            field.observe(observation);
            return;
        }
        self.fields
            .entry(path.to_string())
            .or_default()
            .observe(observation);
    }

    /// Increments the distribution counter of a headline field value.
    pub fn record_headline(&self, field: &str, value: &str) {
        let values = match self.distributions.get(field) {
            Some(values) => values,
            None => self
                .distributions
                .entry(field.to_string())
                .or_default()
                .downgrade(),
        };
        if let Some(counter) = values.get(value) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        values
            .entry(value.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Number of distinct field paths seen so far.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Copies the current state without consuming the tracker.
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            total_files: self.total_files(),
            fields: self
                .fields
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
            distributions: self
                .distributions
                .iter()
                .map(|entry| {
                    let counts = entry
                        .value()
                        .iter()
                        .map(|c| (c.key().clone(), c.value().load(Ordering::Relaxed)))
                        .collect();
                    (entry.key().clone(), counts)
                })
                .collect(),
        }
    }

    /// Freezes the tracker once all workers are done.
    pub fn into_snapshot(self) -> TrackerSnapshot {
        TrackerSnapshot {
            total_files: self.files.into_inner(),
            fields: self.fields.into_iter().collect(),
            distributions: self
                .distributions
                .into_iter()
                .map(|(field, counts)| {
                    let counts = counts
                        .into_iter()
                        .map(|(value, count)| (value, count.into_inner()))
                        .collect();
                    (field, counts)
                })
                .collect(),
        }
    }
}

/// Immutable view of a finished run, ordered by path.
///
/// This is also the serialized form handed to a downstream schema builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub total_files: usize,
    pub fields: BTreeMap<String, FieldObserver>,
    /// Headline field → value → occurrence count.
    pub distributions: BTreeMap<String, BTreeMap<String, usize>>,
}

impl TrackerSnapshot {
    pub fn field(&self, path: &str) -> Option<&FieldObserver> {
        self.fields.get(path)
    }

    /// Value counts for one headline field, `None` when it never appeared.
    pub fn distribution(&self, field: &str) -> Option<&BTreeMap<String, usize>> {
        self.distributions.get(field)
    }
}
