//! In-memory store for one table's rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

use super::record::Record;

/// Holds one table's rows in insertion order.
///
/// Mutated only by the pipeline for that table; readers elsewhere (reference
/// resolution) see an immutable, already-cast snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from raw rows supplied by the ingestion collaborator.
    pub fn from_rows(rows: Vec<IndexMap<String, Value>>) -> Self {
        Self {
            records: rows.into_iter().map(Record::new).collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to the rows, preserving order.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Enforce a uniqueness constraint on one field across the whole store.
    ///
    /// Comparison uses cast values, case-sensitive. The first occurrence
    /// wins; every later duplicate gets an error annotation on the field.
    /// Absent values never participate.
    pub fn check_unique(&mut self, key: &str) {
        let mut first_seen: IndexMap<String, usize> = IndexMap::new();
        let mut duplicates: Vec<(usize, String, usize)> = Vec::new();

        for (idx, record) in self.records.iter().enumerate() {
            let value = record.get(key);
            if value.is_nil() {
                continue;
            }
            let repr = value.to_string();
            match first_seen.get(&repr) {
                Some(&first) => duplicates.push((idx, repr.clone(), first)),
                None => {
                    first_seen.insert(repr, idx);
                }
            }
        }

        for (idx, repr, first) in duplicates {
            self.records[idx].add_error(
                key,
                format!("Value '{}' duplicates row {}", repr, first + 1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(values: &[&str]) -> RecordStore {
        let rows = values
            .iter()
            .map(|v| {
                let mut row = IndexMap::new();
                row.insert("email".to_string(), Value::from(*v));
                row
            })
            .collect();
        RecordStore::from_rows(rows)
    }

    #[test]
    fn test_later_duplicate_flagged() {
        let mut store = store(&["a@x.com", "b@x.com", "a@x.com"]);
        store.check_unique("email");

        assert!(store.records()[0].field_annotations("email").is_empty());
        assert!(store.records()[1].field_annotations("email").is_empty());
        assert_eq!(store.records()[2].field_annotations("email").len(), 1);
        assert!(store.records()[2].is_invalid());
    }

    #[test]
    fn test_unique_is_case_sensitive() {
        let mut store = store(&["A@x.com", "a@x.com"]);
        store.check_unique("email");
        assert!(!store.records()[1].is_invalid());
    }

    #[test]
    fn test_absent_values_never_collide() {
        let mut store = store(&["", "", "  "]);
        store.check_unique("email");
        assert!(store.records().iter().all(|r| !r.is_invalid()));
    }
}
