//! Shared helpers for integration tests: an in-memory page source honoring
//! the offset/size cursor contract, and a recording sink double.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use stratify::domain::errors::DomainResult;
use stratify::domain::models::Record;
use stratify::domain::ports::{PageSource, RecordSink};

/// Build a record with a `provider_type` category and a sequence number.
pub fn record(category: &str, seq: usize) -> Record {
    let mut r = Record::new();
    r.insert("provider_type", json!(category));
    r.insert("seq", json!(seq));
    r
}

/// Build a record with an identifier column as well.
pub fn record_with_id(category: &str, seq: usize, id: &str) -> Record {
    let mut r = record(category, seq);
    r.insert("npi", json!(id));
    r
}

/// Expand `(category, count)` pairs into a flat record list, in order.
pub fn records(shape: &[(&str, usize)]) -> Vec<Record> {
    let mut out = Vec::new();
    for (category, n) in shape {
        for _ in 0..*n {
            let seq = out.len();
            out.push(record(category, seq));
        }
    }
    out
}

/// Page source backed by a flat record list.
///
/// Serves `records[offset..offset + size]`, so fixed parameters always
/// yield the same page and the empty page appears exactly at the end of
/// data.
pub struct FlatSource {
    records: Vec<Record>,
}

impl FlatSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PageSource for FlatSource {
    async fn fetch_page(&self, offset: u64, size: u64) -> DomainResult<Vec<Record>> {
        let start = (offset as usize).min(self.records.len());
        let end = (start + size as usize).min(self.records.len());
        Ok(self.records[start..end].to_vec())
    }
}

/// In-memory sink double recording every table replacement.
#[derive(Default)]
pub struct RecordingSink {
    tables: Mutex<HashMap<String, Vec<Record>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<Vec<Record>> {
        self.tables.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn replace_table(&self, table: &str, records: &[Record]) -> DomainResult<u64> {
        self.tables
            .lock()
            .unwrap()
            .insert(table.to_string(), records.to_vec());
        Ok(records.len() as u64)
    }

    async fn count_rows(&self, table: &str) -> DomainResult<i64> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, |rows| rows.len() as i64))
    }

    async fn category_distribution(
        &self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> DomainResult<Vec<(String, i64)>> {
        let mut tallies: HashMap<String, i64> = HashMap::new();
        if let Some(rows) = self.tables.lock().unwrap().get(table) {
            for row in rows {
                *tallies.entry(row.category(column)).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<(String, i64)> = tallies.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit as usize);
        Ok(counts)
    }

    async fn distinct_values(&self, table: &str, column: &str) -> DomainResult<Vec<String>> {
        let mut values = Vec::new();
        if let Some(rows) = self.tables.lock().unwrap().get(table) {
            for row in rows {
                if let Some(Value::String(s)) = row.fields().get(column) {
                    if !values.contains(s) {
                        values.push(s.clone());
                    }
                }
            }
        }
        Ok(values)
    }
}
