//! In-process record store.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{NewRecord, PropertyMap, Record, RecordQuery, RecordStore, SortDirection};
use crate::error::{Error, Result};

/// Store kept entirely in memory, with optional failure injection.
///
/// Records keep insertion order, which stands in for the unspecified order a
/// hosted store returns when no sort is requested.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, Vec<Record>>,
    created: Vec<NewRecord>,
    failing_queries: HashSet<String>,
    failing_creates: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an existing record without logging it as created.
    pub fn seed(&self, collection: &str, record: Record) {
        self.lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Snapshot of a collection's records in insertion order.
    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Every record created through [`RecordStore::create`], in call order.
    pub fn created(&self) -> Vec<NewRecord> {
        self.lock().created.clone()
    }

    /// Make every query against `collection` fail.
    pub fn fail_queries_for(&self, collection: &str) {
        self.lock().failing_queries.insert(collection.to_string());
    }

    /// Make creating a record whose `Name` is `name` fail.
    pub fn fail_creates_named(&self, name: &str) {
        self.lock().failing_creates.insert(name.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Record>> {
        let state = self.lock();
        if state.failing_queries.contains(collection) {
            return Err(Error::Store {
                status: 503,
                message: format!("query of {collection} failed"),
            });
        }

        let mut records: Vec<Record> = state
            .collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|record| {
                query.filter.as_ref().map_or(true, |filter| {
                    record
                        .integer(&filter.property)
                        .is_some_and(|value| value > filter.greater_than)
                })
            })
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            records.sort_by(|left, right| {
                let ordering = match (left.integer(&sort.property), right.integer(&sort.property)) {
                    (Some(left), Some(right)) => left.cmp(&right),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn create(&self, record: NewRecord) -> Result<String> {
        let mut state = self.lock();
        if let Some(name) = record.text(crate::models::property::NAME) {
            if state.failing_creates.contains(name) {
                return Err(Error::Store {
                    status: 400,
                    message: format!("create of {name} rejected"),
                });
            }
        }

        let id = Uuid::now_v7().to_string();
        state
            .collections
            .entry(record.collection.clone())
            .or_default()
            .push(Record {
                id: id.clone(),
                properties: record.properties.clone(),
            });
        state.created.push(record);
        Ok(id)
    }

    async fn update(&self, record_id: &str, properties: PropertyMap) -> Result<()> {
        let mut state = self.lock();
        let record = state
            .collections
            .values_mut()
            .flatten()
            .find(|record| record.id == record_id)
            .ok_or_else(|| Error::Store {
                status: 404,
                message: format!("record {record_id} not found"),
            })?;
        record.properties.extend(properties);
        Ok(())
    }
}
