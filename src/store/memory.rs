use crate::error::Result;
use crate::store::DocumentStore;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process document store used by the test suite. A single write lock
/// serializes every mutation, which gives `increment` its atomicity.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn put(&self, collection: &str, key: &str, doc: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        Ok(())
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
    ) -> Result<Vec<(String, Document)>> {
        let collections = self.collections.read().await;
        let rows = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field) == Some(&value))
                    .map(|(key, doc)| (key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<bool> {
        let mut collections = self.collections.write().await;
        match collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
        {
            Some(doc) => {
                for (field, value) in fields {
                    doc.insert(field, value);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .is_some())
    }

    async fn increment(&self, collection: &str, key: &str, field: &str) -> Result<i64> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(key.to_string())
            .or_insert_with(Document::new);
        let current = match doc.get(field) {
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Int32(n)) => i64::from(*n),
            _ => 0,
        };
        let next = current + 1;
        doc.insert(field, Bson::Int64(next));
        Ok(next)
    }
}
