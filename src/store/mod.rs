use crate::error::Result;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

mod memory;
mod mongo;
pub mod normalize;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Collection holding the per-kind identifier counters.
pub const COUNTERS_COLLECTION: &str = "counters";
/// Key of the singleton counter document.
pub const COUNTERS_KEY: &str = "ids";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Account,
    Trade,
    Collection,
}

impl EntityKind {
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Account => "accounts",
            EntityKind::Trade => "trades",
            EntityKind::Collection => "collections",
        }
    }

    /// Field of the counter document tracking this kind.
    pub fn counter_field(&self) -> &'static str {
        match self {
            EntityKind::Account => "account",
            EntityKind::Trade => "trade",
            EntityKind::Collection => "collection",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.counter_field())
    }
}

/// Boundary with the document store provider: named collections of
/// documents addressed by string key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. `None` when the key is absent.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>>;

    /// Full-document write, replacing any existing document under `key`.
    async fn put(&self, collection: &str, key: &str, doc: Document) -> Result<()>;

    /// Equality-filtered query returning `(key, document)` rows.
    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
    ) -> Result<Vec<(String, Document)>>;

    /// Partial-field merge: listed fields replace, others stay untouched.
    /// Returns whether a document matched.
    async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<bool>;

    /// Key removal. Returns whether a document was removed.
    async fn delete(&self, collection: &str, key: &str) -> Result<bool>;

    /// Atomic read-modify-write increment of an integer field, scoped to
    /// one document. Returns the incremented value; a missing field
    /// counts as zero, so the first call yields 1.
    async fn increment(&self, collection: &str, key: &str, field: &str) -> Result<i64>;
}
