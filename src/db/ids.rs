use crate::error::Result;
use crate::store::{DocumentStore, EntityKind, COUNTERS_COLLECTION, COUNTERS_KEY};
use std::sync::Arc;

/// Hands out monotonically increasing integer identifiers per entity
/// kind, backed by one shared counter document. The read-increment-write
/// runs inside the store's single-document atomic primitive, so
/// concurrent callers never receive the same value twice.
#[derive(Clone)]
pub struct IdAllocator {
    store: Arc<dyn DocumentStore>,
}

impl IdAllocator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The first allocation for a kind yields 1.
    pub async fn next_id(&self, kind: EntityKind) -> Result<i64> {
        self.store
            .increment(COUNTERS_COLLECTION, COUNTERS_KEY, kind.counter_field())
            .await
    }
}
