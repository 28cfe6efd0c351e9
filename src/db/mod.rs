use crate::error::{Error, Result};
use crate::models::Model;
use crate::store::normalize::{normalize, normalize_all};
use crate::store::{DocumentStore, EntityKind};
use mongodb::bson::{Bson, Document};
use std::sync::Arc;

mod accounts;
mod collections;
pub mod ids;
mod trades;

pub use accounts::AccountStore;
pub use collections::CollectionStore;
pub use ids::IdAllocator;
pub use trades::TradeStore;

/// The record store: typed CRUD over the three entity kinds, sharing one
/// document store and one identifier allocator.
pub struct Database {
    pub accounts: AccountStore,
    pub trades: TradeStore,
    pub collections: CollectionStore,
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let ids = IdAllocator::new(store.clone());
        Self {
            accounts: AccountStore::new(store.clone(), ids.clone()),
            trades: TradeStore::new(store.clone(), ids.clone()),
            collections: CollectionStore::new(store, ids),
        }
    }
}

pub(crate) async fn fetch<M: Model>(store: &dyn DocumentStore, id: i64) -> Result<Option<M>> {
    let key = id.to_string();
    match store.get(M::KIND.collection_name(), &key).await? {
        Some(doc) => Ok(Some(M::from_document(&normalize(doc, &key))?)),
        None => Ok(None),
    }
}

pub(crate) async fn list_eq<M: Model>(
    store: &dyn DocumentStore,
    field: &str,
    value: Bson,
) -> Result<Vec<M>> {
    let rows = store.find_eq(M::KIND.collection_name(), field, value).await?;
    normalize_all(rows)
        .iter()
        .map(M::from_document)
        .collect()
}

/// Partial-field merge with the store's update contract: not-found when
/// the target is absent, and a fatal inconsistency when the re-read
/// immediately after a successful write comes back empty.
pub(crate) async fn apply_update<M: Model>(
    store: &dyn DocumentStore,
    id: i64,
    fields: Document,
) -> Result<M> {
    let collection = M::KIND.collection_name();
    let key = id.to_string();

    if store.get(collection, &key).await?.is_none() {
        return Err(Error::NotFound(format!("{} {} not found", M::KIND, id)));
    }
    store.merge(collection, &key, fields).await?;

    match store.get(collection, &key).await? {
        Some(doc) => M::from_document(&normalize(doc, &key)),
        None => Err(Error::StoreInconsistency(format!(
            "{} {} vanished after a successful update",
            M::KIND,
            id
        ))),
    }
}

pub(crate) async fn remove(store: &dyn DocumentStore, kind: EntityKind, id: i64) -> Result<bool> {
    store.delete(kind.collection_name(), &id.to_string()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanTier, Trade};
    use crate::store::MockDocumentStore;
    use crate::tests::common::{new_account, test_database};
    use mongodb::bson::doc;
    use tokio_test::assert_ok;

    #[test_log::test(tokio::test)]
    async fn test_journal_scenario() -> Result<()> {
        let db = test_database();

        let alice = db.accounts.create(new_account("alice", "a@x.com")).await?;
        assert_eq!(alice.id, 1);
        assert_eq!(alice.plan, PlanTier::Free);

        let bob = db.accounts.create(new_account("bob", "b@x.com")).await?;
        assert_eq!(bob.id, 2);

        let found = db.accounts.get_by_username("alice").await?.unwrap();
        assert_eq!(found.id, 1);

        assert_ok!(db.accounts.update_plan(1, PlanTier::Pro).await);
        let reread = db.accounts.get(1).await?.unwrap();
        assert_eq!(reread.plan, PlanTier::Pro);

        // Never created, so deletion reports false rather than erroring
        assert!(!db.collections.delete(999).await?);
        Ok(())
    }

    fn stored_trade() -> Document {
        doc! {
            "user_id": 1_i64,
            "collection_id": Bson::Null,
            "symbol": "BTC/USD",
            "direction": "long",
            "entry_price": 100.0,
            "exit_price": Bson::Null,
            "entry_date": Bson::Null,
            "exit_date": Bson::Null,
            "notes": Bson::Null,
            "created_at": 1_700_000_000_000_i64,
        }
    }

    #[tokio::test]
    async fn test_update_surfaces_post_write_inconsistency() {
        let mut store = MockDocumentStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(stored_trade())));
        store
            .expect_merge()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(true));
        // The write succeeded but the re-read finds nothing
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));

        let result = apply_update::<Trade>(&store, 5, doc! { "notes": "x" }).await;
        assert!(matches!(result, Err(Error::StoreInconsistency(_))));
    }

    #[tokio::test]
    async fn test_update_missing_target_is_not_found() {
        let mut store = MockDocumentStore::new();
        store.expect_get().times(1).returning(|_, _| Ok(None));

        let result = apply_update::<Trade>(&store, 99, doc! { "notes": "x" }).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
