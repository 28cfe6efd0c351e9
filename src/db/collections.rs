use crate::db::{apply_update, fetch, list_eq, remove, IdAllocator};
use crate::error::Result;
use crate::models::{Collection, CollectionUpdate, Model, NewCollection};
use crate::store::{DocumentStore, EntityKind};
use chrono::Utc;
use mongodb::bson::Bson;
use std::sync::Arc;

#[derive(Clone)]
pub struct CollectionStore {
    store: Arc<dyn DocumentStore>,
    ids: IdAllocator,
}

impl CollectionStore {
    pub fn new(store: Arc<dyn DocumentStore>, ids: IdAllocator) -> Self {
        Self { store, ids }
    }

    pub async fn create(&self, owner: i64, new: NewCollection) -> Result<Collection> {
        let id = self.ids.next_id(EntityKind::Collection).await?;
        let collection = Collection {
            id,
            user_id: owner,
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        };
        self.store
            .put(
                EntityKind::Collection.collection_name(),
                &id.to_string(),
                collection.to_document(),
            )
            .await?;
        Ok(collection)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Collection>> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn list_by_owner(&self, owner: i64) -> Result<Vec<Collection>> {
        list_eq(self.store.as_ref(), "user_id", Bson::Int64(owner)).await
    }

    pub async fn update(&self, id: i64, update: CollectionUpdate) -> Result<Collection> {
        apply_update(self.store.as_ref(), id, update.into_document()).await
    }

    /// Removal does not cascade: trades keep their reference and simply
    /// stop matching any listing by this collection.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        remove(self.store.as_ref(), EntityKind::Collection, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::test_database;

    fn named(name: &str) -> NewCollection {
        NewCollection {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_and_sequence() -> Result<()> {
        let db = test_database();
        let first = db.collections.create(1, named("breakouts")).await?;
        assert_eq!(first.id, 1);
        assert_eq!(first.description, None);

        let second = db.collections.create(1, named("swing")).await?;
        assert_eq!(second.id, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_nonexistent_collection_returns_false() -> Result<()> {
        let db = test_database();
        assert!(!db.collections.delete(999).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() -> Result<()> {
        let db = test_database();
        let collection = db.collections.create(1, named("breakouts")).await?;

        let update = CollectionUpdate {
            description: Some("fakeout-prone".to_string()),
            ..CollectionUpdate::default()
        };
        let updated = db.collections.update(collection.id, update).await?;
        assert_eq!(updated.name, "breakouts");
        assert_eq!(updated.description.as_deref(), Some("fakeout-prone"));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_by_owner() -> Result<()> {
        let db = test_database();
        db.collections.create(1, named("a")).await?;
        db.collections.create(2, named("b")).await?;

        let mine = db.collections.list_by_owner(1).await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "a");
        Ok(())
    }
}
