use crate::db::{apply_update, fetch, list_eq, remove, IdAllocator};
use crate::error::Result;
use crate::models::{Model, NewTrade, Trade, TradeUpdate};
use crate::store::{DocumentStore, EntityKind};
use chrono::Utc;
use mongodb::bson::{doc, Bson};
use std::sync::Arc;

#[derive(Clone)]
pub struct TradeStore {
    store: Arc<dyn DocumentStore>,
    ids: IdAllocator,
}

impl TradeStore {
    pub fn new(store: Arc<dyn DocumentStore>, ids: IdAllocator) -> Self {
        Self { store, ids }
    }

    /// The caller layer has already verified that `owner` and the target
    /// collection, if any, exist.
    pub async fn create(&self, owner: i64, new: NewTrade) -> Result<Trade> {
        let id = self.ids.next_id(EntityKind::Trade).await?;
        let trade = Trade {
            id,
            user_id: owner,
            collection_id: new.collection_id,
            symbol: new.symbol,
            direction: new.direction,
            entry_price: new.entry_price,
            exit_price: new.exit_price,
            entry_date: new.entry_date,
            exit_date: new.exit_date,
            notes: new.notes,
            created_at: Utc::now(),
        };
        self.store
            .put(
                EntityKind::Trade.collection_name(),
                &id.to_string(),
                trade.to_document(),
            )
            .await?;
        Ok(trade)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Trade>> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn list_by_owner(&self, owner: i64) -> Result<Vec<Trade>> {
        list_eq(self.store.as_ref(), "user_id", Bson::Int64(owner)).await
    }

    pub async fn list_by_collection(&self, collection_id: i64) -> Result<Vec<Trade>> {
        list_eq(self.store.as_ref(), "collection_id", Bson::Int64(collection_id)).await
    }

    pub async fn update(&self, id: i64, update: TradeUpdate) -> Result<Trade> {
        apply_update(self.store.as_ref(), id, update.into_document()).await
    }

    /// Attach the trade to a collection, or detach it with `None`.
    pub async fn set_collection(&self, id: i64, collection_id: Option<i64>) -> Result<Trade> {
        apply_update(
            self.store.as_ref(),
            id,
            doc! { "collection_id": collection_id },
        )
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        remove(self.store.as_ref(), EntityKind::Trade, id).await
    }
}
