use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::store::DocumentStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use log::info;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{
    FindOneAndUpdateOptions, IndexOptions, ReplaceOptions, ReturnDocument,
};
use mongodb::{Client, Database, IndexModel};

/// MongoDB-backed document store. Every record lives under a string `_id`
/// equal to its allocated identifier.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url).await?;
        let db = client.database(&config.name);
        let store = Self { db };
        store.ensure_indexes().await?;
        info!("Connected to MongoDB database '{}'", config.name);
        Ok(store)
    }

    /// Unique indexes on account username/email back the registration
    /// uniqueness check at write time.
    async fn ensure_indexes(&self) -> Result<()> {
        let accounts = self.db.collection::<Document>("accounts");
        for field in ["username", "email"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            accounts.create_index(index, None).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let coll = self.db.collection::<Document>(collection);
        Ok(coll.find_one(doc! { "_id": key }, None).await?)
    }

    async fn put(&self, collection: &str, key: &str, mut doc: Document) -> Result<()> {
        doc.insert("_id", key);
        let coll = self.db.collection::<Document>(collection);
        let options = ReplaceOptions::builder().upsert(true).build();
        coll.replace_one(doc! { "_id": key }, doc, options).await?;
        Ok(())
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
    ) -> Result<Vec<(String, Document)>> {
        let coll = self.db.collection::<Document>(collection);
        let cursor = coll.find(doc! { field: value }, None).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        let mut rows = Vec::with_capacity(docs.len());
        for document in docs {
            let key = document
                .get_str("_id")
                .map_err(|_| {
                    Error::DatabaseError(format!(
                        "document in '{}' has a non-string key",
                        collection
                    ))
                })?
                .to_string();
            rows.push((key, document));
        }
        Ok(rows)
    }

    async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<bool> {
        if fields.is_empty() {
            // "$set: {}" is rejected by the server
            return Ok(self.get(collection, key).await?.is_some());
        }
        let coll = self.db.collection::<Document>(collection);
        let result = coll
            .update_one(doc! { "_id": key }, doc! { "$set": fields }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let coll = self.db.collection::<Document>(collection);
        let result = coll.delete_one(doc! { "_id": key }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn increment(&self, collection: &str, key: &str, field: &str) -> Result<i64> {
        let coll = self.db.collection::<Document>(collection);
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let updated = coll
            .find_one_and_update(
                doc! { "_id": key },
                doc! { "$inc": { field: 1_i64 } },
                options,
            )
            .await?
            .ok_or_else(|| {
                Error::DatabaseError(format!(
                    "counter document '{}/{}' missing after upsert",
                    collection, key
                ))
            })?;
        match updated.get(field) {
            Some(Bson::Int64(n)) => Ok(*n),
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            _ => Err(Error::DatabaseError(format!(
                "counter field '{}' is not an integer",
                field
            ))),
        }
    }
}
