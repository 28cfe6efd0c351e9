use crate::error::Result;
use crate::models::{opt_str, req_datetime, req_i64, req_str, Model};
use crate::store::EntityKind;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// A named group of trades, e.g. one strategy or one trading week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CollectionUpdate {
    pub fn into_document(self) -> Document {
        let mut fields = Document::new();
        if let Some(name) = self.name {
            fields.insert("name", name);
        }
        if let Some(description) = self.description {
            fields.insert("description", description);
        }
        fields
    }
}

impl Model for Collection {
    const KIND: EntityKind = EntityKind::Collection;

    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Collection {
            id: req_i64(doc, "id")?,
            user_id: req_i64(doc, "user_id")?,
            name: req_str(doc, "name")?,
            description: opt_str(doc, "description"),
            created_at: req_datetime(doc, "created_at")?,
        })
    }

    fn to_document(&self) -> Document {
        doc! {
            "user_id": self.user_id,
            "name": &self.name,
            "description": self.description.clone(),
            "created_at": self.created_at.timestamp_millis(),
        }
    }
}
