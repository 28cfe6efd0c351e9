use crate::error::{Error, Result};
use crate::models::{
    opt_datetime, opt_f64, opt_i64, opt_str, req_datetime, req_f64, req_i64, req_str, Model,
};
use crate::store::EntityKind;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            other => Err(Error::ValidationError(format!(
                "unknown direction '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub user_id: i64,
    /// A trade belongs to at most one collection.
    pub collection_id: Option<i64>,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub entry_date: Option<DateTime<Utc>>,
    pub exit_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub entry_date: Option<DateTime<Utc>>,
    pub exit_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub collection_id: Option<i64>,
}

/// Partial trade update: only supplied fields change. Moving a trade in
/// or out of a collection goes through the dedicated store operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeUpdate {
    pub symbol: Option<String>,
    pub direction: Option<Direction>,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub entry_date: Option<DateTime<Utc>>,
    pub exit_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl TradeUpdate {
    pub fn into_document(self) -> Document {
        let mut fields = Document::new();
        if let Some(symbol) = self.symbol {
            fields.insert("symbol", symbol);
        }
        if let Some(direction) = self.direction {
            fields.insert("direction", direction.as_str());
        }
        if let Some(entry_price) = self.entry_price {
            fields.insert("entry_price", entry_price);
        }
        if let Some(exit_price) = self.exit_price {
            fields.insert("exit_price", exit_price);
        }
        if let Some(entry_date) = self.entry_date {
            fields.insert("entry_date", entry_date.timestamp_millis());
        }
        if let Some(exit_date) = self.exit_date {
            fields.insert("exit_date", exit_date.timestamp_millis());
        }
        if let Some(notes) = self.notes {
            fields.insert("notes", notes);
        }
        fields
    }
}

impl Model for Trade {
    const KIND: EntityKind = EntityKind::Trade;

    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Trade {
            id: req_i64(doc, "id")?,
            user_id: req_i64(doc, "user_id")?,
            collection_id: opt_i64(doc, "collection_id"),
            symbol: req_str(doc, "symbol")?,
            direction: Direction::parse(&req_str(doc, "direction")?)?,
            entry_price: req_f64(doc, "entry_price")?,
            exit_price: opt_f64(doc, "exit_price"),
            entry_date: opt_datetime(doc, "entry_date"),
            exit_date: opt_datetime(doc, "exit_date"),
            notes: opt_str(doc, "notes"),
            created_at: req_datetime(doc, "created_at")?,
        })
    }

    fn to_document(&self) -> Document {
        doc! {
            "user_id": self.user_id,
            "collection_id": self.collection_id,
            "symbol": &self.symbol,
            "direction": self.direction.as_str(),
            "entry_price": self.entry_price,
            "exit_price": self.exit_price,
            "entry_date": self.entry_date.map(|d| d.timestamp_millis()),
            "exit_date": self.exit_date.map(|d| d.timestamp_millis()),
            "notes": self.notes.clone(),
            "created_at": self.created_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::normalize::normalize;
    use mongodb::bson::Bson;

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("long").unwrap(), Direction::Long);
        assert_eq!(Direction::parse("short").unwrap(), Direction::Short);
        assert!(Direction::parse("sideways").is_err());
    }

    #[test]
    fn test_document_mapping_with_open_position() {
        let trade = Trade {
            id: 12,
            user_id: 1,
            collection_id: Some(4),
            symbol: "BTC/USD".to_string(),
            direction: Direction::Long,
            entry_price: 64_250.0,
            exit_price: None,
            entry_date: Some(Utc::now()),
            exit_date: None,
            notes: None,
            created_at: Utc::now(),
        };

        let doc = trade.to_document();
        assert_eq!(doc.get("exit_price"), Some(&Bson::Null));
        assert_eq!(doc.get("exit_date"), Some(&Bson::Null));
        assert!(matches!(doc.get("entry_date"), Some(Bson::Int64(_))));

        let decoded = Trade::from_document(&normalize(doc, "12")).unwrap();
        assert_eq!(decoded.id, 12);
        assert_eq!(decoded.collection_id, Some(4));
        assert_eq!(decoded.direction, Direction::Long);
        assert_eq!(decoded.exit_price, None);
        assert_eq!(decoded.exit_date, None);
        assert_eq!(
            decoded.entry_date.unwrap().timestamp_millis(),
            trade.entry_date.unwrap().timestamp_millis()
        );
    }

    #[test]
    fn test_update_document_lists_only_supplied_fields() {
        let update = TradeUpdate {
            notes: Some("took profit early".to_string()),
            exit_price: Some(65_000.0),
            ..TradeUpdate::default()
        };
        let fields = update.into_document();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get_str("notes").unwrap(), "took profit early");
        assert_eq!(fields.get_f64("exit_price").unwrap(), 65_000.0);
    }
}
