use crate::error::{Error, Result};
use crate::store::EntityKind;
use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};

pub mod account;
pub mod collection;
pub mod trade;

pub use account::{Account, AccountUpdate, NewAccount, PlanTier};
pub use collection::{Collection, CollectionUpdate, NewCollection};
pub use trade::{Direction, NewTrade, Trade, TradeUpdate};

/// A typed record backed by one document collection. `from_document`
/// decodes a normalized document (integer `id`, native datetimes) by
/// enumerating every field; `to_document` produces the persisted
/// representation (datetimes as epoch milliseconds, no `id` — the
/// document key carries the identifier).
pub trait Model: Sized + Send + Sync {
    const KIND: EntityKind;

    fn from_document(doc: &Document) -> Result<Self>;
    fn to_document(&self) -> Document;
}

fn missing(field: &str) -> Error {
    Error::DatabaseError(format!("field '{}' missing or of wrong type", field))
}

pub(crate) fn req_i64(doc: &Document, field: &str) -> Result<i64> {
    match doc.get(field) {
        Some(Bson::Int64(n)) => Ok(*n),
        Some(Bson::Int32(n)) => Ok(i64::from(*n)),
        _ => Err(missing(field)),
    }
}

pub(crate) fn opt_i64(doc: &Document, field: &str) -> Option<i64> {
    match doc.get(field) {
        Some(Bson::Int64(n)) => Some(*n),
        Some(Bson::Int32(n)) => Some(i64::from(*n)),
        _ => None,
    }
}

pub(crate) fn req_str(doc: &Document, field: &str) -> Result<String> {
    match doc.get(field) {
        Some(Bson::String(s)) => Ok(s.clone()),
        _ => Err(missing(field)),
    }
}

pub(crate) fn opt_str(doc: &Document, field: &str) -> Option<String> {
    match doc.get(field) {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn req_f64(doc: &Document, field: &str) -> Result<f64> {
    match doc.get(field) {
        Some(Bson::Double(f)) => Ok(*f),
        Some(Bson::Int64(n)) => Ok(*n as f64),
        Some(Bson::Int32(n)) => Ok(f64::from(*n)),
        _ => Err(missing(field)),
    }
}

pub(crate) fn opt_f64(doc: &Document, field: &str) -> Option<f64> {
    match doc.get(field) {
        Some(Bson::Double(f)) => Some(*f),
        Some(Bson::Int64(n)) => Some(*n as f64),
        Some(Bson::Int32(n)) => Some(f64::from(*n)),
        _ => None,
    }
}

pub(crate) fn req_datetime(doc: &Document, field: &str) -> Result<DateTime<Utc>> {
    match doc.get(field) {
        Some(Bson::DateTime(dt)) => Ok(dt.to_chrono()),
        _ => Err(missing(field)),
    }
}

pub(crate) fn opt_datetime(doc: &Document, field: &str) -> Option<DateTime<Utc>> {
    match doc.get(field) {
        Some(Bson::DateTime(dt)) => Some(dt.to_chrono()),
        _ => None,
    }
}
