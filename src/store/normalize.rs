use mongodb::bson::{Bson, DateTime, Document};

/// Fields persisted as epoch milliseconds that normalization turns into
/// native datetimes.
pub const DATE_FIELDS: &[&str] = &["created_at", "entry_date", "exit_date"];

/// Turn a raw stored document plus its key into a normalized document.
///
/// The key becomes the record's `id`, coerced to an integer when it
/// parses as one, overriding any `id` carried in the raw payload. Date
/// fields stored as epoch milliseconds are materialized into datetime
/// values; fields absent from the payload stay absent. Everything else
/// passes through unchanged.
pub fn normalize(mut doc: Document, key: &str) -> Document {
    doc.remove("_id");
    let id = match key.parse::<i64>() {
        Ok(n) => Bson::Int64(n),
        Err(_) => Bson::String(key.to_string()),
    };
    doc.insert("id", id);

    for field in DATE_FIELDS {
        if let Some(millis) = doc.get(*field).and_then(as_millis) {
            doc.insert(*field, Bson::DateTime(DateTime::from_millis(millis)));
        }
    }
    doc
}

/// Collection variant: normalize every row of a result set. An empty
/// set yields an empty vector.
pub fn normalize_all(rows: Vec<(String, Document)>) -> Vec<Document> {
    rows.into_iter()
        .map(|(key, doc)| normalize(doc, &key))
        .collect()
}

fn as_millis(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int64(n) => Some(*n),
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Double(f) => Some(*f as i64),
        _ => None,
    }
}
