use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::Bookmark;
use crate::store::{BookmarkError, BookmarkResult};

/// Metadata key the bookmark list is persisted under.
pub const METADATA_KEY: &str = "bookmarks";

/// Serialize a bookmark list into its metadata value.
///
/// The value is an object mapping the decimal address to its label. Several
/// bookmarks at one address are written as an array of labels in list order.
pub fn encode(bookmarks: &[Bookmark]) -> Value {
    let mut grouped: BTreeMap<u64, Vec<&str>> = BTreeMap::new();
    for bookmark in bookmarks {
        grouped.entry(bookmark.address).or_default().push(&bookmark.label);
    }

    let mut map = Map::new();
    for (address, labels) in grouped {
        let value = match labels.as_slice() {
            [single] => Value::String((*single).to_string()),
            many => Value::Array(many.iter().map(|l| Value::String((*l).to_string())).collect()),
        };
        map.insert(address.to_string(), value);
    }
    Value::Object(map)
}

/// Parse a metadata value back into a bookmark list sorted by address.
///
/// Labels that share an address keep the order they were written in.
pub fn decode(value: &Value) -> BookmarkResult<Vec<Bookmark>> {
    let map = value.as_object().ok_or_else(|| {
        BookmarkError::Malformed(format!("expected an object, found {}", kind_of(value)))
    })?;

    let mut bookmarks = Vec::with_capacity(map.len());
    for (key, labels) in map {
        let address: u64 = key
            .trim()
            .parse()
            .map_err(|_| BookmarkError::Malformed(format!("invalid address key '{key}'")))?;
        match labels {
            Value::String(label) => bookmarks.push(Bookmark::new(address, label.clone())),
            Value::Array(items) => {
                for item in items {
                    let label = item.as_str().ok_or_else(|| {
                        BookmarkError::Malformed(format!(
                            "label for '{key}' must be text, found {}",
                            kind_of(item)
                        ))
                    })?;
                    bookmarks.push(Bookmark::new(address, label));
                }
            }
            other => {
                return Err(BookmarkError::Malformed(format!(
                    "label for '{key}' must be text, found {}",
                    kind_of(other)
                )))
            }
        }
    }

    bookmarks.sort_by_key(|b| b.address);
    Ok(bookmarks)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
