//! Conversion between JSON documents and wire items.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::attribute_value::AttributeValue;

/// A stored item (or key) as sent on the wire.
pub type Item = HashMap<String, AttributeValue>;

/// Convert a JSON object into a wire item.
///
/// Returns `None` when `document` is not an object.
#[must_use]
pub fn item_from_document(document: &Value) -> Option<Item> {
    let map = document.as_object()?;
    Some(
        map.iter()
            .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
            .collect(),
    )
}

/// Convert a wire item into a JSON object.
///
/// Keys are sorted at every depth so the returned document is stable across
/// calls. Returns `None` when a contained number would lose digits as JSON.
#[must_use]
pub fn item_to_document(item: &Item) -> Option<Value> {
    let mut keys: Vec<&String> = item.keys().collect();
    keys.sort();

    let mut map = Map::with_capacity(item.len());
    for key in keys {
        map.insert(key.clone(), item[key].to_json()?);
    }
    Some(Value::Object(map))
}
