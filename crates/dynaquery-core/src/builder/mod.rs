//! Request builders.
//!
//! Builders only record the documents they are given. Compilation happens in
//! `build()`, which threads one [`ExpressionAttributes`] through every
//! expression of the request, so `build()` can be called any number of times
//! (for example once per retry) and always yields the same input.

mod delete;
mod query;
mod scan;
mod update;

pub use delete::DeleteItem;
pub use query::{Order, Query};
pub use scan::Scan;
pub use update::{UpdateItem, WriteMode};

use serde_json::Value;

use dynaquery_model::{Item, item_from_document, item_to_document};

use crate::error::{DynaQueryError, DynaQueryResult};
use crate::expression::{ExpressionAttributes, compile_condition, compile_projection};

/// Compile every filter into one condition.
///
/// Filters are combined as `(<previous>) AND (<next>)`; filters that compile
/// to nothing are skipped.
pub(crate) fn compile_filters(
    filters: &[Value],
    attributes: &mut ExpressionAttributes,
) -> DynaQueryResult<Option<String>> {
    let mut combined: Option<String> = None;
    for filter in filters {
        let expression = compile_condition(filter, attributes)?;
        if expression.is_empty() {
            continue;
        }
        combined = Some(match combined {
            Some(previous) => format!("({previous}) AND ({expression})"),
            None => expression,
        });
    }
    Ok(combined)
}

/// Compile an optional field list.
pub(crate) fn compile_fields(
    fields: Option<&str>,
    attributes: &mut ExpressionAttributes,
) -> Option<String> {
    fields
        .map(|fields| compile_projection(fields, attributes))
        .and_then(non_empty)
}

/// Convert a key document into a wire key.
pub(crate) fn key_from_document(key: &Value) -> DynaQueryResult<Item> {
    match item_from_document(key) {
        Some(item) if !item.is_empty() => Ok(item),
        Some(_) => Err(DynaQueryError::InvalidKey(
            "a key needs at least one attribute".to_owned(),
        )),
        None => Err(DynaQueryError::InvalidKey(format!(
            "a key must be a document, got {key}"
        ))),
    }
}

/// Convert returned items back into JSON documents.
pub(crate) fn documents_from_items(items: Vec<Item>) -> DynaQueryResult<Vec<Value>> {
    items.iter().map(document_from_item).collect()
}

/// Convert one returned item; an empty attribute map means no item.
pub(crate) fn optional_document(item: &Item) -> DynaQueryResult<Option<Value>> {
    if item.is_empty() {
        return Ok(None);
    }
    document_from_item(item).map(Some)
}

fn document_from_item(item: &Item) -> DynaQueryResult<Value> {
    item_to_document(item).ok_or_else(|| {
        DynaQueryError::Marshal("item holds a number JSON cannot represent".to_owned())
    })
}

/// `None` for an empty expression, so it is omitted from the request.
pub(crate) fn non_empty(expression: String) -> Option<String> {
    (!expression.is_empty()).then_some(expression)
}
