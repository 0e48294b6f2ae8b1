//! `DeleteItem` request builder.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use dynaquery_model::input::DeleteItemInput;
use dynaquery_model::types::ReturnValue;

use super::{compile_filters, key_from_document, optional_document};
use crate::error::DynaQueryResult;
use crate::expression::ExpressionAttributes;
use crate::store::DocumentStore;

/// Builder for a `DeleteItem` request.
#[derive(Debug)]
pub struct DeleteItem<S> {
    store: Arc<S>,
    table: String,
    key: Value,
    filters: Vec<Value>,
    return_values: Option<ReturnValue>,
}

impl<S: DocumentStore> DeleteItem<S> {
    pub(crate) fn new(store: Arc<S>, table: String, key: Value) -> Self {
        Self {
            store,
            table,
            key,
            filters: Vec::new(),
            return_values: None,
        }
    }

    /// Only delete the item if it matches `query`. Repeated calls are
    /// conjoined.
    #[must_use]
    pub fn filter(mut self, query: Value) -> Self {
        self.filters.push(query);
        self
    }

    /// Ask the store to return the deleted item's attributes.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Compile the recorded documents into a request.
    pub fn build(&self) -> DynaQueryResult<DeleteItemInput> {
        let key = key_from_document(&self.key)?;
        let mut attributes = ExpressionAttributes::new();
        let condition = compile_filters(&self.filters, &mut attributes)?;
        let (names, values) = attributes.into_parts();

        debug!(table = %self.table, condition = ?condition, "built delete");

        Ok(DeleteItemInput {
            table_name: self.table.clone(),
            key,
            condition_expression: condition,
            expression_attribute_names: names,
            expression_attribute_values: values,
            return_values: self.return_values,
        })
    }

    /// Run the delete and return the old document when it was requested.
    pub async fn exec(&self) -> DynaQueryResult<Option<Value>> {
        let output = self.store.delete_item(self.build()?).await?;
        optional_document(&output.attributes)
    }
}
