//! `Query` request builder.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use dynaquery_model::input::QueryInput;
use dynaquery_model::types::Select;

use super::{compile_fields, compile_filters, documents_from_items, non_empty};
use crate::error::DynaQueryResult;
use crate::expression::{ExpressionAttributes, compile_condition};
use crate::store::DocumentStore;

/// Sort order of a query over the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending sort key order.
    #[default]
    Ascending,
    /// Descending sort key order.
    Descending,
}

/// Builder for a `Query` request against one table or index.
#[derive(Debug)]
pub struct Query<S> {
    store: Arc<S>,
    table: String,
    key_condition: Value,
    filters: Vec<Value>,
    index: Option<String>,
    projection: Option<String>,
    limit: Option<i32>,
    order: Option<Order>,
    consistent: bool,
}

impl<S: DocumentStore> Query<S> {
    pub(crate) fn new(store: Arc<S>, table: String, key_condition: Value) -> Self {
        Self {
            store,
            table,
            key_condition,
            filters: Vec::new(),
            index: None,
            projection: None,
            limit: None,
            order: None,
            consistent: false,
        }
    }

    /// Query a secondary index instead of the table.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index = Some(name.into());
        self
    }

    /// Add a filter applied after the key condition. Repeated calls are
    /// conjoined.
    #[must_use]
    pub fn filter(mut self, query: Value) -> Self {
        self.filters.push(query);
        self
    }

    /// Only return the listed attributes (space- or comma-separated).
    #[must_use]
    pub fn select(mut self, fields: impl Into<String>) -> Self {
        self.projection = Some(fields.into());
        self
    }

    /// Evaluate at most `limit` items.
    #[must_use]
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Traverse the sort key in the given order.
    #[must_use]
    pub fn sort(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Use a strongly consistent read.
    #[must_use]
    pub fn consistent(mut self) -> Self {
        self.consistent = true;
        self
    }

    /// Compile the recorded documents into a request.
    pub fn build(&self) -> DynaQueryResult<QueryInput> {
        self.build_with(None)
    }

    fn build_with(&self, select: Option<Select>) -> DynaQueryResult<QueryInput> {
        let mut attributes = ExpressionAttributes::new();
        let key_condition = non_empty(compile_condition(&self.key_condition, &mut attributes)?);
        let filter = compile_filters(&self.filters, &mut attributes)?;
        // A count returns no attributes, so it carries no projection.
        let projection = match select {
            Some(Select::Count) => None,
            _ => compile_fields(self.projection.as_deref(), &mut attributes),
        };
        let (names, values) = attributes.into_parts();

        debug!(
            table = %self.table,
            index = ?self.index,
            key_condition = ?key_condition,
            filter = ?filter,
            projection = ?projection,
            "built query"
        );

        Ok(QueryInput {
            table_name: self.table.clone(),
            index_name: self.index.clone(),
            key_condition_expression: key_condition,
            filter_expression: filter,
            projection_expression: projection,
            expression_attribute_names: names,
            expression_attribute_values: values,
            scan_index_forward: self.order.map(|order| order == Order::Ascending),
            limit: self.limit,
            select,
            consistent_read: self.consistent.then_some(true),
        })
    }

    /// Run the query and return the matching documents.
    pub async fn exec(&self) -> DynaQueryResult<Vec<Value>> {
        let output = self.store.query(self.build()?).await?;
        documents_from_items(output.items)
    }

    /// Run the query and return the first matching document.
    pub async fn exec_one(&self) -> DynaQueryResult<Option<Value>> {
        Ok(self.exec().await?.into_iter().next())
    }

    /// Run the query as a count and return the number of matches.
    pub async fn count(&self) -> DynaQueryResult<i32> {
        let output = self.store.query(self.build_with(Some(Select::Count))?).await?;
        Ok(output.count)
    }
}
