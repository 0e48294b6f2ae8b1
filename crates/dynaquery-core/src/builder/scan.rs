//! `Scan` request builder.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use dynaquery_model::input::ScanInput;
use dynaquery_model::types::Select;

use super::{compile_fields, compile_filters, documents_from_items};
use crate::error::DynaQueryResult;
use crate::expression::ExpressionAttributes;
use crate::store::DocumentStore;

/// Builder for a `Scan` request over a whole table or index.
#[derive(Debug)]
pub struct Scan<S> {
    store: Arc<S>,
    table: String,
    filters: Vec<Value>,
    index: Option<String>,
    projection: Option<String>,
    limit: Option<i32>,
    consistent: bool,
}

impl<S: DocumentStore> Scan<S> {
    pub(crate) fn new(store: Arc<S>, table: String) -> Self {
        Self {
            store,
            table,
            filters: Vec::new(),
            index: None,
            projection: None,
            limit: None,
            consistent: false,
        }
    }

    /// Scan a secondary index instead of the table.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index = Some(name.into());
        self
    }

    /// Add a filter. Repeated calls are conjoined.
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

    /// Use a strongly consistent read.
    #[must_use]
    pub fn consistent(mut self) -> Self {
        self.consistent = true;
        self
    }

    /// Compile the recorded documents into a request.
    pub fn build(&self) -> DynaQueryResult<ScanInput> {
        self.build_with(None)
    }

    fn build_with(&self, select: Option<Select>) -> DynaQueryResult<ScanInput> {
        let mut attributes = ExpressionAttributes::new();
        let filter = compile_filters(&self.filters, &mut attributes)?;
        let projection = match select {
            Some(Select::Count) => None,
            _ => compile_fields(self.projection.as_deref(), &mut attributes),
        };
        let (names, values) = attributes.into_parts();

        debug!(
            table = %self.table,
            index = ?self.index,
            filter = ?filter,
            projection = ?projection,
            "built scan"
        );

        Ok(ScanInput {
            table_name: self.table.clone(),
            index_name: self.index.clone(),
            filter_expression: filter,
            projection_expression: projection,
            expression_attribute_names: names,
            expression_attribute_values: values,
            limit: self.limit,
            select,
            consistent_read: self.consistent.then_some(true),
        })
    }

    /// Run the scan and return the matching documents.
    pub async fn exec(&self) -> DynaQueryResult<Vec<Value>> {
        let output = self.store.scan(self.build()?).await?;
        documents_from_items(output.items)
    }

    /// Run the scan as a count and return the number of matches.
    pub async fn count(&self) -> DynaQueryResult<i32> {
        let output = self.store.scan(self.build_with(Some(Select::Count))?).await?;
        Ok(output.count)
    }
}
