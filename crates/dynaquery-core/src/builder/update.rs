//! `UpdateItem` request builder, shared by updates, upserts and inserts.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use dynaquery_model::input::UpdateItemInput;
use dynaquery_model::types::ReturnValue;

use super::{compile_filters, key_from_document, non_empty, optional_document};
use crate::error::DynaQueryResult;
use crate::expression::{ExpressionAttributes, compile_update};
use crate::store::DocumentStore;

/// How an [`UpdateItem`] treats the existence of the target item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// The item must already exist.
    #[default]
    Update,
    /// The item is created if missing.
    Upsert,
    /// The item must not exist yet.
    Insert,
}

impl WriteMode {
    fn guard(self) -> Option<&'static str> {
        match self {
            Self::Update => Some("attribute_exists"),
            Self::Insert => Some("attribute_not_exists"),
            Self::Upsert => None,
        }
    }
}

/// Builder for an `UpdateItem` request.
#[derive(Debug)]
pub struct UpdateItem<S> {
    store: Arc<S>,
    table: String,
    key: Value,
    update: Value,
    mode: WriteMode,
    filters: Vec<Value>,
    return_values: ReturnValue,
}

impl<S: DocumentStore> UpdateItem<S> {
    pub(crate) fn new(
        store: Arc<S>,
        table: String,
        key: Value,
        update: Value,
        mode: WriteMode,
    ) -> Self {
        Self {
            store,
            table,
            key,
            update,
            mode,
            filters: Vec::new(),
            return_values: ReturnValue::AllNew,
        }
    }

    /// Create the item if it does not exist instead of failing.
    #[must_use]
    pub fn upsert(mut self) -> Self {
        self.mode = WriteMode::Upsert;
        self
    }

    /// Only apply the write if the stored item matches `query`. Repeated
    /// calls are conjoined.
    #[must_use]
    pub fn filter(mut self, query: Value) -> Self {
        self.filters.push(query);
        self
    }

    /// Choose which attributes the store returns (`ALL_NEW` by default).
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = return_values;
        self
    }

    /// The write mode this builder will use.
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Compile the recorded documents into a request.
    pub fn build(&self) -> DynaQueryResult<UpdateItemInput> {
        let key = key_from_document(&self.key)?;
        let mut attributes = ExpressionAttributes::new();
        let update = non_empty(compile_update(&self.update, &mut attributes)?);

        let guard = self.mode.guard().map(|function| {
            key_attributes(&self.key)
                .map(|attribute| {
                    format!("{function}({})", attributes.key_attribute_name(attribute))
                })
                .collect::<Vec<_>>()
                .join(" AND ")
        });
        let filter = compile_filters(&self.filters, &mut attributes)?;
        let condition = match (guard, filter) {
            (Some(guard), Some(filter)) => Some(format!("{guard} AND ({filter})")),
            (guard, filter) => guard.or(filter),
        };
        let (names, values) = attributes.into_parts();

        debug!(
            table = %self.table,
            mode = ?self.mode,
            update = ?update,
            condition = ?condition,
            "built update"
        );

        Ok(UpdateItemInput {
            table_name: self.table.clone(),
            key,
            update_expression: update,
            condition_expression: condition,
            expression_attribute_names: names,
            expression_attribute_values: values,
            return_values: Some(self.return_values),
        })
    }

    /// Run the write and return the document the store sent back, if any.
    pub async fn exec(&self) -> DynaQueryResult<Option<Value>> {
        let output = self.store.update_item(self.build()?).await?;
        optional_document(&output.attributes)
    }
}

/// Key attribute names in key-document order.
fn key_attributes(key: &Value) -> impl Iterator<Item = &str> {
    key.as_object()
        .into_iter()
        .flat_map(|map| map.keys().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use dynaquery_model::{AttributeValue, ServiceErrorCode, item_from_document};

    use super::*;
    use crate::error::DynaQueryError;
    use crate::testing::{RecordingStore, assert_no_dangling_placeholders};

    fn update(store: &Arc<RecordingStore>, key: Value, doc: Value) -> UpdateItem<RecordingStore> {
        UpdateItem::new(
            Arc::clone(store),
            "users".to_owned(),
            key,
            doc,
            WriteMode::Update,
        )
    }

    fn check(input: &UpdateItemInput) {
        for expression in [&input.update_expression, &input.condition_expression]
            .into_iter()
            .flatten()
        {
            assert_no_dangling_placeholders(
                expression,
                &input.expression_attribute_names,
                &input.expression_attribute_values,
            );
        }
    }

    #[test]
    fn test_should_guard_update_with_attribute_exists() {
        let store = Arc::new(RecordingStore::default());
        let input = update(&store, json!({"id": 1, "sk": "a"}), json!({"$set": {"name": "x"}}))
            .build()
            .unwrap();
        check(&input);
        assert_eq!(input.update_expression.as_deref(), Some("SET #k_name=:v_name"));
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_exists(#k_id) AND attribute_exists(#k_sk)")
        );
        assert_eq!(input.key["id"], AttributeValue::N("1".to_owned()));
        assert_eq!(input.return_values, Some(ReturnValue::AllNew));
    }

    #[test]
    fn test_should_guard_dotted_key_attribute_as_one_name() {
        let store = Arc::new(RecordingStore::default());
        let input = update(&store, json!({"a.b": 1}), json!({"$set": {"name": "x"}}))
            .build()
            .unwrap();
        check(&input);
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_exists(#k_a_b)")
        );
        assert_eq!(input.expression_attribute_names["#k_a_b"], "a.b");
        assert!(!input.expression_attribute_names.contains_key("#k_a"));
        assert!(!input.expression_attribute_names.contains_key("#k_b"));

        let insert = UpdateItem::new(
            Arc::clone(&store),
            "users".to_owned(),
            json!({"a.b": 1}),
            json!({"$set": {"name": "x"}}),
            WriteMode::Insert,
        )
        .build()
        .unwrap();
        assert_eq!(
            insert.condition_expression.as_deref(),
            Some("attribute_not_exists(#k_a_b)")
        );
    }

    #[test]
    fn test_should_not_guard_upsert() {
        let store = Arc::new(RecordingStore::default());
        let input = update(&store, json!({"id": 1}), json!({"$inc": {"n": 1}}))
            .upsert()
            .build()
            .unwrap();
        assert_eq!(input.condition_expression, None);
        assert!(!input.expression_attribute_names.contains_key("#k_id"));
    }

    #[test]
    fn test_should_combine_guard_with_filter() {
        let store = Arc::new(RecordingStore::default());
        let input = update(&store, json!({"id": 1}), json!({"$set": {"status": "done"}}))
            .filter(json!({"status": "open"}))
            .build()
            .unwrap();
        check(&input);
        assert_eq!(
            input.update_expression.as_deref(),
            Some("SET #k_status=:v_status")
        );
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_exists(#k_id) AND (#k_status=:v_status_1)")
        );
    }

    #[test]
    fn test_should_use_filter_alone_for_upsert() {
        let store = Arc::new(RecordingStore::default());
        let input = update(&store, json!({"id": 1}), json!({"$set": {"a": 1}}))
            .upsert()
            .filter(json!({"$or": [{"v": 1}, {"v": {"$exists": false}}]}))
            .build()
            .unwrap();
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("#k_v=:v_v OR attribute_not_exists(#k_v)")
        );
    }

    #[test]
    fn test_should_omit_empty_update_expression() {
        let store = Arc::new(RecordingStore::default());
        let input = update(&store, json!({"id": 1}), json!({})).build().unwrap();
        assert_eq!(input.update_expression, None);
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_exists(#k_id)")
        );
    }

    #[test]
    fn test_should_reject_invalid_key() {
        let store = Arc::new(RecordingStore::default());
        let err = update(&store, json!({}), json!({"$set": {"a": 1}}))
            .build()
            .unwrap_err();
        assert!(matches!(err, DynaQueryError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_should_return_updated_document() {
        let item = item_from_document(&json!({"id": 1, "name": "x"})).unwrap();
        let store = Arc::new(RecordingStore::with_items(vec![item]));
        let document = update(&store, json!({"id": 1}), json!({"$set": {"name": "x"}}))
            .exec()
            .await
            .unwrap();
        assert_eq!(document, Some(json!({"id": 1, "name": "x"})));
    }

    #[tokio::test]
    async fn test_should_report_missing_item_as_conditional_failure() {
        let store = Arc::new(RecordingStore::default());
        store.fail_with(ServiceErrorCode::ConditionalCheckFailedException);
        let err = update(&store, json!({"id": 1}), json!({"$set": {"a": 1}}))
            .return_values(ReturnValue::None)
            .exec()
            .await
            .unwrap_err();
        assert!(err.is_conditional_check_failed());
        assert_eq!(
            store.updates.lock()[0].return_values,
            Some(ReturnValue::None)
        );
    }
}
