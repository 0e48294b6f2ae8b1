//! Test helpers: an in-memory recording store and expression checks.

use std::collections::HashMap;
use std::sync::Once;

use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;

use dynaquery_model::input::{DeleteItemInput, QueryInput, ScanInput, UpdateItemInput};
use dynaquery_model::output::{DeleteItemOutput, QueryOutput, ScanOutput, UpdateItemOutput};
use dynaquery_model::types::Select;
use dynaquery_model::{AttributeValue, Item, ServiceError, ServiceErrorCode};

use crate::store::DocumentStore;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub(crate) fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Assert every placeholder in `expression` has an entry in its map.
pub(crate) fn assert_no_dangling_placeholders(
    expression: &str,
    names: &HashMap<String, String>,
    values: &HashMap<String, AttributeValue>,
) {
    let name_token = Regex::new(r"#k_[A-Za-z0-9_]+").unwrap();
    let value_token = Regex::new(r":_?v_[A-Za-z0-9_]+").unwrap();

    for token in name_token.find_iter(expression) {
        assert!(
            names.contains_key(token.as_str()),
            "dangling name token {} in {expression}",
            token.as_str()
        );
    }
    for token in value_token.find_iter(expression) {
        assert!(
            values.contains_key(token.as_str()),
            "dangling value token {} in {expression}",
            token.as_str()
        );
    }
}

/// A [`DocumentStore`] that records every input and answers with canned items.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    pub(crate) queries: Mutex<Vec<QueryInput>>,
    pub(crate) scans: Mutex<Vec<ScanInput>>,
    pub(crate) updates: Mutex<Vec<UpdateItemInput>>,
    pub(crate) deletes: Mutex<Vec<DeleteItemInput>>,
    items: Mutex<Vec<Item>>,
    failure: Mutex<Option<ServiceErrorCode>>,
}

impl RecordingStore {
    /// A store answering every read with `items` and every write with the
    /// first of them.
    pub(crate) fn with_items(items: Vec<Item>) -> Self {
        let store = Self::default();
        *store.items.lock() = items;
        store
    }

    /// Make every subsequent call fail with `code`.
    pub(crate) fn fail_with(&self, code: ServiceErrorCode) {
        *self.failure.lock() = Some(code);
    }

    fn check(&self) -> Result<(), ServiceError> {
        match *self.failure.lock() {
            Some(code) => Err(ServiceError::with_message(code, "injected failure")),
            None => Ok(()),
        }
    }

    fn first_item(&self) -> Item {
        self.items.lock().first().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, ServiceError> {
        let limit = input.limit;
        let select = input.select;
        self.queries.lock().push(input);
        self.check()?;

        let mut items = self.items.lock().clone();
        if let Some(limit) = limit {
            items.truncate(usize::try_from(limit).unwrap());
        }
        let count = i32::try_from(items.len()).unwrap();
        if select == Some(Select::Count) {
            items.clear();
        }
        Ok(QueryOutput {
            items,
            count,
            scanned_count: count,
            ..QueryOutput::default()
        })
    }

    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, ServiceError> {
        let limit = input.limit;
        let select = input.select;
        self.scans.lock().push(input);
        self.check()?;

        let mut items = self.items.lock().clone();
        if let Some(limit) = limit {
            items.truncate(usize::try_from(limit).unwrap());
        }
        let count = i32::try_from(items.len()).unwrap();
        if select == Some(Select::Count) {
            items.clear();
        }
        Ok(ScanOutput {
            items,
            count,
            scanned_count: count,
            ..ScanOutput::default()
        })
    }

    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, ServiceError> {
        self.updates.lock().push(input);
        self.check()?;
        Ok(UpdateItemOutput {
            attributes: self.first_item(),
        })
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, ServiceError> {
        self.deletes.lock().push(input);
        self.check()?;
        Ok(DeleteItemOutput {
            attributes: self.first_item(),
        })
    }
}
