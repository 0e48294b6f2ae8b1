//! Database and table handles.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use dynaquery_model::types::ReturnValue;

use crate::builder::{DeleteItem, Query, Scan, UpdateItem, WriteMode};
use crate::config::DatabaseConfig;
use crate::store::DocumentStore;

/// Entry point of the query builder: a store plus naming configuration.
pub struct Database<S> {
    store: Arc<S>,
    config: DatabaseConfig,
}

impl<S> Clone for Database<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S> fmt::Debug for Database<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore> Database<S> {
    /// Wrap `store` with the given configuration.
    #[must_use]
    pub fn new(store: S, config: DatabaseConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    /// Wrap an already shared store.
    #[must_use]
    pub fn from_arc(store: Arc<S>, config: DatabaseConfig) -> Self {
        Self { store, config }
    }

    /// A handle to `name`, with the configured prefix applied.
    #[must_use]
    pub fn table(&self, name: &str) -> Table<S> {
        self.raw_table(&self.config.table_name(name))
    }

    /// A handle to `name` exactly as given.
    #[must_use]
    pub fn raw_table(&self, name: &str) -> Table<S> {
        Table {
            store: Arc::clone(&self.store),
            name: name.to_owned(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// A handle to one table; every method starts a request builder.
pub struct Table<S> {
    store: Arc<S>,
    name: String,
}

impl<S> Clone for Table<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
        }
    }
}

impl<S> fmt::Debug for Table<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore> Table<S> {
    /// The physical table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query the items matching a key condition document.
    #[must_use]
    pub fn find(&self, query: Value) -> Query<S> {
        Query::new(Arc::clone(&self.store), self.name.clone(), query)
    }

    /// Query for a single item; use [`Query::exec_one`] to run it.
    #[must_use]
    pub fn find_one(&self, query: Value) -> Query<S> {
        self.find(query).limit(1)
    }

    /// Scan the whole table.
    #[must_use]
    pub fn scan(&self) -> Scan<S> {
        Scan::new(Arc::clone(&self.store), self.name.clone())
    }

    /// Update an existing item. The write fails if the item does not exist
    /// unless [`UpdateItem::upsert`] is called.
    #[must_use]
    pub fn update(&self, key: Value, update: Value) -> UpdateItem<S> {
        UpdateItem::new(
            Arc::clone(&self.store),
            self.name.clone(),
            key,
            update,
            WriteMode::Update,
        )
    }

    /// Create an item from `key` and `data`. The write fails if an item with
    /// the same key exists.
    ///
    /// Key attributes repeated in `data` are dropped; the key cannot be part
    /// of an update expression.
    #[must_use]
    pub fn insert(&self, key: Value, data: Value) -> UpdateItem<S> {
        let data = match (data, key.as_object()) {
            (Value::Object(fields), Some(key_fields)) => Value::Object(
                fields
                    .into_iter()
                    .filter(|(field, _)| !key_fields.contains_key(field))
                    .collect::<Map<_, _>>(),
            ),
            (data, _) => data,
        };
        let mut update = Map::new();
        update.insert("$set".to_owned(), data);
        UpdateItem::new(
            Arc::clone(&self.store),
            self.name.clone(),
            key,
            Value::Object(update),
            WriteMode::Insert,
        )
    }

    /// Delete an item.
    #[must_use]
    pub fn remove(&self, key: Value) -> DeleteItem<S> {
        DeleteItem::new(Arc::clone(&self.store), self.name.clone(), key)
    }

    /// Delete an item and return it as it was before the delete.
    #[must_use]
    pub fn find_one_and_remove(&self, key: Value) -> DeleteItem<S> {
        self.remove(key).return_values(ReturnValue::AllOld)
    }
}
