//! MongoDB-style query builder for DynamoDB-style document stores.
//!
//! Query, update and projection documents written in a MongoDB-like dialect
//! (`{"age": {"$gt": 18}}`, `{"$set": {...}, "$inc": {...}}`) are compiled
//! into the textual condition, update and projection expressions a
//! DynamoDB-style store accepts, together with the placeholder maps those
//! expressions reference.
//!
//! The [`expression`] module holds the compilers and can be used on its own.
//! [`Database`] and [`Table`] wrap a [`DocumentStore`] and hand out request
//! builders that compile lazily and send the result through the store.
//!
//! ```
//! use dynaquery_core::expression::ConditionResult;
//! use serde_json::json;
//!
//! let result = ConditionResult::parse(&json!({"id": {"$in": [1, 2]}}), None).unwrap();
//! assert_eq!(result.condition_expression, "#k_id IN (:v_id_0,:v_id_1)");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod expression;
pub mod store;
mod table;

#[cfg(test)]
mod testing;

pub use builder::{DeleteItem, Order, Query, Scan, UpdateItem, WriteMode};
pub use config::DatabaseConfig;
pub use error::{DynaQueryError, DynaQueryResult};
pub use store::DocumentStore;
pub use table::{Database, Table};
