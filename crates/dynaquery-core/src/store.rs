//! The document store the query builder sends requests to.
//!
//! The builder never talks to the network itself. An application plugs in a
//! [`DocumentStore`] backed by its client of choice and the builders hand it
//! fully compiled inputs.

use async_trait::async_trait;
use dynaquery_model::ServiceError;
use dynaquery_model::input::{DeleteItemInput, QueryInput, ScanInput, UpdateItemInput};
use dynaquery_model::output::{DeleteItemOutput, QueryOutput, ScanOutput, UpdateItemOutput};

/// The operations the query builder issues against a DynamoDB-style store.
///
/// Implementations must be shareable across tasks; a [`Database`](crate::Database)
/// holds its store behind an `Arc`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the items matching a key condition.
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, ServiceError>;

    /// Read every item of a table or index, optionally filtered.
    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, ServiceError>;

    /// Create or modify an item.
    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, ServiceError>;

    /// Delete an item.
    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, ServiceError>;
}
