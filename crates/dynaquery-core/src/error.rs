//! Error types for the query builder.

use dynaquery_model::ServiceError;

use crate::expression::CompileError;

/// Errors raised while building or executing a request.
#[derive(Debug, thiserror::Error)]
pub enum DynaQueryError {
    /// A query, update or projection could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The key document is not a non-empty document.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The store rejected the request.
    #[error(transparent)]
    Store(#[from] ServiceError),

    /// A returned item could not be converted back into a document.
    #[error("cannot convert item: {0}")]
    Marshal(String),
}

impl DynaQueryError {
    /// Returns `true` if the store rejected a write because its condition
    /// did not hold (the item already existed on insert, or was missing on
    /// update).
    #[must_use]
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_conditional_check_failed())
    }
}

/// Convenience result type for query builder operations.
pub type DynaQueryResult<T> = Result<T, DynaQueryError>;
