//! Errors raised while compiling query and update documents.

/// A malformed query or update document.
///
/// These are usage errors detected before anything is sent to the store, so
/// they are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A value placeholder was requested without a value to bind.
    #[error("Invalid value for '{key}': a placeholder needs a concrete value")]
    InvalidValue {
        /// The attribute the value was meant for.
        key: String,
    },
    /// A condition document is structurally invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// An operator outside the supported vocabulary was used.
    #[error("Unknown operator: {operator}")]
    UnknownOperator {
        /// The offending operator key, including its `$`.
        operator: String,
    },
    /// An update document is structurally invalid.
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),
}
