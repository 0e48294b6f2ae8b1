//! Errors reported by a document store.
//!
//! A `DocumentStore` maps whatever its client returns onto a
//! [`ServiceError`]. Callers mostly care about one distinction: whether a
//! conditional write was rejected, which the query builder uses to signal a
//! missing item on update or an existing item on insert.

/// Failure classes a store can report.
///
/// The names match the short form of the `__type` field in JSON error
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ServiceErrorCode {
    /// The table or index does not exist.
    ResourceNotFoundException,
    /// The condition attached to a write did not hold.
    ConditionalCheckFailedException,
    /// Throughput for the table was exhausted.
    ProvisionedThroughputExceededException,
    /// Account-level request rate was exhausted.
    RequestLimitExceeded,
    /// The request was malformed (bad expression, unused placeholder, ...).
    #[default]
    ValidationException,
    /// The caller is not allowed to perform the request.
    AccessDeniedException,
    /// Anything the store could not classify.
    InternalServerError,
}

const CODES: &[(ServiceErrorCode, &str)] = &[
    (
        ServiceErrorCode::ResourceNotFoundException,
        "ResourceNotFoundException",
    ),
    (
        ServiceErrorCode::ConditionalCheckFailedException,
        "ConditionalCheckFailedException",
    ),
    (
        ServiceErrorCode::ProvisionedThroughputExceededException,
        "ProvisionedThroughputExceededException",
    ),
    (
        ServiceErrorCode::RequestLimitExceeded,
        "RequestLimitExceeded",
    ),
    (ServiceErrorCode::ValidationException, "ValidationException"),
    (
        ServiceErrorCode::AccessDeniedException,
        "AccessDeniedException",
    ),
    (ServiceErrorCode::InternalServerError, "InternalServerError"),
];

impl ServiceErrorCode {
    /// The short code string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        CODES
            .iter()
            .find(|(code, _)| *code == self)
            .map_or("InternalServerError", |(_, name)| *name)
    }

    /// Classify a `__type` value, qualified
    /// (`com.amazonaws.dynamodb.v20120810#ValidationException`) or not.
    /// Unrecognized types become [`Self::InternalServerError`].
    #[must_use]
    pub fn from_error_type(error_type: &str) -> Self {
        let short = error_type.rsplit('#').next().unwrap_or(error_type);
        CODES
            .iter()
            .find(|(_, name)| *name == short)
            .map_or(Self::InternalServerError, |(code, _)| *code)
    }
}

impl std::fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by the store.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// What kind of failure this is.
    pub code: ServiceErrorCode,
    /// The store's message.
    pub message: String,
    /// The client error this was mapped from, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ServiceError {
    /// Create an error with `code` and `message`.
    #[must_use]
    pub fn with_message(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying client error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// A rejected conditional write.
    #[must_use]
    pub fn conditional_check_failed(message: impl Into<String>) -> Self {
        Self::with_message(ServiceErrorCode::ConditionalCheckFailedException, message)
    }

    /// A missing table or index.
    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::with_message(ServiceErrorCode::ResourceNotFoundException, message)
    }

    /// A malformed request.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(ServiceErrorCode::ValidationException, message)
    }

    /// Returns `true` when a write was rejected by its condition.
    #[must_use]
    pub fn is_conditional_check_failed(&self) -> bool {
        self.code == ServiceErrorCode::ConditionalCheckFailedException
    }
}
