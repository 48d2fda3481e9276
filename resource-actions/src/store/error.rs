//! Document store error types
//!
//! Store errors are produced by [`DocumentStore`](super::DocumentStore)
//! implementations and travel unchanged through action bodies to the
//! dispatch layer. The registry never retries or translates them.
//!
//! # Example
//!
//! ```rust
//! use resource_actions::store::{StoreError, StoreErrorKind};
//!
//! let error = StoreError::invalid_id("posts", "not-a-uuid");
//! assert!(matches!(error.kind, StoreErrorKind::InvalidId));
//! assert_eq!(error.document_id.as_deref(), Some("not-a-uuid"));
//! ```

use std::fmt;

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Inserting a single document
    CreateOne,
    /// Reading all documents matching a filter
    ReadMany,
    /// Applying a partial document to one document
    UpdateOneById,
    /// Reading one document by identifier
    ReadOneById,
    /// Removing one document by identifier and returning it
    PopOneById,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateOne => write!(f, "create_one"),
            Self::ReadMany => write!(f, "read_many"),
            Self::UpdateOneById => write!(f, "update_one_by_id"),
            Self::ReadOneById => write!(f, "read_one_by_id"),
            Self::PopOneById => write!(f, "pop_one_by_id"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Identifier is not in the format the store issues
    InvalidId,
    /// Store could not be reached or refused the operation
    Unavailable,
    /// Filter or sort specification could not be executed
    QueryFailed,
    /// Document could not be encoded or decoded
    Serialization,
    /// Other unclassified error
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "invalid_id"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::Serialization => write!(f, "serialization"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The resource (collection) involved
    pub resource: Option<String>,
    /// The identifier of the document involved
    pub document_id: Option<String>,
}

impl StoreError {
    /// Create a new store error
    pub fn new(
        operation: StoreOperation,
        kind: StoreErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            resource: None,
            document_id: None,
        }
    }

    /// Create an "invalid identifier" error
    ///
    /// The operation defaults to [`StoreOperation::ReadOneById`]; use
    /// [`with_operation`](Self::with_operation) to narrow it.
    pub fn invalid_id(resource: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::ReadOneById,
            StoreErrorKind::InvalidId,
            "Malformed document identifier",
        )
        .with_document(resource, document_id)
    }

    /// Create an "unavailable" error
    pub fn unavailable(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Unavailable, message)
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::ReadMany,
            StoreErrorKind::QueryFailed,
            message,
        )
    }

    /// Create a serialization error
    pub fn serialization(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Serialization, message)
    }

    /// Attach the resource and document involved
    #[must_use]
    pub fn with_document(
        mut self,
        resource: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        self.resource = Some(resource.into());
        self.document_id = Some(document_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: StoreOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is transient
    ///
    /// Purely informational: nothing in this crate retries.
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Unavailable)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match (&self.resource, &self.document_id) {
            (Some(resource), Some(id)) => write!(f, " [{}: {}]", resource, id)?,
            (Some(resource), None) => write!(f, " [{}]", resource)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}
