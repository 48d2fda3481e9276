//! Document store collaborator contract
//!
//! The registry reaches persistence exclusively through [`DocumentStore`].
//! Methods use RPITIT (Return Position Impl Trait In Traits) so stores can be
//! written with plain `async fn` bodies.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_actions::store::{Document, DocumentId, DocumentStore, Filter, SortSpec, StoreResult};
//!
//! struct PostsCollection { /* driver handle */ }
//!
//! impl DocumentStore for PostsCollection {
//!     fn name(&self) -> &str {
//!         "posts"
//!     }
//!
//!     async fn create_one(&self, document: Document) -> StoreResult<DocumentId> {
//!         // insert and return the store-issued identifier
//!         todo!()
//!     }
//!
//!     // ... other required methods
//! }
//! ```

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::StoreError;

/// Identifier field a store writes unless it says otherwise
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Last-updated field a store writes unless it says otherwise
pub const DEFAULT_UPDATED_AT_FIELD: &str = "_updatedAt";

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A schemaless document: a JSON object
pub type Document = Map<String, Value>;

/// A filter expression in the store's own query language
///
/// The registry passes filters through untouched; interpretation belongs to
/// the store.
pub type Filter = Map<String, Value>;

/// Opaque, store-issued document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw identifier
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::String(id.0)
    }
}

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Sort in ascending order (oldest, smallest first)
    #[default]
    Ascending,
    /// Sort in descending order (newest, largest first)
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Single-field sort specification passed to [`DocumentStore::read_many`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Document field to sort on
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort ascending on `field`
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Sort descending on `field`
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Document store collaborator bound to a single resource (collection)
///
/// All operations are asynchronous and may fail with store-specific errors.
/// Identifiers are opaque values issued by the store and distinct from
/// application data.
pub trait DocumentStore: Send + Sync {
    /// Name of the resource this store serves
    ///
    /// The registry takes its own name from here at construction.
    fn name(&self) -> &str;

    /// Document field the store writes the identifier under
    fn id_field(&self) -> &str {
        DEFAULT_ID_FIELD
    }

    /// Document field the store stamps on every write
    ///
    /// Reads sort on this field, so it must be the one the store maintains.
    fn updated_at_field(&self) -> &str {
        DEFAULT_UPDATED_AT_FIELD
    }

    /// Insert one document and return its generated identifier
    fn create_one(
        &self,
        document: Document,
    ) -> impl Future<Output = StoreResult<DocumentId>> + Send;

    /// Return every document matching `filter`, ordered by `sort`
    fn read_many(
        &self,
        filter: &Filter,
        sort: &SortSpec,
    ) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Apply the fields of `patch` to the identified document
    ///
    /// Returns `Ok(false)` when no document matched.
    fn update_one_by_id(
        &self,
        id: &DocumentId,
        patch: Document,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Fetch one document by identifier
    fn read_one_by_id(
        &self,
        id: &DocumentId,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    /// Remove one document by identifier, returning it if it existed
    fn pop_one_by_id(
        &self,
        id: &DocumentId,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;
}
