//! Document store collaborator
//!
//! - [`DocumentStore`]: the narrow interface the CRUD generators call
//! - [`StoreError`]: structured errors that propagate unchanged to dispatch
//! - [`MemoryStore`]: in-process reference implementation (`memory-store` feature)

mod error;
mod traits;

#[cfg(feature = "memory-store")]
pub mod memory;

pub use error::{StoreError, StoreErrorKind, StoreOperation};
pub use traits::{
    Document, DocumentId, DocumentStore, Filter, SortDirection, SortSpec, StoreResult,
    DEFAULT_ID_FIELD, DEFAULT_UPDATED_AT_FIELD,
};

#[cfg(feature = "memory-store")]
pub use memory::MemoryStore;
