//! # resource-actions
//!
//! Per-resource action registry for document-backed services. Bind named
//! operations to action bodies, guard them with ordered validator chains, and
//! hand the composed chain to whatever dispatch layer serves the resource.
//!
//! ## Features
//!
//! - **Define-once registry**: duplicate names fail at setup, unknown names fail at lookup
//! - **Validator chains**: validators always run before the body, in registration order
//! - **CRUD generators**: `create`, `read`, `update`, `delete` over a [`DocumentStore`](store::DocumentStore)
//! - **Sync hooks**: follow-up actions recorded per name
//! - **Axum integration**: responses and errors implement `IntoResponse`
//! - **Layered configuration**: defaults, TOML files, and environment variables via Figment
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use resource_actions::prelude::*;
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let config = Config::default();
//! let store = Arc::new(MemoryStore::new("posts"));
//!
//! let mut posts = ActionRegistry::with_conventions(store, config.conventions.clone());
//! posts.create(None)?;
//! posts.read(None)?;
//! posts.update(None)?;
//! posts.delete(None)?;
//!
//! let posts = Arc::new(posts);
//! let response = posts
//!     .handlers("create")?
//!     .execute(ActionRequest::new(json!({"document": {"title": "hello"}})))
//!     .await?;
//! assert_eq!(response.body["document"]["title"], "hello");
//! # Ok::<(), Error>(())
//! # }).unwrap();
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod observability;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::{
        action_fn, action_names, validator_fn, Action, ActionContext, ActionError,
        ActionOptions, ActionRegistry, ActionRequest, ActionResponse, Handler, HandlerChain,
        RegistryError, Validator,
    };
    pub use crate::config::{Config, Conventions, ServiceConfig};
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::observability::init_tracing;
    pub use crate::store::{
        Document, DocumentId, DocumentStore, Filter, SortDirection, SortSpec, StoreError,
        StoreErrorKind, StoreOperation, StoreResult,
    };

    #[cfg(feature = "memory-store")]
    pub use crate::store::MemoryStore;

    pub use async_trait::async_trait;
}
