//! Per-resource action registry
//!
//! This module binds named operations to action bodies, guards each with an
//! optional validator chain, and composes both into a [`HandlerChain`] that a
//! dispatcher can execute.
//!
//! # Features
//!
//! - **Registry**: [`ActionRegistry`] with define-once semantics
//! - **Composition**: [`ActionRegistry::handlers`] yields `[validators..., body]`
//! - **CRUD generators**: `create`, `read`, `update`, `delete` over a
//!   [`DocumentStore`](crate::store::DocumentStore)
//! - **Sync hooks**: follow-up actions recorded per name for observers
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use resource_actions::actions::{
//!     action_fn, validator_fn, ActionError, ActionOptions, ActionRegistry, ActionResponse,
//! };
//! use resource_actions::store::MemoryStore;
//! use serde_json::json;
//!
//! let mut posts = ActionRegistry::new(Arc::new(MemoryStore::new("posts")));
//! posts.create(None).unwrap();
//!
//! let non_empty = validator_fn(|ctx| {
//!     Box::pin(async move {
//!         match ctx.request().payload.as_object() {
//!             Some(body) if !body.is_empty() => Ok(()),
//!             _ => Err(ActionError::validation("empty body")),
//!         }
//!     })
//! });
//! let publish = action_fn(|ctx| {
//!     Box::pin(async move { ctx.respond(ActionResponse::ok(json!({"published": true}))) })
//! });
//! posts
//!     .define_action("publish", publish, Some(ActionOptions::new().validator(non_empty)))
//!     .unwrap();
//!
//! assert_eq!(posts.handlers("publish").unwrap().len(), 2);
//! assert!(posts.define_action("create", action_fn(|ctx| Box::pin(async move {
//!     ctx.respond(ActionResponse::ok(json!(null)))
//! })), None).is_err());
//! ```

mod context;
mod crud;
mod error;
mod handler;
mod registry;

pub use context::{ActionContext, ActionRequest, ActionResponse};
pub use crud::{
    action_names, CreateAction, DeleteAction, ReadAction, UpdateAction, DOCUMENTS_KEY,
    DOCUMENT_KEY,
};
pub use error::{ActionError, RegistryError};
pub use handler::{action_fn, validator_fn, Action, Handler, HandlerChain, StageFuture, Validator};
pub use registry::{ActionOptions, ActionRegistry};
