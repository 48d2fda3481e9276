//! Built-in CRUD action generators
//!
//! Each generator builds an action body closed over the registry's store and
//! conventions, then registers it under a canonical name through
//! [`ActionRegistry::define_action`]. Validator options are forwarded
//! unchanged; the bodies perform no validation of their own beyond reading
//! their input fields.
//!
//! | Generator | Name | Reads | Responds with |
//! |-----------|------|-------|---------------|
//! | [`create`](ActionRegistry::create) | `create` | `document` | `{document}` including the new id (201) |
//! | [`read`](ActionRegistry::read) | `read` | `filter` | `{documents}` newest first |
//! | [`update`](ActionRegistry::update) | `update` | `id` param, `partialDocument` | `{document}` as stored after the patch |
//! | [`delete`](ActionRegistry::delete) | `delete` | `id` param | `{document}` removed, or `null` |
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use resource_actions::actions::{ActionRegistry, ActionRequest};
//! use resource_actions::store::MemoryStore;
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut posts = ActionRegistry::new(Arc::new(MemoryStore::new("posts")));
//! posts.create(None).unwrap();
//! posts.read(None).unwrap();
//!
//! let created = posts
//!     .handlers("create")
//!     .unwrap()
//!     .execute(ActionRequest::new(json!({"document": {"title": "x"}})))
//!     .await
//!     .unwrap();
//! assert_eq!(created.body["document"]["title"], "x");
//! # });
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::context::{ActionContext, ActionRequest, ActionResponse};
use super::error::{ActionError, RegistryError};
use super::handler::Action;
use super::registry::{ActionOptions, ActionRegistry};
use crate::config::Conventions;
use crate::store::{Document, DocumentId, DocumentStore, Filter, SortSpec};

/// Canonical names of the built-in actions
pub mod action_names {
    /// Insert one document
    pub const CREATE: &str = "create";
    /// Read matching documents, newest first
    pub const READ: &str = "read";
    /// Patch one document and return its new state
    pub const UPDATE: &str = "update";
    /// Remove one document and return it
    pub const DELETE: &str = "delete";
}

/// Response field carrying a single document
pub const DOCUMENT_KEY: &str = "document";

/// Response field carrying a list of documents
pub const DOCUMENTS_KEY: &str = "documents";

/// Body of the `create` action
pub struct CreateAction<S> {
    store: Arc<S>,
    conventions: Conventions,
}

/// Body of the `read` action
pub struct ReadAction<S> {
    store: Arc<S>,
    conventions: Conventions,
}

/// Body of the `update` action
pub struct UpdateAction<S> {
    store: Arc<S>,
    conventions: Conventions,
}

/// Body of the `delete` action
pub struct DeleteAction<S> {
    store: Arc<S>,
    conventions: Conventions,
}

macro_rules! impl_new {
    ($($ty:ident),*) => {
        $(
            impl<S> $ty<S> {
                /// Bind the body to a store and field conventions
                pub fn new(store: Arc<S>, conventions: Conventions) -> Self {
                    Self { store, conventions }
                }
            }
        )*
    };
}

impl_new!(CreateAction, ReadAction, UpdateAction, DeleteAction);

#[async_trait]
impl<S: DocumentStore + 'static> Action for CreateAction<S> {
    async fn invoke(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let mut document = required_object(
            ctx.request(),
            action_names::CREATE,
            &self.conventions.document_field,
        )?;

        let id = self.store.create_one(document.clone()).await?;
        tracing::debug!(resource = %self.store.name(), id = %id, "document created");

        document.insert(self.store.id_field().to_string(), id.into());
        ctx.respond(ActionResponse::created(json!({ DOCUMENT_KEY: document })))
    }
}

#[async_trait]
impl<S: DocumentStore + 'static> Action for ReadAction<S> {
    async fn invoke(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let filter = optional_object(
            ctx.request(),
            action_names::READ,
            &self.conventions.filter_field,
        )?;
        let sort = SortSpec::descending(self.store.updated_at_field());

        let documents = self.store.read_many(&filter, &sort).await?;
        tracing::debug!(
            resource = %self.store.name(),
            matched = documents.len(),
            "documents read"
        );

        ctx.respond(ActionResponse::ok(json!({ DOCUMENTS_KEY: documents })))
    }
}

#[async_trait]
impl<S: DocumentStore + 'static> Action for UpdateAction<S> {
    async fn invoke(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let id = required_id(ctx.request(), action_names::UPDATE, &self.conventions.id_param)?;
        let patch = required_object(
            ctx.request(),
            action_names::UPDATE,
            &self.conventions.patch_field,
        )?;

        let matched = self.store.update_one_by_id(&id, patch).await?;
        // respond with the stored state, never the patch itself
        let document = self.store.read_one_by_id(&id).await?;
        tracing::debug!(resource = %self.store.name(), id = %id, matched, "document updated");

        ctx.respond(ActionResponse::ok(json!({ DOCUMENT_KEY: nullable(document) })))
    }
}

#[async_trait]
impl<S: DocumentStore + 'static> Action for DeleteAction<S> {
    async fn invoke(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let id = required_id(ctx.request(), action_names::DELETE, &self.conventions.id_param)?;

        let removed = self.store.pop_one_by_id(&id).await?;
        tracing::debug!(
            resource = %self.store.name(),
            id = %id,
            removed = removed.is_some(),
            "document deleted"
        );

        ctx.respond(ActionResponse::ok(json!({ DOCUMENT_KEY: nullable(removed) })))
    }
}

impl<S: DocumentStore + 'static> ActionRegistry<S> {
    /// Register the standard `create` action
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if `create` is already defined.
    pub fn create(&mut self, options: Option<ActionOptions>) -> Result<(), RegistryError> {
        let body = CreateAction::new(self.store().clone(), self.conventions().clone());
        self.define_action(action_names::CREATE, Arc::new(body), options)
    }

    /// Register the standard `read` action
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if `read` is already defined.
    pub fn read(&mut self, options: Option<ActionOptions>) -> Result<(), RegistryError> {
        let body = ReadAction::new(self.store().clone(), self.conventions().clone());
        self.define_action(action_names::READ, Arc::new(body), options)
    }

    /// Register the standard `update` action
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if `update` is already defined.
    pub fn update(&mut self, options: Option<ActionOptions>) -> Result<(), RegistryError> {
        let body = UpdateAction::new(self.store().clone(), self.conventions().clone());
        self.define_action(action_names::UPDATE, Arc::new(body), options)
    }

    /// Register the standard `delete` action
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if `delete` is already defined.
    pub fn delete(&mut self, options: Option<ActionOptions>) -> Result<(), RegistryError> {
        let body = DeleteAction::new(self.store().clone(), self.conventions().clone());
        self.define_action(action_names::DELETE, Arc::new(body), options)
    }
}

fn required_object(
    request: &ActionRequest,
    action: &str,
    field: &str,
) -> Result<Document, ActionError> {
    match request.field(field) {
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ActionError::invalid_request(
            action,
            format!("field '{}' must be an object", field),
        )),
        None => Err(ActionError::invalid_request(
            action,
            format!("missing field '{}'", field),
        )),
    }
}

fn optional_object(
    request: &ActionRequest,
    action: &str,
    field: &str,
) -> Result<Filter, ActionError> {
    match request.field(field) {
        None | Some(Value::Null) => Ok(Filter::new()),
        Some(_) => required_object(request, action, field),
    }
}

fn required_id(
    request: &ActionRequest,
    action: &str,
    param: &str,
) -> Result<DocumentId, ActionError> {
    request
        .param(param)
        .map(DocumentId::from)
        .ok_or_else(|| ActionError::invalid_request(action, format!("missing path parameter '{}'", param)))
}

fn nullable(document: Option<Document>) -> Value {
    document.map(Value::Object).unwrap_or(Value::Null)
}

#[cfg(all(test, feature = "memory-store"))]
mod tests {
    use axum::http::StatusCode;
    use uuid::Uuid;

    use super::*;
    use crate::actions::validator_fn;
    use crate::store::{MemoryStore, StoreErrorKind};

    fn crud_registry() -> ActionRegistry<MemoryStore> {
        let mut registry = ActionRegistry::new(Arc::new(MemoryStore::new("posts")));
        registry.create(None).unwrap();
        registry.read(None).unwrap();
        registry.update(None).unwrap();
        registry.delete(None).unwrap();
        registry
    }

    async fn run(
        registry: &ActionRegistry<MemoryStore>,
        name: &str,
        request: ActionRequest,
    ) -> Result<ActionResponse, ActionError> {
        registry.handlers(name).unwrap().execute(request).await
    }

    async fn create(registry: &ActionRegistry<MemoryStore>, document: Value) -> String {
        let response = run(registry, "create", ActionRequest::new(json!({ "document": document })))
            .await
            .unwrap();
        response.body["document"]["_id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_generators_use_canonical_names() {
        let registry = crud_registry();
        assert_eq!(
            registry.action_names(),
            vec!["create", "delete", "read", "update"]
        );
    }

    #[test]
    fn test_generator_rejects_duplicate_name() {
        let mut registry = crud_registry();
        assert!(matches!(
            registry.create(None),
            Err(RegistryError::DuplicateAction { ref name, .. }) if name == "create"
        ));
    }

    #[test]
    fn test_generator_forwards_validators() {
        let mut registry = ActionRegistry::new(Arc::new(MemoryStore::new("posts")));
        let v = validator_fn(|_ctx| Box::pin(async move { Ok(()) }));
        registry
            .read(Some(ActionOptions::new().validator(v.clone())))
            .unwrap();

        let chain = registry.handlers("read").unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.stages()[0].is_validator(&v));
        assert!(chain.stages()[1].is_action());
    }

    #[tokio::test]
    async fn test_create_returns_document_with_generated_id() {
        let registry = crud_registry();
        let response = run(
            &registry,
            "create",
            ActionRequest::new(json!({"document": {"title": "x"}})),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        let document = response.body["document"].as_object().unwrap();
        assert_eq!(document.len(), 2);
        assert_eq!(document["title"], "x");
        let id = document["_id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());

        let found = run(
            &registry,
            "read",
            ActionRequest::new(json!({"filter": {"title": "x"}})),
        )
        .await
        .unwrap();
        assert_eq!(found.body["documents"][0]["_id"], id);
        assert_eq!(found.body["documents"][0]["title"], "x");
    }

    #[tokio::test]
    async fn test_create_without_document_is_invalid() {
        let registry = crud_registry();
        let err = run(&registry, "create", ActionRequest::new(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = run(&registry, "create", ActionRequest::new(json!({"document": 5})))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidRequest { ref action, .. } if action == "create"));
    }

    #[tokio::test]
    async fn test_read_returns_newest_first() {
        let registry = crud_registry();
        let t1 = create(&registry, json!({"n": 1})).await;
        let t2 = create(&registry, json!({"n": 2})).await;
        let t3 = create(&registry, json!({"n": 3})).await;

        let response = run(&registry, "read", ActionRequest::new(json!({})))
            .await
            .unwrap();
        let ids: Vec<_> = response.body["documents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec![t3, t2, t1]);
    }

    #[tokio::test]
    async fn test_read_orders_by_last_update_not_creation() {
        let registry = crud_registry();
        let first = create(&registry, json!({"n": 1})).await;
        let second = create(&registry, json!({"n": 2})).await;

        run(
            &registry,
            "update",
            ActionRequest::new(json!({"partialDocument": {"touched": true}})).with_param("id", &first),
        )
        .await
        .unwrap();

        let response = run(&registry, "read", ActionRequest::new(json!({"filter": null})))
            .await
            .unwrap();
        assert_eq!(response.body["documents"][0]["_id"], first.as_str());
        assert_eq!(response.body["documents"][1]["_id"], second.as_str());
    }

    #[tokio::test]
    async fn test_update_returns_full_post_update_document() {
        let registry = crud_registry();
        let id = create(&registry, json!({"title": "x", "body": "keep", "tags": ["a"]})).await;

        let response = run(
            &registry,
            "update",
            ActionRequest::new(json!({"partialDocument": {"title": "y"}})).with_param("id", &id),
        )
        .await
        .unwrap();

        let document = &response.body["document"];
        assert_eq!(document["title"], "y");
        assert_eq!(document["body"], "keep");
        assert_eq!(document["tags"], json!(["a"]));
        assert_eq!(document["_id"], id.as_str());
    }

    #[tokio::test]
    async fn test_update_missing_document_returns_null() {
        let registry = crud_registry();
        let response = run(
            &registry,
            "update",
            ActionRequest::new(json!({"partialDocument": {"title": "y"}}))
                .with_param("id", Uuid::now_v7().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(response.body, json!({"document": null}));
    }

    #[tokio::test]
    async fn test_update_requires_id_param() {
        let registry = crud_registry();
        let err = run(
            &registry,
            "update",
            ActionRequest::new(json!({"partialDocument": {}})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ActionError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_document() {
        let registry = crud_registry();
        let id = create(&registry, json!({"title": "x"})).await;

        let response = run(&registry, "delete", ActionRequest::default().with_param("id", &id))
            .await
            .unwrap();
        assert_eq!(response.body["document"]["title"], "x");

        let remaining = run(&registry, "read", ActionRequest::default()).await.unwrap();
        assert_eq!(remaining.body["documents"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_miss_returns_null_without_error() {
        let registry = crud_registry();
        let response = run(
            &registry,
            "delete",
            ActionRequest::default().with_param("id", Uuid::now_v7().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({"document": null}));
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let registry = crud_registry();
        let err = run(
            &registry,
            "delete",
            ActionRequest::default().with_param("id", "not-a-uuid"),
        )
        .await
        .unwrap_err();

        match err {
            ActionError::Store(e) => {
                assert_eq!(e.kind, StoreErrorKind::InvalidId);
                assert_eq!(e.document_id.as_deref(), Some("not-a-uuid"));
            }
            other => panic!("expected store error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_conventions() {
        let conventions = Conventions {
            document_field: "doc".into(),
            id_param: "postId".into(),
            ..Conventions::default()
        };
        let mut registry =
            ActionRegistry::with_conventions(Arc::new(MemoryStore::new("posts")), conventions);
        registry.create(None).unwrap();
        registry.delete(None).unwrap();

        let created = run(&registry, "create", ActionRequest::new(json!({"doc": {"a": 1}})))
            .await
            .unwrap();
        let id = created.body["document"]["_id"].as_str().unwrap().to_string();

        let deleted = run(&registry, "delete", ActionRequest::default().with_param("postId", id))
            .await
            .unwrap();
        assert_eq!(deleted.body["document"]["a"], 1);
    }

    #[tokio::test]
    async fn test_document_fields_follow_the_store() {
        let store = MemoryStore::new("posts")
            .with_id_field("id")
            .with_updated_at_field("modified");
        let mut registry = ActionRegistry::new(Arc::new(store));
        registry.create(None).unwrap();
        registry.read(None).unwrap();

        let mut expected = Vec::new();
        for n in 0..20 {
            let created = run(&registry, "create", ActionRequest::new(json!({"document": {"n": n}})))
                .await
                .unwrap();
            let id = created.body["document"]["id"].as_str().unwrap().to_string();
            assert!(created.body["document"].get("_id").is_none());

            let stored = registry
                .store()
                .read_one_by_id(&DocumentId::new(id.as_str()))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored["id"], id.as_str());
            expected.push(n);
        }
        expected.reverse();

        let response = run(&registry, "read", ActionRequest::default()).await.unwrap();
        let order: Vec<i64> = response.body["documents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["n"].as_i64().unwrap())
            .collect();
        assert_eq!(order, expected);
    }

    #[tokio::test]
    async fn test_validator_guards_crud_body() {
        let mut registry = ActionRegistry::new(Arc::new(MemoryStore::new("posts")));
        let require_title = validator_fn(|ctx| {
            Box::pin(async move {
                let has_title = ctx
                    .request()
                    .field("document")
                    .and_then(|d| d.get("title"))
                    .is_some();
                if has_title {
                    Ok(())
                } else {
                    Err(ActionError::validation("title is required"))
                }
            })
        });
        registry
            .create(Some(ActionOptions::new().validator(require_title)))
            .unwrap();

        let err = run(&registry, "create", ActionRequest::new(json!({"document": {}})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(registry.store().is_empty().await);
    }
}
