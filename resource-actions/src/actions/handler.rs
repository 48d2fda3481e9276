//! Action and validator traits, and the composed handler chain
//!
//! Both traits are object-safe (via `async_trait`) so the registry can hold
//! heterogeneous stages behind `Arc<dyn ...>`.
//!
//! # Example
//!
//! ```rust
//! use resource_actions::actions::{action_fn, validator_fn, ActionError, ActionResponse};
//! use serde_json::json;
//!
//! let ping = action_fn(|ctx| {
//!     Box::pin(async move { ctx.respond(ActionResponse::ok(json!({"pong": true}))) })
//! });
//!
//! let require_body = validator_fn(|ctx| {
//!     Box::pin(async move {
//!         if ctx.request().payload.is_null() {
//!             return Err(ActionError::validation("request body required"));
//!         }
//!         Ok(())
//!     })
//! });
//! # let _ = (ping, require_body);
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::Instrument;

use super::context::{ActionContext, ActionRequest, ActionResponse};
use super::error::ActionError;

/// Future returned by closure-based stages
pub type StageFuture<'a> = BoxFuture<'a, Result<(), ActionError>>;

/// A named unit of request-handling logic
///
/// The body is expected to emit exactly one response through
/// [`ActionContext::respond`], or fail.
#[async_trait]
pub trait Action: Send + Sync {
    /// Run the action against the invocation context
    async fn invoke(&self, ctx: &mut ActionContext) -> Result<(), ActionError>;
}

/// A guard stage that runs before an action body
///
/// Returning `Ok(())` without responding passes control to the next stage.
/// Returning an error, or responding early, ends the chain.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Inspect (and optionally normalize) the request
    async fn validate(&self, ctx: &mut ActionContext) -> Result<(), ActionError>;
}

struct FnAction<F>(F);

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: for<'a> Fn(&'a mut ActionContext) -> StageFuture<'a> + Send + Sync,
{
    async fn invoke(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        (self.0)(ctx).await
    }
}

struct FnValidator<F>(F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: for<'a> Fn(&'a mut ActionContext) -> StageFuture<'a> + Send + Sync,
{
    async fn validate(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        (self.0)(ctx).await
    }
}

/// Wrap an async closure as an action body
pub fn action_fn<F>(f: F) -> Arc<dyn Action>
where
    F: for<'a> Fn(&'a mut ActionContext) -> StageFuture<'a> + Send + Sync + 'static,
{
    Arc::new(FnAction(f))
}

/// Wrap an async closure as a validator
pub fn validator_fn<F>(f: F) -> Arc<dyn Validator>
where
    F: for<'a> Fn(&'a mut ActionContext) -> StageFuture<'a> + Send + Sync + 'static,
{
    Arc::new(FnValidator(f))
}

/// One stage of a composed handler chain
#[derive(Clone)]
pub enum Handler {
    /// Pre-action guard
    Validator(Arc<dyn Validator>),
    /// The action body; always the last stage
    Action(Arc<dyn Action>),
}

impl Handler {
    /// Run this stage
    pub async fn call(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        match self {
            Self::Validator(v) => v.validate(ctx).await,
            Self::Action(a) => a.invoke(ctx).await,
        }
    }

    /// Whether this stage is the action body
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    /// Whether this stage is exactly the given validator instance
    pub fn is_validator(&self, validator: &Arc<dyn Validator>) -> bool {
        matches!(self, Self::Validator(v) if Arc::ptr_eq(v, validator))
    }

    /// Whether this stage is exactly the given action instance
    pub fn is_body(&self, action: &Arc<dyn Action>) -> bool {
        matches!(self, Self::Action(a) if Arc::ptr_eq(a, action))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validator(_) => f.write_str("Handler::Validator"),
            Self::Action(_) => f.write_str("Handler::Action"),
        }
    }
}

/// Ordered `[validators..., action]` sequence for one action name
#[derive(Clone, Debug)]
pub struct HandlerChain {
    resource: String,
    action: String,
    stages: Vec<Handler>,
}

impl HandlerChain {
    pub(crate) fn new(
        resource: impl Into<String>,
        action: impl Into<String>,
        validators: &[Arc<dyn Validator>],
        body: Arc<dyn Action>,
    ) -> Self {
        let mut stages = Vec::with_capacity(validators.len() + 1);
        stages.extend(validators.iter().cloned().map(Handler::Validator));
        stages.push(Handler::Action(body));
        Self {
            resource: resource.into(),
            action: action.into(),
            stages,
        }
    }

    /// Resource the chain belongs to
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Action name the chain was composed for
    pub fn action_name(&self) -> &str {
        &self.action
    }

    /// All stages in execution order
    pub fn stages(&self) -> &[Handler] {
        &self.stages
    }

    /// Number of stages, including the action body
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false: a chain holds at least its action body
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Iterate stages in execution order
    pub fn iter(&self) -> std::slice::Iter<'_, Handler> {
        self.stages.iter()
    }

    /// Run stages in order against an existing context
    ///
    /// Stops after the first stage that fails or responds. Stages after that
    /// point never run. Every stage executes inside an `action_chain` span
    /// carrying `resource` and `action`.
    pub async fn run(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let span = tracing::debug_span!(
            "action_chain",
            resource = %self.resource,
            action = %self.action
        );
        self.run_stages(ctx).instrument(span).await
    }

    async fn run_stages(&self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        for (index, stage) in self.stages.iter().enumerate() {
            tracing::trace!(stage = index, kind = ?stage, "running stage");

            if let Err(e) = stage.call(ctx).await {
                tracing::debug!(stage = index, error = %e, "chain aborted");
                return Err(e);
            }

            if ctx.is_responded() {
                if !stage.is_action() {
                    tracing::debug!(stage = index, "chain short-circuited by early response");
                }
                return Ok(());
            }
        }
        Ok(())
    }

    /// Run the chain for a fresh request and return its single response
    ///
    /// # Errors
    ///
    /// Propagates the first stage error unchanged, or returns
    /// [`ActionError::Unresolved`] when no stage responded.
    pub async fn execute(&self, request: ActionRequest) -> Result<ActionResponse, ActionError> {
        let mut ctx = ActionContext::new(request);
        self.run(&mut ctx).await?;
        ctx.take_response().ok_or_else(|| ActionError::Unresolved {
            action: self.action.clone(),
        })
    }
}

impl<'a> IntoIterator for &'a HandlerChain {
    type Item = &'a Handler;
    type IntoIter = std::slice::Iter<'a, Handler>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
