//! Request context and one-shot response sink
//!
//! The transport layer hands every invocation an [`ActionRequest`] holding the
//! already-parsed payload, path parameters, and query parameters. Stages of a
//! handler chain share an [`ActionContext`], which accepts at most one
//! [`ActionResponse`].

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::error::ActionError;

/// Structured request data supplied by the transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionRequest {
    /// Parsed request body
    pub payload: Value,
    /// Path parameters (e.g. `id`)
    pub params: HashMap<String, String>,
    /// Query string parameters
    pub query: HashMap<String, String>,
}

impl ActionRequest {
    /// Create a request with the given payload and no parameters
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            params: HashMap::new(),
            query: HashMap::new(),
        }
    }

    /// Add a path parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Look up a top-level payload field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Look up a path parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Look up a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// Structured result emitted by a stage
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    /// HTTP status the transport should use
    pub status: StatusCode,
    /// JSON body
    pub body: Value,
}

impl ActionResponse {
    /// 200 OK with a JSON body
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// 201 Created with a JSON body
    pub fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }

    /// Arbitrary status with a JSON body
    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Per-invocation state shared by every stage of a handler chain
#[derive(Debug)]
pub struct ActionContext {
    request: ActionRequest,
    response: Option<ActionResponse>,
}

impl ActionContext {
    /// Wrap a request with an empty response sink
    pub fn new(request: ActionRequest) -> Self {
        Self {
            request,
            response: None,
        }
    }

    /// The request being handled
    pub fn request(&self) -> &ActionRequest {
        &self.request
    }

    /// Mutable access for stages that normalize input before the action runs
    pub fn request_mut(&mut self) -> &mut ActionRequest {
        &mut self.request
    }

    /// Emit the response for this invocation
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::AlreadyResponded`] if a response was already
    /// emitted; the first response is kept.
    pub fn respond(&mut self, response: ActionResponse) -> Result<(), ActionError> {
        if self.response.is_some() {
            return Err(ActionError::AlreadyResponded);
        }
        self.response = Some(response);
        Ok(())
    }

    /// Whether a stage has already responded
    pub fn is_responded(&self) -> bool {
        self.response.is_some()
    }

    /// The emitted response, if any
    pub fn response(&self) -> Option<&ActionResponse> {
        self.response.as_ref()
    }

    /// Take the emitted response out of the sink
    pub fn take_response(&mut self) -> Option<ActionResponse> {
        self.response.take()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_accessors() {
        let request = ActionRequest::new(json!({"document": {"title": "x"}}))
            .with_param("id", "abc")
            .with_query("verbose", "1");

        assert_eq!(request.field("document"), Some(&json!({"title": "x"})));
        assert_eq!(request.field("filter"), None);
        assert_eq!(request.param("id"), Some("abc"));
        assert_eq!(request.query_param("verbose"), Some("1"));
    }

    #[test]
    fn test_respond_only_once() {
        let mut ctx = ActionContext::new(ActionRequest::default());
        assert!(!ctx.is_responded());

        ctx.respond(ActionResponse::ok(json!({"n": 1}))).unwrap();
        let err = ctx.respond(ActionResponse::ok(json!({"n": 2}))).unwrap_err();
        assert!(matches!(err, ActionError::AlreadyResponded));

        let response = ctx.take_response().unwrap();
        assert_eq!(response.body, json!({"n": 1}));
        assert_eq!(response.status, StatusCode::OK);
    }

    #[test]
    fn test_created_status() {
        assert_eq!(
            ActionResponse::created(Value::Null).status,
            StatusCode::CREATED
        );
    }
}
