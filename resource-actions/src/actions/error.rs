//! Registry and action error types
//!
//! Two families of failure exist:
//!
//! - [`RegistryError`]: declaration-time misuse (duplicate or unknown action
//!   names). These indicate a programming or routing mistake.
//! - [`ActionError`]: request-time failures raised while a handler chain runs,
//!   with automatic HTTP status mapping via `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::error::ErrorResponse;
use crate::store::{StoreError, StoreErrorKind};

/// Misuse of the action registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An action with this name is already defined
    #[error("action '{name}' is already defined for resource '{resource}'")]
    DuplicateAction {
        /// Registry (resource) name
        resource: String,
        /// Conflicting action name
        name: String,
    },

    /// No action with this name was ever defined
    #[error("action '{name}' is not defined for resource '{resource}'")]
    UnknownAction {
        /// Registry (resource) name
        resource: String,
        /// Requested action name
        name: String,
    },
}

/// Failure raised while executing a handler chain
#[derive(Debug, Error)]
pub enum ActionError {
    /// A validator refused the request
    #[error("{message}")]
    Rejected {
        /// HTTP status to report
        status: StatusCode,
        /// Machine-readable error code
        code: String,
        /// Human-readable reason
        message: String,
    },

    /// A convention-named field was missing or had the wrong shape
    #[error("invalid request for '{action}': {message}")]
    InvalidRequest {
        /// Action that read the field
        action: String,
        /// What was wrong
        message: String,
    },

    /// The document store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stage tried to emit a second response
    #[error("a response was already emitted for this request")]
    AlreadyResponded,

    /// Every stage ran and none produced a response
    #[error("action '{action}' completed without responding")]
    Unresolved {
        /// Action whose chain went unanswered
        action: String,
    },
}

impl ActionError {
    /// Validator rejection with an explicit status and code
    pub fn rejected(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Validator rejection reported as 422 Unprocessable Entity
    pub fn validation(message: impl Into<String>) -> Self {
        Self::rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_FAILED",
            message,
        )
    }

    /// Missing or ill-typed request field
    pub fn invalid_request(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            action: action.into(),
            message: message.into(),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Store(e) => match e.kind {
                StoreErrorKind::InvalidId => StatusCode::BAD_REQUEST,
                StoreErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::AlreadyResponded | Self::Unresolved { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> String {
        match self {
            Self::Rejected { code, .. } => code.clone(),
            Self::InvalidRequest { .. } => "INVALID_REQUEST".to_string(),
            Self::Store(e) => format!("STORE_{}", e.kind.to_string().to_uppercase()),
            Self::AlreadyResponded => "ALREADY_RESPONDED".to_string(),
            Self::Unresolved { .. } => "UNRESOLVED".to_string(),
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            Self::Rejected { message, .. } => message.clone(),
            Self::InvalidRequest { .. } => self.to_string(),
            Self::Store(e) => {
                tracing::error!(
                    operation = %e.operation,
                    kind = %e.kind,
                    resource = ?e.resource,
                    retriable = e.is_retriable(),
                    "Store error: {}", e.message
                );
                match e.kind {
                    StoreErrorKind::InvalidId => "Malformed document identifier".to_string(),
                    StoreErrorKind::Unavailable => "Document store unavailable".to_string(),
                    _ => "Document store operation failed".to_string(),
                }
            }
            Self::AlreadyResponded | Self::Unresolved { .. } => {
                tracing::error!("Action pipeline error: {}", self);
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse::with_code(status, code, message))).into_response()
    }
}
