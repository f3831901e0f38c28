//! Typed error handling for the HTTP surface
//!
//! Every handler returns `Result<_, ApiError>`. The enum covers the full
//! response taxonomy: not-found conditions (unknown kind, missing resource,
//! missing relation or association), conflicts, invalid content, denied
//! access, unsupported verbs, and an opaque internal error. Store failures
//! are translated at the call site — with logging context — and never reach
//! the client verbatim.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The error type returned by all restforge handlers
#[derive(Debug)]
pub enum ApiError {
    /// No resource kind registered under this name
    UnknownKind { kind: String },

    /// A resource lookup came up empty
    ResourceNotFound { kind: String, id: Option<i64> },

    /// No such relation is declared for this kind (or the verb is not
    /// supported on it)
    RelationNotFound { kind: String, relation: String },

    /// No association row matched the remove request
    AssociationNotFound { relation: String, related_id: i64 },

    /// An entity referenced in an association payload does not exist yet
    RelatedNotCreated { kind: String, id: i64 },

    /// Duplicate create attempt
    AlreadyExists { kind: String },

    /// The store reported a required field absent on create
    MissingField { field: String },

    /// Malformed or forbidden request content
    InvalidContent { message: String },

    /// The access policy rejected the request
    AccessDenied,

    /// Verb not supported on this route
    MethodNotAllowed,

    /// Unclassified failure; details stay server-side
    Internal,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnknownKind { kind } => write!(f, "{}: not found", kind),
            ApiError::ResourceNotFound { kind, id } => match id {
                Some(id) => write!(f, "{}/{} not found", kind, id),
                None => write!(f, "{} not found", kind),
            },
            ApiError::RelationNotFound { kind, relation } => {
                write!(f, "no relation '{}' for {}", relation, kind)
            }
            ApiError::AssociationNotFound {
                relation,
                related_id,
            } => {
                write!(f, "no association '{}' with id {}", relation, related_id)
            }
            ApiError::RelatedNotCreated { .. } => {
                write!(f, "related objects must be created before they are associated")
            }
            ApiError::AlreadyExists { kind } => write!(f, "{} already exists", kind),
            ApiError::MissingField { field } => write!(f, "{} is required", field),
            ApiError::InvalidContent { message } => write!(f, "{}", message),
            ApiError::AccessDenied => write!(f, "access denied"),
            ApiError::MethodNotAllowed => write!(f, "method not allowed"),
            ApiError::Internal => write!(f, "internal server error"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownKind { .. } => StatusCode::NOT_FOUND,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RelationNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::AssociationNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RelatedNotCreated { .. } => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists { .. } => StatusCode::CONFLICT,
            ApiError::MissingField { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidContent { .. } => StatusCode::BAD_REQUEST,
            ApiError::AccessDenied => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::UnknownKind { .. } => "UNKNOWN_KIND",
            ApiError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            ApiError::RelationNotFound { .. } => "RELATION_NOT_FOUND",
            ApiError::AssociationNotFound { .. } => "ASSOCIATION_NOT_FOUND",
            ApiError::RelatedNotCreated { .. } => "RELATED_NOT_CREATED",
            ApiError::AlreadyExists { .. } => "ALREADY_EXISTS",
            ApiError::MissingField { .. } => "MISSING_FIELD",
            ApiError::InvalidContent { .. } => "INVALID_CONTENT",
            ApiError::AccessDenied => "ACCESS_DENIED",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Convert to the serialized response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Shorthand for malformed request content
    pub fn invalid_content(message: impl Into<String>) -> Self {
        ApiError::InvalidContent {
            message: message.into(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::ResourceNotFound { kind, id } => Some(serde_json::json!({
                "kind": kind,
                "id": id,
            })),
            ApiError::RelationNotFound { kind, relation } => Some(serde_json::json!({
                "kind": kind,
                "relation": relation,
            })),
            ApiError::RelatedNotCreated { kind, id } => Some(serde_json::json!({
                "kind": kind,
                "id": id,
            })),
            ApiError::MissingField { field } => Some(serde_json::json!({
                "field": field,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}
