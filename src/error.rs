//! Error taxonomy
//!
//! Domain errors raised inside the dispatcher and the server hooks, and the
//! fixed set of error kinds callers branch on.

use {
    crate::protocol::{ErrorObject, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND},
    serde_json::Value,
    thiserror::Error,
};

/// The stable error kinds exposed on the wire.
///
/// Resource and tool lookups share the MethodNotFound code and are told apart
/// by their message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MethodNotFound,
    ResourceNotFound,
    ToolNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorKind {
    pub fn code(self) -> i32 {
        match self {
            Self::MethodNotFound | Self::ResourceNotFound | Self::ToolNotFound => METHOD_NOT_FOUND,
            Self::InvalidParams => INVALID_PARAMS,
            Self::InternalError => INTERNAL_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Method not found: {0}")]
    UnknownMethod(String),

    #[error("Resource not found: {0}")]
    UnknownResource(String),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownMethod(_) => ErrorKind::MethodNotFound,
            Self::UnknownResource(_) => ErrorKind::ResourceNotFound,
            Self::UnknownTool(_) => ErrorKind::ToolNotFound,
            Self::InvalidParams(_) => ErrorKind::InvalidParams,
            Self::Json(_) | Self::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Convert to the wire error code
    pub fn error_code(&self) -> i32 {
        self.kind().code()
    }

    /// Build the envelope error object.
    ///
    /// Internal failures keep a generic message and carry the detail in `data`.
    pub fn to_error_object(&self) -> ErrorObject {
        match self {
            Self::Json(e) => ErrorObject::new(INTERNAL_ERROR, "Internal error")
                .with_data(Value::String(e.to_string())),
            Self::Internal(detail) => ErrorObject::new(INTERNAL_ERROR, "Internal error")
                .with_data(Value::String(detail.clone())),
            other => ErrorObject::new(other.error_code(), other.to_string()),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

impl From<anyhow::Error> for McpError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<McpError>() {
            Ok(mcp) => mcp,
            Err(other) => McpError::Internal(other.to_string()),
        }
    }
}
