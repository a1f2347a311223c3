//! Wire protocol
//!
//! Envelope types and the stable error codes shared by every server instance.

pub mod message;

pub use message::{
    ErrorObject, Method, Params, Request, ResourceDescriptor, Response, ToolCall, ToolDescriptor,
};

/// `method` is not one of the reserved operations; also used for unknown
/// resources and tools.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// A required parameter is missing or has the wrong shape.
pub const INVALID_PARAMS: i32 = -32602;

/// Uncaught failure inside a server hook.
pub const INTERNAL_ERROR: i32 = -32603;
