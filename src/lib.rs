//! Resource/tool invocation layer
//!
//! A small dispatcher that exposes URI-addressed resources and schema-described
//! tools through one request/response envelope, plus an HTTP binding and two
//! property-management server variants built on it.

pub mod analysis;
pub mod config;
pub mod content;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod health;
pub mod http;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;
pub mod servers;
pub mod store;
pub mod textgen;
pub mod validation;

// Test modules
#[cfg(test)]
mod tests;

// Re-export key types
pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, McpError, McpResult};
pub use handler::ServerHooks;
pub use http::HttpMcpHandler;
pub use protocol::{ErrorObject, Method, Request, ResourceDescriptor, Response, ToolDescriptor};
pub use registry::{Registry, RegistryBuilder};
pub use router::ToolRouter;
pub use server::McpServer;
pub use servers::{ListingsServer, PortfolioServer, ServerContext};
pub use validation::SchemaValidation;

// Re-export schemars so tool input types can derive JsonSchema
pub use schemars::JsonSchema;
