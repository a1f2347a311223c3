//! Server hook trait
//!
//! The capability interface a server variant implements. The dispatcher is
//! generic over it and owns all method routing, parameter checks and error
//! conversion; a variant only supplies its frozen registry and two hooks.

use {
    crate::{
        protocol::{ResourceDescriptor, Request, Response},
        registry::Registry,
    },
    anyhow::Result,
    async_trait::async_trait,
};

#[async_trait]
pub trait ServerHooks: Send + Sync {
    /// The registry built when the variant was constructed
    fn registry(&self) -> &Registry;

    /// Produce the content of an already-resolved resource.
    ///
    /// Called only after the dispatcher found `resource` in the registry.
    /// Expected failures should come back as an error `Response`; any `Err`
    /// is reported to the caller by the dispatcher.
    async fn read_resource_content(
        &self,
        request: &Request,
        resource: &ResourceDescriptor,
    ) -> Result<Response>;

    /// Execute the tool named in `request.params.name`.
    ///
    /// The variant resolves the name against its own tool set; an unknown
    /// name should surface as `McpError::UnknownTool` so the caller gets a
    /// precise not-found error.
    async fn call_tool(&self, request: &Request) -> Result<Response>;
}
