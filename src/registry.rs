//! Resource and tool registry.
//!
//! A `Registry` is assembled once through a [`RegistryBuilder`] while a server
//! instance is constructed and is read-only afterwards, so concurrent
//! dispatches can share it without locking.

use {
    crate::protocol::{ResourceDescriptor, ToolDescriptor},
    indexmap::IndexMap,
    tracing::debug,
};

/// Construction-time registration of resources and tools.
///
/// Registering a second entry under an existing key replaces the first one in
/// place; listing order stays the order of first insertion.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    resources: IndexMap<String, ResourceDescriptor>,
    tools: IndexMap<String, ToolDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(&mut self, resource: ResourceDescriptor) -> &mut Self {
        if self.resources.contains_key(&resource.uri) {
            debug!(uri = %resource.uri, "Replacing resource registered under the same uri");
        }
        self.resources.insert(resource.uri.clone(), resource);
        self
    }

    pub fn tool(&mut self, tool: ToolDescriptor) -> &mut Self {
        if self.tools.contains_key(&tool.name) {
            debug!(tool = %tool.name, "Replacing tool registered under the same name");
        }
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> Registry {
        debug!(
            resources = self.resources.len(),
            tools = self.tools.len(),
            "Registry frozen"
        );
        Registry {
            resources: self.resources,
            tools: self.tools,
        }
    }
}

/// Frozen mapping of `uri -> Resource` and `name -> Tool`.
///
/// There is no removal or insertion API; the only way to obtain a `Registry`
/// is [`RegistryBuilder::build`].
#[derive(Debug, Clone)]
pub struct Registry {
    resources: IndexMap<String, ResourceDescriptor>,
    tools: IndexMap<String, ToolDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn resource(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(uri)
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// All resources in insertion order
    pub fn list_resources(&self) -> Vec<ResourceDescriptor> {
        self.resources.values().cloned().collect()
    }

    /// All tools in insertion order
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.values().cloned().collect()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
