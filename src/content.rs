//! Payload helpers for server hooks
//!
//! Shapes shared by the server variants when they build resource results.

use {
    crate::protocol::ResourceDescriptor,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// A single piece of resource content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: Option<String>,
    pub text: String,
}

/// `resources/read` result: `{ "contents": [ ... ] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceContents {
    pub contents: Vec<ResourceContent>,
}

impl ResourceContents {
    /// Wrap a JSON document as the text content of `resource`.
    pub fn json(resource: &ResourceDescriptor, document: &Value) -> serde_json::Result<Self> {
        Ok(Self {
            contents: vec![ResourceContent {
                uri: resource.uri.clone(),
                mime_type: Some(
                    resource
                        .mime_type
                        .clone()
                        .unwrap_or_else(|| "application/json".to_string()),
                ),
                text: serde_json::to_string(document)?,
            }],
        })
    }

    pub fn into_value(self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
