//! Envelope types
//!
//! Request, Response and Error values that make up the wire contract, plus the
//! Resource and Tool descriptors a server exposes.

use {
    crate::error::{McpError, McpResult},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    std::fmt,
};

/// Open parameter / argument mapping carried on the wire
pub type Params = Map<String, Value>;

/// The built-in operations a dispatcher understands.
///
/// The wire carries arbitrary strings; anything that is not one of the four
/// reserved names lands in `Unknown` so the dispatcher can answer with
/// MethodNotFound instead of failing at the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    ListResources,
    ReadResource,
    ListTools,
    CallTool,
    Unknown(String),
}

impl Method {
    pub const RESOURCES_LIST: &'static str = "resources/list";
    pub const RESOURCES_READ: &'static str = "resources/read";
    pub const TOOLS_LIST: &'static str = "tools/list";
    pub const TOOLS_CALL: &'static str = "tools/call";

    pub fn as_str(&self) -> &str {
        match self {
            Self::ListResources => Self::RESOURCES_LIST,
            Self::ReadResource => Self::RESOURCES_READ,
            Self::ListTools => Self::TOOLS_LIST,
            Self::CallTool => Self::TOOLS_CALL,
            Self::Unknown(name) => name,
        }
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        match name {
            Self::RESOURCES_LIST => Self::ListResources,
            Self::RESOURCES_READ => Self::ReadResource,
            Self::TOOLS_LIST => Self::ListTools,
            Self::TOOLS_CALL => Self::CallTool,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Caller-supplied correlation id, echoed verbatim in the response
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Request {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Params) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            params,
            timestamp: Utc::now(),
        }
    }

    /// Request with an empty parameter map
    pub fn bare(id: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(id, method, Params::new())
    }

    pub fn method_kind(&self) -> Method {
        Method::from(self.method.as_str())
    }

    /// Fetch a required string parameter.
    pub fn str_param(&self, key: &str) -> McpResult<&str> {
        match self.params.get(key) {
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(_) => Err(McpError::InvalidParams(format!("'{key}' must be a string"))),
            None => Err(McpError::InvalidParams(format!("Missing required parameter '{key}'"))),
        }
    }

    /// Fetch a required object parameter.
    pub fn object_param(&self, key: &str) -> McpResult<&Params> {
        match self.params.get(key) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(McpError::InvalidParams(format!("'{key}' must be an object"))),
            None => Err(McpError::InvalidParams(format!("Missing required parameter '{key}'"))),
        }
    }
}

/// Borrowed view of a `tools/call` request's parameters
#[derive(Debug, Clone, Copy)]
pub struct ToolCall<'a> {
    pub name: &'a str,
    pub arguments: &'a Params,
}

impl<'a> ToolCall<'a> {
    pub fn from_request(request: &'a Request) -> McpResult<Self> {
        Ok(Self {
            name: request.str_param("name")?,
            arguments: request.object_param("arguments")?,
        })
    }
}

/// Error envelope: `{ code, message, data }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<McpError> for ErrorObject {
    fn from(error: McpError) -> Self {
        error.to_error_object()
    }
}

/// Response envelope.
///
/// Exactly one of `result` / `error` is present; the fields are private so no
/// other shape can be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResponseWire", into = "ResponseWire")]
pub struct Response {
    id: String,
    outcome: Result<Value, ErrorObject>,
    timestamp: DateTime<Utc>,
}

impl Response {
    /// Successful response. A JSON `null` result is stored as `{}`.
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        let result = if result.is_null() {
            Value::Object(Map::new())
        } else {
            result
        };
        Self {
            id: id.into(),
            outcome: Ok(result),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(id: impl Into<String>, error: impl Into<ErrorObject>) -> Self {
        Self {
            id: id.into(),
            outcome: Err(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ErrorObject> {
        self.outcome.as_ref().err()
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn into_outcome(self) -> Result<Value, ErrorObject> {
        self.outcome
    }

    /// Replace the correlation id, keeping everything else.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

#[derive(Serialize, Deserialize)]
struct ResponseWire {
    id: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<ResponseWire> for Response {
    type Error = String;

    fn try_from(wire: ResponseWire) -> Result<Self, Self::Error> {
        let outcome = match (wire.result, wire.error) {
            (Some(result), None) if !result.is_null() => Ok(result),
            (None, Some(error)) | (Some(Value::Null), Some(error)) => Err(error),
            (Some(_), Some(_)) => return Err("response carries both result and error".to_string()),
            _ => return Err("response carries neither result nor error".to_string()),
        };
        Ok(Self {
            id: wire.id,
            outcome,
            timestamp: wire.timestamp,
        })
    }
}

impl From<Response> for ResponseWire {
    fn from(response: Response) -> Self {
        let (result, error) = match response.outcome {
            Ok(result) => (Some(result), None),
            Err(error) => (None, Some(error)),
        };
        Self {
            id: response.id,
            result,
            error,
            timestamp: response.timestamp,
        }
    }
}

/// A named, URI-addressed read-only data view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub metadata: Option<Params>,
}

impl ResourceDescriptor {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
            metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Attach metadata; non-object values are ignored.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        if let Value::Object(map) = metadata {
            self.metadata = Some(map);
        }
        self
    }
}

/// A named, schema-described callable operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test params must be an object"),
        }
    }

    #[test]
    fn test_method_parsing_is_closed() {
        assert_eq!(Method::from("resources/list"), Method::ListResources);
        assert_eq!(Method::from("resources/read"), Method::ReadResource);
        assert_eq!(Method::from("tools/list"), Method::ListTools);
        assert_eq!(Method::from("tools/call"), Method::CallTool);
        assert_eq!(
            Method::from("prompts/list"),
            Method::Unknown("prompts/list".to_string())
        );
        assert_eq!(Method::from("Tools/List").as_str(), "Tools/List");
    }

    #[test]
    fn test_request_defaults_on_deserialize() {
        let request: Request =
            serde_json::from_value(json!({"id": "r1", "method": "tools/list"})).unwrap();
        assert!(request.params.is_empty());
        assert_eq!(request.method_kind(), Method::ListTools);
    }

    #[test]
    fn test_str_param_shapes() {
        let request = Request::new("1", "resources/read", params(json!({"uri": 42})));
        let err = request.str_param("uri").unwrap_err();
        assert_eq!(err.error_code(), -32602);

        let request = Request::bare("1", "resources/read");
        assert!(request.str_param("uri").unwrap_err().to_string().contains("Missing"));
    }

    #[test]
    fn test_tool_call_requires_object_arguments() {
        let request = Request::new(
            "1",
            "tools/call",
            params(json!({"name": "search_properties", "arguments": []})),
        );
        assert!(ToolCall::from_request(&request).is_err());

        let request = Request::new(
            "1",
            "tools/call",
            params(json!({"name": "search_properties", "arguments": {}})),
        );
        let call = ToolCall::from_request(&request).unwrap();
        assert_eq!(call.name, "search_properties");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_response_serializes_both_fields() {
        let ok = serde_json::to_value(Response::success("a", json!({"x": 1}))).unwrap();
        assert_eq!(ok["id"], "a");
        assert_eq!(ok["result"]["x"], 1);
        assert!(ok["error"].is_null());

        let err = serde_json::to_value(Response::failure(
            "b",
            ErrorObject::new(-32601, "Method not found: nope"),
        ))
        .unwrap();
        assert!(err["result"].is_null());
        assert_eq!(err["error"]["code"], -32601);
    }

    #[test]
    fn test_response_rejects_invalid_shapes() {
        let both = json!({
            "id": "x",
            "result": {},
            "error": {"code": -32603, "message": "Internal error"},
            "timestamp": "2026-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<Response>(both).is_err());

        let neither = json!({"id": "x", "timestamp": "2026-01-01T00:00:00Z"});
        assert!(serde_json::from_value::<Response>(neither).is_err());
    }

    #[test]
    fn test_null_success_is_normalised() {
        let response = Response::success("n", Value::Null);
        assert_eq!(response.result(), Some(&json!({})));
        assert!(response.error().is_none());
    }

    #[test]
    fn test_descriptor_wire_names() {
        let resource = ResourceDescriptor::new("airbnb://properties", "Properties")
            .with_mime_type("application/json")
            .with_metadata(json!({"schema": "PropertyDto[]"}));
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["mimeType"], "application/json");
        assert_eq!(value["metadata"]["schema"], "PropertyDto[]");

        let tool = ToolDescriptor::new("t", "d", json!({"type": "object"}));
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
    }
}
