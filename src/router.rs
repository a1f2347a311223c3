//! Typed tool routing.
//!
//! Server variants register each tool with a typed input struct. The router
//! derives the tool's `inputSchema` from that type and decodes the loosely
//! typed argument map into it before the business handler runs, so handlers
//! never see raw JSON.

use {
    crate::{
        error::{McpError, McpResult},
        logging,
        protocol::{Request, Response, ToolCall, ToolDescriptor},
    },
    futures_util::future::BoxFuture,
    schemars::JsonSchema,
    serde::{de::DeserializeOwned, Serialize},
    serde_json::{json, Value},
    std::{collections::HashMap, future::Future, sync::Arc, time::Instant},
};

/// Type-erased tool handler: raw arguments plus shared context in, JSON out.
pub type ToolFunction<C> =
    Box<dyn Fn(Value, Arc<C>) -> BoxFuture<'static, McpResult<Value>> + Send + Sync>;

/// Name-indexed table of tool handlers sharing one context `C`.
pub struct ToolRouter<C> {
    context: Arc<C>,
    tools: HashMap<String, ToolFunction<C>>,
}

impl<C: Send + Sync + 'static> ToolRouter<C> {
    pub fn new(context: Arc<C>) -> Self {
        Self {
            context,
            tools: HashMap::new(),
        }
    }

    /// Register a tool and return its descriptor for the registry.
    ///
    /// # Type Parameters
    /// - `I`: input type; its JSON schema becomes the tool's `inputSchema`
    /// - `O`: output type, serialized as the call result
    ///
    /// # Examples
    /// ```rust,ignore
    /// #[derive(JsonSchema, Deserialize)]
    /// struct LookupInput { property_id: String }
    ///
    /// let descriptor = router.register_tool("lookup", "Find a property", |input: LookupInput, ctx| async move {
    ///     ctx.store.get(&input.property_id).await
    /// });
    /// registry.tool(descriptor);
    /// ```
    pub fn register_tool<I, O, F, Fut>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
    ) -> ToolDescriptor
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        O: Serialize + 'static,
        F: Fn(I, Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = McpResult<O>> + Send + 'static,
    {
        let descriptor = ToolDescriptor::new(name, description, input_schema::<I>());
        let handler = Arc::new(handler);
        let tool_name = name.to_string();

        let wrapper: ToolFunction<C> = Box::new(move |args, context| {
            let handler = Arc::clone(&handler);
            let tool_name = tool_name.clone();

            Box::pin(async move {
                let input: I = serde_json::from_value(args).map_err(|e| {
                    McpError::InvalidParams(format!("Invalid arguments for '{tool_name}': {e}"))
                })?;

                let output = handler(input, context).await?;

                Ok(serde_json::to_value(output)?)
            })
        });

        self.tools.insert(name.to_string(), wrapper);
        descriptor
    }

    /// Run the named tool.
    ///
    /// Unknown names fail with [`McpError::UnknownTool`].
    pub async fn call(&self, name: &str, arguments: Value) -> McpResult<Value> {
        let Some(tool_fn) = self.tools.get(name) else {
            logging::log_unknown_tool(name);
            return Err(McpError::UnknownTool(name.to_string()));
        };

        logging::log_tool_call(name, &arguments);
        let start = Instant::now();
        let result = tool_fn(arguments, Arc::clone(&self.context)).await;
        crate::log_tool_execution!(name, start.elapsed(), result);
        result
    }

    /// Answer a `tools/call` request. Tool failures become error responses.
    pub async fn respond(&self, request: &Request) -> Response {
        let call = match ToolCall::from_request(request) {
            Ok(call) => call,
            Err(err) => return Response::failure(request.id.clone(), err),
        };
        match self.call(call.name, Value::Object(call.arguments.clone())).await {
            Ok(result) => Response::success(request.id.clone(), result),
            Err(err) => Response::failure(request.id.clone(), err),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }
}

/// JSON schema for a tool input type, without the document-level keys.
pub fn input_schema<I: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(I))
        .unwrap_or_else(|_| json!({ "type": "object" }));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}
