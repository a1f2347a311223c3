//! Dispatcher
//!
//! Routes a [`Request`] to one of the four built-in operations and turns every
//! failure, including a panicking hook, into an error [`Response`]. `handle`
//! never fails and never panics outward.

use {
    crate::{
        error::McpError,
        handler::ServerHooks,
        logging,
        protocol::{ErrorObject, Method, Request, Response, ToolCall, INTERNAL_ERROR},
        registry::Registry,
        validation::{ArgumentValidator, SchemaValidation},
    },
    futures_util::FutureExt,
    serde_json::{json, Value},
    std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Instant},
    tracing::Instrument,
};

/// Protocol core for one server instance.
///
/// Cloning is cheap; clones share the same hooks and registry.
pub struct Dispatcher<H> {
    hooks: Arc<H>,
    validation: SchemaValidation,
}

impl<H> Clone for Dispatcher<H> {
    fn clone(&self) -> Self {
        Self {
            hooks: Arc::clone(&self.hooks),
            validation: self.validation,
        }
    }
}

impl<H: ServerHooks + 'static> Dispatcher<H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks: Arc::new(hooks),
            validation: SchemaValidation::default(),
        }
    }

    pub fn with_validation(mut self, validation: SchemaValidation) -> Self {
        self.validation = validation;
        self
    }

    pub fn registry(&self) -> &Registry {
        self.hooks.registry()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Handle one request. Always returns a response carrying `request.id`.
    pub async fn handle(&self, request: Request) -> Response {
        let span = logging::request_span(&request.method, &request.id);
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: Request) -> Response {
        let start = Instant::now();
        let method = request.method_kind();

        let outcome = AssertUnwindSafe(self.route(&method, &request))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => Response::failure(request.id.clone(), McpError::from(err)),
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                logging::log_hook_panic(method.as_str(), &detail);
                Response::failure(
                    request.id.clone(),
                    ErrorObject::new(INTERNAL_ERROR, "Internal error").with_data(Value::String(detail)),
                )
            }
        };

        match response.error() {
            Some(error) => logging::log_handler_error(
                method.as_str(),
                error.code,
                &error.message,
                start.elapsed(),
            ),
            None => logging::log_handler_success(method.as_str(), start.elapsed()),
        }

        // the id is echoed whatever the hook put in its response
        if response.id() == request.id {
            response
        } else {
            response.with_id(request.id)
        }
    }

    async fn route(&self, method: &Method, request: &Request) -> anyhow::Result<Response> {
        let registry = self.hooks.registry();

        match method {
            Method::ListResources => Ok(Response::success(
                request.id.clone(),
                json!({ "resources": registry.list_resources() }),
            )),
            Method::ReadResource => {
                let uri = match request.str_param("uri") {
                    Ok(uri) => uri,
                    Err(err) => return Ok(Response::failure(request.id.clone(), err)),
                };
                let Some(resource) = registry.resource(uri) else {
                    return Ok(Response::failure(
                        request.id.clone(),
                        McpError::UnknownResource(uri.to_string()),
                    ));
                };
                self.hooks.read_resource_content(request, resource).await
            }
            Method::ListTools => Ok(Response::success(
                request.id.clone(),
                json!({ "tools": registry.list_tools() }),
            )),
            Method::CallTool => {
                let call = match ToolCall::from_request(request) {
                    Ok(call) => call,
                    Err(err) => return Ok(Response::failure(request.id.clone(), err)),
                };
                if self.validation == SchemaValidation::Enforce {
                    if let Some(tool) = registry.tool(call.name) {
                        if let Err(violations) =
                            ArgumentValidator::validate(&tool.input_schema, call.arguments)
                        {
                            let error = ErrorObject::from(McpError::InvalidParams(format!(
                                "Arguments for '{}' do not match its input schema",
                                call.name
                            )))
                            .with_data(json!(violations));
                            return Ok(Response::failure(request.id.clone(), error));
                        }
                    }
                }
                self.hooks.call_tool(request).await
            }
            Method::Unknown(name) => {
                logging::log_unknown_method(name);
                Ok(Response::failure(
                    request.id.clone(),
                    McpError::UnknownMethod(name.clone()),
                ))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "server hook panicked".to_string()
    }
}
