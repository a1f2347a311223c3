//! HTTP Transport Module
//!
//! Binds one dispatcher to a fixed REST-style route table:
//!
//! | HTTP | dispatched as |
//! |---|---|
//! | `GET /resources` | `resources/list` |
//! | `GET /resources/{uri}` | `resources/read` with the percent-decoded `uri` |
//! | `GET /tools` | `tools/list` |
//! | `POST /tools/{name}` | `tools/call`, body = arguments (empty body = `{}`) |
//! | `GET /health` | health status of the mount |
//! | `POST /analyze` | composite analysis, when enabled |
//!
//! Every call gets a fresh correlation id, used as the request id and
//! returned in `x-request-id`.

pub mod response;

pub use response::{
    apply_cors_headers, handle_rejection, status_for_code, BodyTooLarge, ResponseBuilder,
    REQUEST_ID_HEADER,
};

use {
    crate::{
        analysis::{self, AnalysisRequest},
        dispatcher::Dispatcher,
        error::McpError,
        handler::ServerHooks,
        health::HealthChecker,
        logging,
        protocol::{Method, Params, Request},
    },
    serde_json::Value,
    std::sync::Arc,
    warp::{
        filters::BoxedFilter,
        http::StatusCode,
        hyper::body::Bytes,
        path::Tail,
        reply, Filter, Rejection, Reply,
    },
};

/// Default request body limit
pub const DEFAULT_MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;

struct HttpState<H> {
    dispatcher: Dispatcher<H>,
    health: HealthChecker,
}

pub struct HttpMcpHandler<H> {
    state: Arc<HttpState<H>>,
    max_body_bytes: u64,
    cors: bool,
    analysis: bool,
}

impl<H: ServerHooks + 'static> HttpMcpHandler<H> {
    pub fn new(dispatcher: Dispatcher<H>) -> Self {
        Self {
            state: Arc::new(HttpState {
                dispatcher,
                health: HealthChecker::default(),
            }),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors: true,
            analysis: false,
        }
    }

    pub fn with_health(mut self, health: HealthChecker) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.health = health;
        }
        self
    }

    pub fn with_body_limit(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    /// Also serve `POST /analyze` on this mount
    pub fn with_analysis(mut self) -> Self {
        self.analysis = true;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.state.dispatcher
    }

    /// Route table for this mount. Never rejects: unmatched requests get an
    /// error envelope.
    pub fn route(&self) -> BoxedFilter<(reply::Response,)> {
        let limit = self.max_body_bytes;
        let cors = self.cors;

        let list_resources = warp::path!("resources")
            .and(warp::get())
            .and(with_state(self.state.clone()))
            .and_then(handle_list_resources::<H>);

        let read_resource = warp::path("resources")
            .and(warp::path::tail())
            .and(warp::get())
            .and(with_state(self.state.clone()))
            .and_then(handle_read_resource::<H>);

        let list_tools = warp::path!("tools")
            .and(warp::get())
            .and(with_state(self.state.clone()))
            .and_then(handle_list_tools::<H>);

        let call_tool = warp::path!("tools" / String)
            .and(warp::post())
            .and(body_with_limit(limit))
            .and(with_state(self.state.clone()))
            .and_then(handle_call_tool::<H>);

        let health = warp::path!("health")
            .and(warp::get())
            .and(with_state(self.state.clone()))
            .and_then(handle_health::<H>);

        // matched by hand so other verbs fall through as not-found
        let preflight = warp::method().and_then(|method: warp::http::Method| async move {
            if method == warp::http::Method::OPTIONS {
                Ok(reply::with_status(reply::reply(), StatusCode::NO_CONTENT).into_response())
            } else {
                Err(warp::reject::not_found())
            }
        });

        let mut routes = list_resources
            .or(read_resource)
            .unify()
            .or(list_tools)
            .unify()
            .or(call_tool)
            .unify()
            .or(health)
            .unify()
            .or(preflight)
            .unify()
            .boxed();

        if self.analysis {
            let analyze = warp::path!("analyze")
                .and(warp::post())
                .and(body_with_limit(limit))
                .and(with_state(self.state.clone()))
                .and_then(handle_analyze::<H>);
            routes = routes.or(analyze).unify().boxed();
        }

        routes
            .recover(handle_rejection)
            .unify()
            .map(move |response: reply::Response| {
                if cors {
                    apply_cors_headers(response)
                } else {
                    response
                }
            })
            .boxed()
    }
}

fn with_state<H: Send + Sync + 'static>(
    state: Arc<HttpState<H>>,
) -> impl Filter<Extract = (Arc<HttpState<H>>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Whole request body, rejected with [`BodyTooLarge`] past `limit` bytes.
fn body_with_limit(limit: u64) -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(move |length: Option<u64>| async move {
            match length {
                Some(length) if length > limit => Err(warp::reject::custom(BodyTooLarge { limit })),
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::bytes())
        .and_then(move |body: Bytes| async move {
            if body.len() as u64 > limit {
                Err(warp::reject::custom(BodyTooLarge { limit }))
            } else {
                Ok(body)
            }
        })
}

/// Decode a JSON body; an empty body is an empty object.
fn parse_json_body(body: &Bytes) -> Result<Value, McpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Params::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| McpError::InvalidParams(format!("Request body is not valid JSON: {e}")))
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

async fn dispatch<H: ServerHooks + 'static>(
    state: &HttpState<H>,
    verb: &str,
    path: &str,
    method: &str,
    params: Params,
) -> reply::Response {
    let request_id = logging::generate_request_id();
    logging::log_http_request(verb, path, &request_id);

    let request = Request::new(request_id.clone(), method, params);
    let response = state.dispatcher.handle(request).await;
    ResponseBuilder::new()
        .with_request_id(request_id)
        .build(response)
}

async fn handle_list_resources<H: ServerHooks + 'static>(
    state: Arc<HttpState<H>>,
) -> Result<reply::Response, Rejection> {
    Ok(dispatch(&state, "GET", "/resources", Method::RESOURCES_LIST, Params::new()).await)
}

async fn handle_read_resource<H: ServerHooks + 'static>(
    tail: Tail,
    state: Arc<HttpState<H>>,
) -> Result<reply::Response, Rejection> {
    let mut params = Params::new();
    if !tail.as_str().is_empty() {
        params.insert("uri".to_string(), Value::String(decode_segment(tail.as_str())));
    }
    let path = format!("/resources/{}", tail.as_str());
    Ok(dispatch(&state, "GET", &path, Method::RESOURCES_READ, params).await)
}

async fn handle_list_tools<H: ServerHooks + 'static>(
    state: Arc<HttpState<H>>,
) -> Result<reply::Response, Rejection> {
    Ok(dispatch(&state, "GET", "/tools", Method::TOOLS_LIST, Params::new()).await)
}

async fn handle_call_tool<H: ServerHooks + 'static>(
    name: String,
    body: Bytes,
    state: Arc<HttpState<H>>,
) -> Result<reply::Response, Rejection> {
    let path = format!("/tools/{name}");
    let arguments = match parse_json_body(&body) {
        Ok(arguments) => arguments,
        Err(err) => {
            let request_id = logging::generate_request_id();
            logging::log_http_request("POST", &path, &request_id);
            return Ok(ResponseBuilder::new()
                .with_request_id(request_id)
                .build_error(err.to_error_object()));
        }
    };

    let mut params = Params::new();
    params.insert("name".to_string(), Value::String(decode_segment(&name)));
    params.insert("arguments".to_string(), arguments);
    Ok(dispatch(&state, "POST", &path, Method::TOOLS_CALL, params).await)
}

async fn handle_health<H: ServerHooks + 'static>(
    state: Arc<HttpState<H>>,
) -> Result<reply::Response, Rejection> {
    let status = state.health.get_status(state.dispatcher.registry());
    Ok(ResponseBuilder::new().build_json(StatusCode::OK, &status))
}

async fn handle_analyze<H: ServerHooks + 'static>(
    body: Bytes,
    state: Arc<HttpState<H>>,
) -> Result<reply::Response, Rejection> {
    let request_id = logging::generate_request_id();
    logging::log_http_request("POST", "/analyze", &request_id);

    let request: AnalysisRequest = match parse_json_body(&body).and_then(|value| {
        serde_json::from_value(value)
            .map_err(|e| McpError::InvalidParams(format!("Invalid analysis request: {e}")))
    }) {
        Ok(request) => request,
        Err(err) => {
            return Ok(ResponseBuilder::new()
                .with_request_id(request_id)
                .build_error(err.to_error_object()))
        }
    };

    let report = analysis::run_analysis(&state.dispatcher, &request).await;
    Ok(ResponseBuilder::new()
        .with_request_id(request_id)
        .build_json(StatusCode::OK, &report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servers::{ListingsServer, PortfolioServer};
    use serde_json::json;

    fn portfolio() -> BoxedFilter<(reply::Response,)> {
        HttpMcpHandler::new(Dispatcher::new(PortfolioServer::with_sample_data()))
            .with_analysis()
            .route()
    }

    fn body_json(response: &warp::http::Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_list_resources() {
        let response = warp::test::request()
            .method("GET")
            .path("/resources")
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(REQUEST_ID_HEADER).is_some());
        let body = body_json(&response);
        assert_eq!(body["resources"].as_array().unwrap().len(), 4);
        assert_eq!(body["resources"][0]["uri"], "airbnb://properties");
    }

    #[tokio::test]
    async fn test_read_encoded_resource_uri() {
        let response = warp::test::request()
            .method("GET")
            .path("/resources/airbnb%3A%2F%2Fpricing-rules")
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["contents"][0]["uri"], "airbnb://pricing-rules");
    }

    #[tokio::test]
    async fn test_unknown_resource_is_400() {
        let response = warp::test::request()
            .method("GET")
            .path("/resources/nonexistent%3A%2F%2Fx")
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response)["code"], -32601);
    }

    #[tokio::test]
    async fn test_call_tool_with_empty_body() {
        let response = warp::test::request()
            .method("POST")
            .path("/tools/search_properties")
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response)["count"], 3);
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_invalid_params() {
        let response = warp::test::request()
            .method("POST")
            .path("/tools/search_properties")
            .body("{not json")
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response)["code"], -32602);
    }

    #[tokio::test]
    async fn test_non_object_body_is_invalid_params() {
        let response = warp::test::request()
            .method("POST")
            .path("/tools/search_properties")
            .json(&json!([1, 2, 3]))
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response)["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_400() {
        let response = warp::test::request()
            .method("POST")
            .path("/tools/nonexistent_tool")
            .json(&json!({}))
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(&response);
        assert_eq!(body["code"], -32601);
        assert_eq!(body["message"], "Tool not found: nonexistent_tool");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let response = warp::test::request()
            .method("GET")
            .path("/prompts")
            .reply(&portfolio())
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response)["code"], -32601);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let route = HttpMcpHandler::new(Dispatcher::new(PortfolioServer::with_sample_data()))
            .with_body_limit(16)
            .route();
        let response = warp::test::request()
            .method("POST")
            .path("/tools/search_properties")
            .json(&json!({ "filters": { "location": "San Francisco, CA" } }))
            .reply(&route)
            .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(&response)["code"], -32602);
    }

    #[tokio::test]
    async fn test_health_counts() {
        let route = HttpMcpHandler::new(Dispatcher::new(ListingsServer::with_sample_data())).route();
        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&route)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["resource_count"], 3);
        assert_eq!(body["tool_count"], 3);
    }

    #[tokio::test]
    async fn test_analyze_only_where_enabled() {
        let response = warp::test::request()
            .method("POST")
            .path("/analyze")
            .json(&json!({ "include_analytics": false }))
            .reply(&portfolio())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["summary"], "Completed MCP analysis with 1 components");
        assert!(body["analysisId"].is_string());

        let route = HttpMcpHandler::new(Dispatcher::new(ListingsServer::with_sample_data())).route();
        let response = warp::test::request()
            .method("POST")
            .path("/analyze")
            .json(&json!({}))
            .reply(&route)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_toggle() {
        let response = warp::test::request()
            .method("GET")
            .path("/tools")
            .reply(&portfolio())
            .await;
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );

        let route = HttpMcpHandler::new(Dispatcher::new(PortfolioServer::with_sample_data()))
            .with_cors(false)
            .route();
        let response = warp::test::request()
            .method("GET")
            .path("/tools")
            .reply(&route)
            .await;
        assert!(response.headers().get("Access-Control-Allow-Origin").is_none());
    }
}
