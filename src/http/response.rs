//! HTTP Response Building
//!
//! Turns dispatcher responses and warp rejections into HTTP replies. Every
//! reply carries a JSON body: the `result` on success, the error object
//! otherwise.

use {
    crate::{
        error::McpError,
        protocol::{ErrorObject, Response, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND},
    },
    serde::Serialize,
    std::convert::Infallible,
    tracing::{debug, warn},
    warp::{
        http::{HeaderMap, HeaderValue, StatusCode},
        reject::Reject,
        reply, Rejection, Reply,
    },
};

/// Header carrying the per-call correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request body exceeded the configured limit
#[derive(Debug)]
pub struct BodyTooLarge {
    pub limit: u64,
}

impl Reject for BodyTooLarge {}

/// HTTP status for an error code; unknown codes are treated as internal.
pub fn status_for_code(code: i32) -> StatusCode {
    match code {
        METHOD_NOT_FOUND | INVALID_PARAMS => StatusCode::BAD_REQUEST,
        INTERNAL_ERROR => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builder for HTTP responses
#[derive(Debug)]
pub struct ResponseBuilder {
    request_id: Option<String>,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            request_id: None,
            headers,
        }
    }

    /// Echo the correlation id in `x-request-id`
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Add custom header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Ok(header_name) = warp::http::HeaderName::from_bytes(name.as_bytes()) {
            if let Ok(header_value) = HeaderValue::from_str(value) {
                self.headers.insert(header_name, header_value);
            }
        }
        self
    }

    /// Serialize `body` with `status`
    pub fn build_json<T: Serialize>(mut self, status: StatusCode, body: &T) -> reply::Response {
        if let Some(request_id) = &self.request_id {
            if let Ok(value) = HeaderValue::from_str(request_id) {
                self.headers.insert(REQUEST_ID_HEADER, value);
            }
        }

        let mut response = reply::with_status(reply::json(body), status).into_response();
        let headers_mut = response.headers_mut();
        for (key, value) in self.headers {
            if let Some(key) = key {
                headers_mut.insert(key, value);
            }
        }

        debug!(status = %status, request_id = ?self.request_id, "Built HTTP response");
        response
    }

    /// 200 with the result, or the mapped status with the error object
    pub fn build(self, response: Response) -> reply::Response {
        match response.into_outcome() {
            Ok(result) => self.build_json(StatusCode::OK, &result),
            Err(error) => self.build_error(error),
        }
    }

    pub fn build_error(self, error: ErrorObject) -> reply::Response {
        let status = status_for_code(error.code);
        self.build_json(status, &error)
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply CORS headers to a response
pub fn apply_cors_headers(mut response: reply::Response) -> reply::Response {
    let headers = response.headers_mut();

    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization, X-Request-Id"),
    );
    headers.insert(
        "Access-Control-Expose-Headers",
        HeaderValue::from_static("X-Request-Id"),
    );
    headers.insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));

    response
}

/// Recover any rejection into an error envelope so callers can always parse
/// the body.
pub async fn handle_rejection(err: Rejection) -> Result<reply::Response, Infallible> {
    let (status, error) = if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorObject::new(METHOD_NOT_FOUND, "Route not found"),
        )
    } else if let Some(too_large) = err.find::<BodyTooLarge>() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            McpError::InvalidParams(format!(
                "Request body exceeds {} bytes",
                too_large.limit
            ))
            .to_error_object(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            McpError::InvalidParams("Request body too large".to_string()).to_error_object(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorObject::new(METHOD_NOT_FOUND, "HTTP method not allowed for this route"),
        )
    } else if err.find::<warp::reject::InvalidHeader>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        (
            StatusCode::BAD_REQUEST,
            McpError::InvalidParams("Malformed request headers".to_string()).to_error_object(),
        )
    } else {
        warn!(rejection = ?err, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorObject::new(INTERNAL_ERROR, "Internal error").with_data(format!("{err:?}").into()),
        )
    };

    Ok(ResponseBuilder::new().build_json(status, &error))
}
