//! Structured logging
//!
//! Tracing subscriber setup plus the structured events emitted by the
//! dispatcher, the tool router and the HTTP edge.

use {
    std::time::Duration,
    tracing::{debug, error, info, span, warn, Level, Span},
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
    uuid::Uuid,
};

/// Initialize the tracing subscriber with appropriate configuration
pub fn init_tracing() {
    // RUST_LOG wins, otherwise info for this crate and warp
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hostmcp=info,warp=info"));

    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    info!("Tracing initialized");
}

/// Fresh correlation id for calls that arrive without one (HTTP binding)
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one dispatch
pub fn request_span(method: &str, request_id: &str) -> Span {
    span!(
        Level::INFO,
        "mcp_request",
        method = %method,
        request_id = %request_id,
    )
}

pub fn log_handler_success(method: &str, duration: Duration) {
    info!(
        method = %method,
        duration_ms = duration.as_millis(),
        event = "handler_success",
        "Successfully handled method"
    );
}

pub fn log_handler_error(method: &str, code: i32, error: &str, duration: Duration) {
    // expected domain failures are warnings, only internal errors are errors
    if code == crate::protocol::INTERNAL_ERROR {
        error!(
            method = %method,
            code = code,
            error = %error,
            duration_ms = duration.as_millis(),
            event = "handler_error",
            "Failed to handle method"
        );
    } else {
        warn!(
            method = %method,
            code = code,
            error = %error,
            duration_ms = duration.as_millis(),
            event = "handler_error",
            "Request rejected"
        );
    }
}

pub fn log_unknown_method(method: &str) {
    warn!(
        method = %method,
        event = "unknown_method",
        "Unknown method requested"
    );
}

pub fn log_hook_panic(method: &str, message: &str) {
    error!(
        method = %method,
        panic = %message,
        event = "hook_panic",
        "Server hook panicked"
    );
}

/// Log tool events
pub fn log_tool_call(tool: &str, args: &serde_json::Value) {
    info!(
        tool = %tool,
        args = ?args,
        event = "tool_call",
        "Tool call requested"
    );
}

pub fn log_unknown_tool(tool: &str) {
    warn!(
        tool = %tool,
        event = "unknown_tool",
        "Unknown tool requested"
    );
}

pub fn log_http_request(verb: &str, path: &str, request_id: &str) {
    debug!(
        verb = %verb,
        path = %path,
        request_id = %request_id,
        event = "http_request",
        "Inbound HTTP call"
    );
}

/// Server lifecycle logging
pub fn log_server_startup(port: u16) {
    info!(port = port, event = "server_startup", "Starting MCP Server");
}

pub fn log_server_ready(addr: &str) {
    info!(
        address = %addr,
        event = "server_ready",
        "MCP Server ready and listening"
    );
}

#[macro_export]
macro_rules! log_tool_execution {
    ($tool_name:expr, $duration:expr, $result:expr) => {
        match $result {
            Ok(_) => tracing::info!(
                tool = $tool_name,
                duration_ms = $duration.as_millis(),
                event = "tool_execution_success",
                "Tool executed successfully"
            ),
            Err(ref e) => tracing::warn!(
                tool = $tool_name,
                duration_ms = $duration.as_millis(),
                error = %e,
                event = "tool_execution_error",
                "Tool execution failed"
            ),
        }
    };
}
