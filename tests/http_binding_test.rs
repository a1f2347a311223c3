//! HTTP Binding Tests
//!
//! End-to-end tests over a real socket: a minimal server built from the
//! public extension API, plus the two shipped variants behind one listener.

use anyhow::Result;
use async_trait::async_trait;
use hostmcp::{
    content::ResourceContents, store::SAMPLE_LOFT_ID, JsonSchema, ListingsServer, McpError,
    McpServer, PortfolioServer, Registry, Request, ResourceDescriptor, Response,
    ServerHooks, ToolRouter,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use test_helpers::*;

#[derive(Deserialize, JsonSchema)]
struct SearchInput {
    location: Option<String>,
}

#[derive(Serialize)]
struct SearchOutput {
    matches: Vec<String>,
}

struct Listings(Vec<String>);

/// One resource, one tool with no required arguments
struct MinimalServer {
    registry: Registry,
    tools: ToolRouter<Listings>,
}

impl MinimalServer {
    fn new() -> Self {
        let mut tools = ToolRouter::new(Arc::new(Listings(vec![
            "Loft, San Francisco".to_string(),
            "Cottage, Oakland".to_string(),
        ])));
        let mut registry = Registry::builder();
        registry.resource(
            ResourceDescriptor::new("airbnb://properties", "Properties")
                .with_mime_type("application/json"),
        );
        registry.tool(tools.register_tool(
            "search_properties",
            "Search listings",
            |input: SearchInput, listings: Arc<Listings>| async move {
                let needle = input.location.unwrap_or_default().to_lowercase();
                Ok::<_, McpError>(SearchOutput {
                    matches: listings
                        .0
                        .iter()
                        .filter(|l| l.to_lowercase().contains(&needle))
                        .cloned()
                        .collect(),
                })
            },
        ));
        Self {
            registry: registry.build(),
            tools,
        }
    }
}

#[async_trait]
impl ServerHooks for MinimalServer {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    async fn read_resource_content(
        &self,
        request: &Request,
        resource: &ResourceDescriptor,
    ) -> anyhow::Result<Response> {
        let document = json!({ "properties": self.tools.context().0 });
        let contents = ResourceContents::json(resource, &document)?.into_value()?;
        Ok(Response::success(request.id.clone(), contents))
    }

    async fn call_tool(&self, request: &Request) -> anyhow::Result<Response> {
        Ok(self.tools.respond(request).await)
    }
}

#[tokio::test]
async fn test_minimal_server_scenario() -> Result<()> {
    init_test_tracing();

    let server = McpServer::new(test_config());
    let handler = server.handler("minimal", MinimalServer::new());
    let running = TestServer::start(server.mount("", handler)).await?;
    let client = reqwest::Client::new();

    let response = client.get(running.url("/resources")).send().await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    let resources = body["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["uri"], "airbnb://properties");

    let response = client
        .post(running.url("/tools/search_properties"))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("x-request-id").is_some());
    let body: Value = response.json().await?;
    assert!(body.get("code").is_none());
    assert_eq!(body["matches"].as_array().unwrap().len(), 2);

    running.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_error_bodies_always_parse() -> Result<()> {
    init_test_tracing();

    let server = McpServer::new(test_config());
    let handler = server.handler("minimal", MinimalServer::new());
    let running = TestServer::start(server.mount("", handler)).await?;
    let client = reqwest::Client::new();

    let cases = [
        (client.get(running.url("/resources/nonexistent%3A%2F%2Fx")), 400, -32601),
        (client.post(running.url("/tools/nonexistent_tool")).json(&json!({})), 400, -32601),
        (client.post(running.url("/tools/search_properties")).body("{oops"), 400, -32602),
        (client.get(running.url("/no/such/route")), 404, -32601),
    ];

    for (request, status, code) in cases {
        let response = request.send().await?;
        assert_eq!(response.status().as_u16(), status);
        let body: Value = response.json().await?;
        assert_eq!(body["code"], code);
        assert!(body["message"].is_string());
    }

    running.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_shipped_variants_behind_one_listener() -> Result<()> {
    init_test_tracing();

    let server = McpServer::new(test_config());
    let portfolio = server
        .handler("portfolio", PortfolioServer::with_sample_data())
        .with_analysis();
    let listings = server.handler("listings", ListingsServer::with_sample_data());
    let running =
        TestServer::start(server.mount("portfolio", portfolio).mount("listings", listings)).await?;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(running.url("/listings/resources/airbnb%3A%2F%2Fbookings"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["contents"][0]["uri"], "airbnb://bookings");

    let response = client
        .post(running.url("/portfolio/analyze"))
        .json(&json!({ "property_id": SAMPLE_LOFT_ID.to_string() }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let report: Value = response.json().await?;
    assert_eq!(report["summary"], "Completed MCP analysis with 4 components");

    let health: Value = client
        .get(running.url("/portfolio/health"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["server_name"], "portfolio");
    assert_eq!(health["tool_count"], 6);

    running.stop().await;
    Ok(())
}
