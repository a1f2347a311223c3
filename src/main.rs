//! Dashboard tool server
//!
//! Serves the portfolio variant under `/portfolio` and the listings variant
//! under `/listings`, configured from `HOSTMCP_*` environment variables.

use {
    anyhow::Result,
    hostmcp::{logging, McpServer, ListingsServer, PortfolioServer, ServerConfig, ServerContext},
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = ServerConfig::from_env()?;
    let context = ServerContext::sample();

    let server = McpServer::new(config);
    let portfolio = server
        .handler("portfolio", PortfolioServer::new(context.clone()))
        .with_analysis();
    let listings = server.handler("listings", ListingsServer::new(context));

    server
        .mount("portfolio", portfolio)
        .mount("listings", listings)
        .start()
        .await
}
