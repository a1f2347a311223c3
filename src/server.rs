//! Server Core
//!
//! `McpServer` mounts independent dispatchers under path prefixes and serves
//! them on one listener. Each mount keeps its own registry; nothing is shared
//! between mounts.

use {
    crate::{
        config::ServerConfig,
        dispatcher::Dispatcher,
        handler::ServerHooks,
        health::HealthChecker,
        http::{apply_cors_headers, handle_rejection, HttpMcpHandler},
        logging,
    },
    anyhow::{Context, Result},
    std::{future::Future, net::SocketAddr},
    tokio_stream::wrappers::TcpListenerStream,
    tracing::{debug, info},
    warp::{filters::BoxedFilter, reply, Filter},
};

struct Mount {
    prefix: String,
    route: BoxedFilter<(reply::Response,)>,
}

pub struct McpServer {
    config: ServerConfig,
    mounts: Vec<Mount>,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            mounts: Vec::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// HTTP handler for `hooks` with this server's validation, body limit
    /// and CORS settings applied.
    pub fn handler<H: ServerHooks + 'static>(&self, name: &str, hooks: H) -> HttpMcpHandler<H> {
        let dispatcher = Dispatcher::new(hooks).with_validation(self.config.schema_validation);
        HttpMcpHandler::new(dispatcher)
            .with_health(HealthChecker::new(name, env!("CARGO_PKG_VERSION")))
            .with_body_limit(self.config.max_body_bytes)
            .with_cors(self.config.cors)
    }

    /// Serve `handler` under `/{prefix}`; an empty prefix mounts at the root.
    ///
    /// Mounts are tried in order, so a root mount should come last.
    pub fn mount<H: ServerHooks + 'static>(mut self, prefix: &str, handler: HttpMcpHandler<H>) -> Self {
        let prefix = prefix.trim_matches('/').to_string();
        let route = handler.route();
        let route = if prefix.is_empty() {
            route
        } else {
            warp::path(prefix.clone()).and(route).boxed()
        };

        debug!(prefix = %prefix, "Mounted server");
        self.mounts.push(Mount { prefix, route });
        self
    }

    /// Every mount plus a fallback that answers unknown paths with an error
    /// envelope.
    pub fn routes(&self) -> BoxedFilter<(reply::Response,)> {
        let cors = self.config.cors;
        let fallback = warp::any()
            .and_then(|| async { Err::<reply::Response, _>(warp::reject::not_found()) })
            .recover(handle_rejection)
            .unify()
            .map(move |response: reply::Response| {
                if cors {
                    apply_cors_headers(response)
                } else {
                    response
                }
            })
            .boxed();

        self.mounts
            .iter()
            .rev()
            .fold(fallback, |routes, mount| mount.route.clone().or(routes).unify().boxed())
    }

    /// Bind the configured address and return it with the serving future.
    ///
    /// Port 0 picks a free port, which the returned address reports.
    pub async fn bind(self) -> Result<(SocketAddr, impl Future<Output = ()>)> {
        let addr = self.config.socket_addr();
        logging::log_server_startup(addr.port());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Could not bind to {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("Could not read bound address")?;

        logging::log_server_ready(&format!("http://{local_addr}"));
        info!(
            mounts = ?self.mounts.iter().map(|m| format!("/{}", m.prefix)).collect::<Vec<_>>(),
            "Available mounts"
        );

        let routes = self.routes();
        let serve = warp::serve(routes).run_incoming(TcpListenerStream::new(listener));
        Ok((local_addr, serve))
    }

    /// Bind and serve until the process stops.
    pub async fn start(self) -> Result<()> {
        let (_, serve) = self.bind().await?;
        serve.await;
        Ok(())
    }
}
