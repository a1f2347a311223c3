//! Concurrent Dispatch Tests
//!
//! One dispatcher shared by many tasks: listings stay stable and tool calls
//! stay independent.

use futures_util::future::join_all;
use hostmcp::{protocol::Params, Dispatcher, Method, PortfolioServer, Request};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Barrier;

use test_helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hundred_concurrent_tool_listings() {
    init_test_tracing();

    let dispatcher = Dispatcher::new(PortfolioServer::with_sample_data());
    let expected = dispatcher
        .handle(Request::bare("baseline", Method::TOOLS_LIST))
        .await
        .into_outcome()
        .unwrap();

    let task_count = 100;
    let barrier = Arc::new(Barrier::new(task_count));
    let mut handles = Vec::with_capacity(task_count);

    for i in 0..task_count {
        let dispatcher = dispatcher.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let response = dispatcher
                .handle(Request::bare(format!("list-{i}"), Method::TOOLS_LIST))
                .await;
            assert_eq!(response.id(), format!("list-{i}"));
            response.into_outcome().unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    init_test_tracing();

    let dispatcher = Dispatcher::new(PortfolioServer::with_sample_data());
    let limits: Vec<u64> = (1..=3).cycle().take(30).collect();

    let calls = limits.iter().enumerate().map(|(i, limit)| {
        let mut params = Params::new();
        params.insert("name".to_string(), json!("search_properties"));
        params.insert("arguments".to_string(), json!({ "limit": limit }));
        dispatcher.handle(Request::new(format!("call-{i}"), Method::TOOLS_CALL, params))
    });
    let responses = join_all(calls).await;

    for ((i, limit), response) in limits.iter().enumerate().zip(responses) {
        assert_eq!(response.id(), format!("call-{i}"));
        let result: Value = response.into_outcome().unwrap();
        assert_eq!(result["count"], json!(limit));
    }
}
