//! Dispatch Benchmarks
//!
//! Throughput of the dispatcher for listing, reading and tool calls, with
//! and without argument validation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hostmcp::{
    protocol::Params, Dispatcher, Method, PortfolioServer, Request, SchemaValidation,
};
use serde_json::json;

fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

fn benchmark_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = Dispatcher::new(PortfolioServer::with_sample_data());
    let mut group = c.benchmark_group("dispatch");

    group.bench_function("tools_list", |b| {
        b.iter(|| rt.block_on(dispatcher.handle(black_box(Request::bare("1", Method::TOOLS_LIST)))))
    });

    let read = params(json!({ "uri": "airbnb://analytics" }));
    group.bench_function("resources_read", |b| {
        b.iter(|| {
            rt.block_on(dispatcher.handle(black_box(Request::new(
                "2",
                Method::RESOURCES_READ,
                read.clone(),
            ))))
        })
    });

    group.bench_function("unknown_method", |b| {
        b.iter(|| rt.block_on(dispatcher.handle(black_box(Request::bare("3", "prompts/list")))))
    });

    group.finish();
}

fn benchmark_tool_calls(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let call = params(json!({
        "name": "search_properties",
        "arguments": { "filters": { "max_price": 300.0 }, "sort_by": "revenue", "limit": 5 }
    }));
    let mut group = c.benchmark_group("tool_calls");

    for (label, validation) in [
        ("validated", SchemaValidation::Enforce),
        ("unvalidated", SchemaValidation::Off),
    ] {
        let dispatcher =
            Dispatcher::new(PortfolioServer::with_sample_data()).with_validation(validation);
        group.bench_function(format!("search_properties_{label}"), |b| {
            b.iter(|| {
                rt.block_on(dispatcher.handle(black_box(Request::new(
                    "4",
                    Method::TOOLS_CALL,
                    call.clone(),
                ))))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_dispatch, benchmark_tool_calls);
criterion_main!(benches);
