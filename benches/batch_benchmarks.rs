//! Batched effect benchmarks for routekit
//!
//! Run with: cargo bench --bench batch_benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use futures::future::join_all;
use routekit::{Batched, Effect, FormData, RequestConfig};

fn batched_call_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("batched_call");

    let batched = Batched::new(|n: u64| async move { Ok::<_, ()>(n * 2) });
    group.bench_function("single_caller", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(batched.call(black_box(21)).await) });
    });

    group.bench_function("ten_concurrent_callers", |b| {
        b.to_async(&runtime).iter(|| async {
            let calls: Vec<_> = (0..10).map(|n| batched.call(n)).collect();
            black_box(join_all(calls).await)
        });
    });

    let direct = Effect::new(|n: u64| async move { Ok::<_, ()>(n * 2) });
    group.bench_function("direct_effect", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(direct.call(black_box(21)).await) });
    });

    group.finish();
}

fn request_format_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_format");

    let payload = serde_json::json!({
        "name": "widget",
        "tags": ["a", "b", "c"],
        "meta": { "size": 5, "color": "red" }
    });

    group.bench_function("get_data_to_params", |b| {
        b.iter(|| {
            let config = RequestConfig::get("/search").data(&payload).format();
            black_box(config)
        });
    });

    group.bench_function("post_form_data", |b| {
        b.iter(|| {
            let config = RequestConfig::post("/upload")
                .form_data()
                .data(&payload)
                .format();
            black_box(config)
        });
    });

    group.bench_function("form_from_value", |b| {
        b.iter(|| black_box(FormData::from_value(black_box(&payload))));
    });

    group.finish();
}

criterion_group!(benches, batched_call_benchmark, request_format_benchmark);
criterion_main!(benches);
