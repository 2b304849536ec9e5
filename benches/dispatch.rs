//! Benchmarks for tool dispatch
//!
//! This benchmark measures:
//! - Single-call overhead (decode, validate, invoke, format)
//! - Argument repair on near-miss JSON
//! - Batched dispatch across worker tasks

use ai_toolbox::repair::{parse_with_repair, BestEffortRepair};
use ai_toolbox::{ToolBox, ToolBoxConfig, ToolCallRequest, ToolDefinition};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

const WELL_FORMED: &str = r#"{"city": "Tokyo", "units": "metric", "days": 3}"#;
const NEAR_MISS: &str = r#"{city: 'Tokyo', units: 'metric', days: 3,"#;

fn toolbox(max_parallelism: usize) -> ToolBox {
    let forecast = ToolDefinition::builder("get_forecast")
        .parameters(json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "units": {"type": "string", "enum": ["metric", "imperial"]},
                "days": {"type": "integer", "minimum": 1}
            },
            "required": ["city"]
        }))
        .invoke(|args: Value| async move {
            Ok(json!({"city": args["city"], "high": 24, "low": 17}))
        })
        .build()
        .expect("valid tool");
    ToolBox::with_config([forecast], ToolBoxConfig::new().with_max_parallelism(max_parallelism))
}

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("argument_decoding");
    group.bench_function("strict", |b| {
        b.iter(|| parse_with_repair(black_box(WELL_FORMED), &BestEffortRepair).unwrap())
    });
    group.bench_function("repaired", |b| {
        b.iter(|| parse_with_repair(black_box(NEAR_MISS), &BestEffortRepair).unwrap())
    });
    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let toolbox = toolbox(5);

    c.bench_function("execute_single", |b| {
        b.to_async(&rt).iter(|| async {
            toolbox
                .execute("get_forecast", black_box(WELL_FORMED), Some("call_bench".into()))
                .await
                .unwrap()
        })
    });
}

fn bench_batch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("execute_batch");

    for parallelism in [1usize, 5, 16] {
        let toolbox = toolbox(parallelism);
        group.bench_with_input(
            BenchmarkId::from_parameter(parallelism),
            &parallelism,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    let requests: Vec<ToolCallRequest> = (0..32)
                        .map(|i| {
                            ToolCallRequest::new("get_forecast", WELL_FORMED)
                                .with_call_id(format!("call_{}", i))
                        })
                        .collect();
                    toolbox.execute_batch(requests).await.unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_repair, bench_execute, bench_batch);
criterion_main!(benches);
