//! Throughput benchmarks for bulk grading and expression evaluation.
//!
//! Run with: `cargo bench --bench throughput`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bookie_sync::core::types::{DynamicParams, GradingSpec, MatchResult, ObjectId, OutcomeGroup};
use bookie_sync::grading::{expr, resolve, GradingContext};

fn outcome_group(pairs: &[(&str, &str)]) -> OutcomeGroup {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn over_under_rule() -> GradingSpec {
    GradingSpec {
        metric: "{result.total}".to_string(),
        resolutions: vec![
            outcome_group(&[
                ("win", "{metric} > {overunder}"),
                ("not_win", "{metric} <= {overunder}"),
            ]),
            outcome_group(&[
                ("win", "{metric} < {overunder}"),
                ("not_win", "{metric} >= {overunder}"),
            ]),
        ],
    }
}

/// A spread of plausible final scores.
fn results(count: usize) -> Vec<MatchResult> {
    (0..count)
        .map(|i| MatchResult::new(&[(i % 120) as f64, ((i * 7) % 120) as f64]).unwrap())
        .collect()
}

fn bench_grading(c: &mut Criterion) {
    let spec = over_under_rule();
    let legs = [ObjectId::from("1.25.10"), ObjectId::from("1.25.11")];
    let mut group = c.benchmark_group("resolve");

    for count in [100usize, 1_000, 10_000] {
        let batch = results(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("over_under", count), &batch, |b, batch| {
            b.iter(|| {
                for result in batch {
                    let ctx = GradingContext {
                        result: *result,
                        teams: ["atlanta hawks".to_string(), "boston celtics".to_string()],
                        dynamic: Some(DynamicParams::over_under(120.5)),
                    };
                    black_box(resolve(&spec, &ctx, &legs).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_expressions(c: &mut Criterion) {
    let sources = [
        "218.0 > 220.5",
        "(101.0 + 3) - (98.0 + 0) > 0",
        "not (1 == 2) and 3.5 <= 4 or False",
    ];
    let mut group = c.benchmark_group("expr");
    group.throughput(Throughput::Elements(sources.len() as u64));
    group.bench_function("evaluate", |b| {
        b.iter(|| {
            for source in &sources {
                black_box(expr::evaluate(black_box(source)).unwrap());
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_grading, bench_expressions);
criterion_main!(benches);
